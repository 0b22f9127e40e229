//! Calendar date helpers for journal pages.
//!
//! Journal pages are ordered by a `YYYYMMDD` integer ordinal, so "strictly
//! before today" is a plain integer comparison.

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Local, NaiveDate};
use log::warn;

use crate::config::DEFAULT_PAGE_NAME_FORMAT;

/// `YYYYMMDD` ordinal of `date`.
pub fn journal_day(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Today's date in the local time zone.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Journal page name of `date` under `format`.
///
/// An invalid format falls back to `%Y-%m-%d`.
pub fn journal_page_name(date: NaiveDate, format: &str) -> String {
    let items = match parse_format(format) {
        Some(items) => items,
        None => {
            warn!(
                "event=page_name_format module=journal_day status=fallback format={}",
                format
            );
            StrftimeItems::new(DEFAULT_PAGE_NAME_FORMAT).collect()
        }
    };
    date.format_with_items(items.iter()).to_string()
}

/// Date encoded in a journal page name under `format`.
pub fn parse_journal_page_name(name: &str, format: &str) -> Option<NaiveDate> {
    parse_format(format)?;
    NaiveDate::parse_from_str(name.trim(), format).ok()
}

fn parse_format(format: &str) -> Option<Vec<Item<'_>>> {
    if format.trim().is_empty() {
        return None;
    }
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(items)
}
