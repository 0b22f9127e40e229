//! Page record.
//!
//! Journal pages carry a `journal_day` ordinal (`YYYYMMDD`). Template pages
//! never do.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one page.
pub type PageId = Uuid;

/// Page category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// One page per calendar day.
    Journal,
    /// Block tree expanded into other pages on demand.
    Template,
}

impl PageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Template => "template",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "journal" => Some(Self::Journal),
            "template" => Some(Self::Template),
            _ => None,
        }
    }
}

/// Stored page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page_uuid: PageId,
    /// Unique page name, e.g. `2026-10-19` for journals.
    pub name: String,
    pub kind: PageKind,
    /// `YYYYMMDD` ordinal. Set only for journal pages.
    pub journal_day: Option<i64>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}

impl Page {
    pub fn is_journal(&self) -> bool {
        self.kind == PageKind::Journal
    }
}
