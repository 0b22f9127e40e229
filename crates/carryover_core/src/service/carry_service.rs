//! Daily carry-over use-case service.
//!
//! # Responsibility
//! - Ensure today's journal page exists and reflects yesterday's open work.
//! - Apply the configured template once per day.
//! - Keep previously written markers recognizable across config changes.
//!
//! # Invariants
//! - A page carrying today's done marker is never processed again.
//! - The marker is written before the transfer walk starts, so a failed
//!   walk is not retried (at-most-once).
//! - A day is claimed in storage before any mutation; a second concurrent
//!   invocation finds the claim and does nothing.

use crate::carry::marker::MarkerPattern;
use crate::carry::prune::prune_subtree;
use crate::carry::scan::page_matches;
use crate::carry::transfer::{transfer_subtree, DestCursor};
use crate::carry::writer::{RepoWriter, WriteStats};
use crate::carry::CarryRules;
use crate::config::CarryConfig;
use crate::journal_day::{journal_day, journal_page_name};
use crate::model::block::{BlockId, BlockPlacement};
use crate::model::page::{Page, PageKind};
use crate::model::run_state::RunState;
use crate::notify::{NoticeLevel, Notifier};
use crate::repo::journal_repo::{JournalRepoError, JournalRepository};
use chrono::NaiveDate;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from carry-over runs.
#[derive(Debug)]
pub enum CarryError {
    /// Storage failure. The run aborted where it was.
    Repo(JournalRepoError),
    /// Configured token could not be compiled into a match pattern.
    Pattern(regex::Error),
}

impl Display for CarryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Pattern(err) => write!(f, "invalid marker pattern: {err}"),
        }
    }
}

impl Error for CarryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Pattern(err) => Some(err),
        }
    }
}

impl From<JournalRepoError> for CarryError {
    fn from(value: JournalRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<regex::Error> for CarryError {
    fn from(value: regex::Error) -> Self {
        Self::Pattern(value)
    }
}

/// What one run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Today's page already carries the done marker.
    AlreadyDone,
    /// Another run claimed today first.
    AlreadyClaimed,
    /// Marker written; no prior journal page to carry from.
    MarkerOnly,
    /// Open work carried from `source_name`.
    Transferred {
        source_name: String,
        source_day: i64,
        groups: usize,
        copied: WriteStats,
        pruned: WriteStats,
    },
}

/// Carry-over service facade.
pub struct CarryService<R: JournalRepository, N: Notifier> {
    repo: R,
    config: CarryConfig,
    notifier: N,
}

impl<R: JournalRepository, N: Notifier> CarryService<R, N> {
    /// Creates service from repository, settings and notice sink.
    pub fn new(repo: R, config: CarryConfig, notifier: N) -> Self {
        Self {
            repo,
            config,
            notifier,
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &CarryConfig {
        &self.config
    }

    /// Returns today's journal page, creating it with one empty block.
    pub fn ensure_journal_page(&self, date: NaiveDate) -> Result<Page, CarryError> {
        let day = journal_day(date);
        if let Some(page) = self.repo.get_journal_page(day)? {
            return Ok(page);
        }
        let name = journal_page_name(date, &self.config.page_name_format);
        info!(
            "event=journal_create module=carry status=ok journal_day={} name={}",
            day, name
        );
        Ok(self
            .repo
            .create_page(&name, PageKind::Journal, Some(day), true)?)
    }

    /// One scheduler tick: runs and reports failures as notices.
    ///
    /// Never propagates errors, so the scheduler keeps ticking.
    pub fn tick(&self, today: NaiveDate) -> Option<RunOutcome> {
        match self.run(today) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                error!(
                    "event=carry_tick module=carry status=error journal_day={} error={}",
                    journal_day(today),
                    err
                );
                self.notifier.notify(
                    NoticeLevel::Error,
                    &format!("Carrying open tasks failed: {err}"),
                );
                None
            }
        }
    }

    /// Carries open tasks from the latest prior journal into `today`.
    pub fn run(&self, today: NaiveDate) -> Result<RunOutcome, CarryError> {
        let started_at = Instant::now();
        let day = journal_day(today);
        let marker =
            MarkerPattern::done_marker(&self.config.done_token, self.config.done_as_comment)?;
        let rules = CarryRules::from_config(&self.config)?;

        let page = self.ensure_journal_page(today)?;
        let today_tree = self.repo.get_tree(page.page_uuid)?;
        if page_matches(&today_tree, &|content: &str| marker.matches(content)) {
            info!(
                "event=carry_run module=carry status=skip reason=marker_present journal_day={day}"
            );
            return Ok(RunOutcome::AlreadyDone);
        }
        if !self.repo.claim_run(day)? {
            info!(
                "event=carry_run module=carry status=skip reason=already_claimed journal_day={day}"
            );
            return Ok(RunOutcome::AlreadyClaimed);
        }
        info!("event=carry_run module=carry status=start journal_day={day}");

        let template = self.config.journal_template();
        if let (Some(template), Some(last)) = (template, today_tree.last_root()) {
            self.insert_template(&page, last, template)?;
        }

        self.repo
            .create_block(page.page_uuid, None, marker.as_str(), BlockPlacement::PageStart)?;
        self.repo.set_run_state(day, RunState::Marked)?;

        let today_tree = self.repo.get_tree(page.page_uuid)?;
        let last = today_tree
            .last_root()
            .ok_or(JournalRepoError::PageNotFound(page.page_uuid))?;
        let mut cursor = DestCursor::at(&today_tree, last);

        let source = self.repo.latest_journal_page_before(day)?;

        let outcome = match source {
            None => RunOutcome::MarkerOnly,
            Some(source) => {
                self.repo.set_run_state(day, RunState::TransferInProgress)?;
                let source_tree = self.repo.get_tree(source.page_uuid)?;
                let mut copy_writer = RepoWriter::new(&self.repo, page.page_uuid);
                let mut prune_writer = RepoWriter::new(&self.repo, source.page_uuid);
                let mut groups = 0;

                for group in source_tree.roots() {
                    if source_tree.content(*group).is_empty() {
                        continue;
                    }
                    cursor = transfer_subtree(
                        &source_tree,
                        *group,
                        cursor,
                        false,
                        &rules,
                        &mut copy_writer,
                    )?;
                    prune_subtree(&source_tree, *group, &rules, &mut prune_writer)?;
                    groups += 1;
                }

                RunOutcome::Transferred {
                    source_name: source.name,
                    source_day: source.journal_day.unwrap_or_default(),
                    groups,
                    copied: copy_writer.stats(),
                    pruned: prune_writer.stats(),
                }
            }
        };

        if !cursor.is_placeholder() {
            self.repo
                .create_block(page.page_uuid, Some(cursor.id), "", BlockPlacement::SiblingAfter)?;
        }
        self.repo.set_run_state(day, RunState::Complete)?;

        match &outcome {
            RunOutcome::Transferred {
                source_day,
                groups,
                copied,
                pruned,
                ..
            } => info!(
                "event=carry_run module=carry status=ok journal_day={} source_day={} groups={} created={} updated={} deleted={} duration_ms={}",
                day,
                source_day,
                groups,
                copied.created,
                copied.updated,
                pruned.deleted,
                started_at.elapsed().as_millis()
            ),
            _ => info!(
                "event=carry_run module=carry status=ok journal_day={} source_day=none duration_ms={}",
                day,
                started_at.elapsed().as_millis()
            ),
        }
        self.notifier
            .notify(NoticeLevel::Success, "Today's journal page updated");
        Ok(outcome)
    }

    /// Switches to `next` settings, rewriting today's page so markers and
    /// ignore tokens written under the old settings stay recognizable.
    ///
    /// Returns the number of rewritten blocks.
    pub fn apply_config_change(
        &mut self,
        next: CarryConfig,
        today: NaiveDate,
    ) -> Result<usize, CarryError> {
        let rewrites = self.config.rewrites_to(&next);
        let mut rewritten = 0;

        if !rewrites.is_empty() {
            if let Some(page) = self.repo.get_journal_page(journal_day(today))? {
                let tree = self.repo.get_tree(page.page_uuid)?;
                for id in tree.descendants_of_roots() {
                    let current = tree.content(id);
                    let updated = rewrites
                        .iter()
                        .fold(current.to_string(), |content, (old, new)| {
                            content.replace(old.as_str(), new.as_str())
                        });
                    if updated != current {
                        self.repo.update_block(id, &updated)?;
                        rewritten += 1;
                    }
                }
            }
        }

        info!(
            "event=config_change module=carry status=ok rewrites={} blocks={}",
            rewrites.len(),
            rewritten
        );
        self.config = next;
        Ok(rewritten)
    }

    fn insert_template(
        &self,
        page: &Page,
        last: BlockId,
        template: &str,
    ) -> Result<(), CarryError> {
        if !self.repo.template_exists(template)? {
            warn!("event=template_apply module=carry status=skip reason=not_found");
            self.notifier.notify(
                NoticeLevel::Warning,
                &format!("Template \"{template}\" not found."),
            );
            return Ok(());
        }
        let template_empty = match self.repo.get_page_by_name(template)? {
            Some(source) => self.repo.get_tree(source.page_uuid)?.is_empty(),
            None => true,
        };
        if template_empty {
            info!("event=template_apply module=carry status=skip reason=empty_template");
            return Ok(());
        }

        let slot = self.repo.create_block(
            page.page_uuid,
            Some(last),
            "",
            BlockPlacement::SiblingBefore,
        )?;
        if self.repo.apply_template(slot.block_uuid, template)? {
            info!("event=template_apply module=carry status=ok");
            self.notifier.notify(
                NoticeLevel::Success,
                &format!("Insert template \"{template}\""),
            );
        }
        Ok(())
    }
}
