//! Core domain logic for journal carry-over.
//! Carries open `TODO` blocks from the latest prior journal page into today's
//! page exactly once per day.

pub mod carry;
pub mod config;
pub mod db;
pub mod journal_day;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use carry::marker::{build_done_marker, escape_pattern_literal, MarkerPattern};
pub use carry::predicate::{is_ignored, is_open_task};
pub use carry::CarryRules;
pub use config::{load_config, load_config_or_default, save_config, CarryConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::block::{Block, BlockId, BlockPlacement};
pub use model::outline::{Outline, OutlineError};
pub use model::page::{Page, PageId, PageKind};
pub use model::run_state::RunState;
pub use notify::{LogNotifier, NoticeLevel, Notifier, RecordingNotifier};
pub use repo::journal_repo::{
    JournalRepoError, JournalRepoResult, JournalRepository, SqliteJournalRepository,
};
pub use service::carry_service::{CarryError, CarryService, RunOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
