//! User-visible notices.
//!
//! The orchestrator reports outcomes as passive notices. Presentation is up
//! to the host; `LogNotifier` writes them to the log.

use log::{error, info, warn};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Sink for passive user notices. Must never block or fail.
pub trait Notifier {
    fn notify(&self, level: NoticeLevel, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, level: NoticeLevel, message: &str) {
        (**self).notify(level, message);
    }
}

/// Writes notices as log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => {
                info!("event=notice module=notify level=success message={message}")
            }
            NoticeLevel::Warning => {
                warn!("event=notice module=notify level=warning message={message}")
            }
            NoticeLevel::Error => {
                error!("event=notice module=notify level=error message={message}")
            }
        }
    }
}

/// Keeps notices in memory, for hosts that render them later.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears recorded notices.
    pub fn take(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.take()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.borrow_mut().push((level, message.to_string()));
    }
}
