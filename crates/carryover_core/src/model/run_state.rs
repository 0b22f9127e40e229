//! Per-day carry-over run state.
//!
//! Recorded alongside the done marker. A day that has a row was claimed by
//! some run; the state tells how far that run got.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Claimed, nothing written yet.
    Pending,
    /// Done marker written to today's page.
    Marked,
    /// Transfer/prune walk started.
    TransferInProgress,
    /// Run finished.
    Complete,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Marked => "marked",
            Self::TransferInProgress => "transfer_in_progress",
            Self::Complete => "complete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "marked" => Some(Self::Marked),
            "transfer_in_progress" => Some(Self::TransferInProgress),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}
