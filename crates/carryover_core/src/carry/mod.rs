//! Carry-over engines: marker codec, task predicate, tree scanner, and the
//! transfer/prune walks over one source page.
//!
//! # Responsibility
//! - Decide which blocks of a prior journal page are carried into today.
//! - Copy them preserving order and nesting, then clean the source.
//!
//! # Invariants
//! - Engines read only from an `Outline` snapshot and write only through an
//!   `OutlineWriter`, in document order.
//! - Ignored blocks and their subtrees are never copied, and pruning never
//!   deletes them on their own account. Deleting a carried ancestor removes
//!   them with the rest of its subtree.

pub mod marker;
pub mod predicate;
pub mod prune;
pub mod scan;
pub mod transfer;
pub mod writer;

use crate::config::CarryConfig;
use marker::marker_envelopes;
use predicate::IgnoreRule;
use std::borrow::Cow;

/// Per-run matching rules derived from configuration.
#[derive(Debug, Clone)]
pub struct CarryRules {
    ignore: IgnoreRule,
    done_envelopes: [String; 2],
}

impl CarryRules {
    pub fn new(done_token: &str, ignore_token: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            ignore: IgnoreRule::new(ignore_token)?,
            done_envelopes: marker_envelopes(done_token),
        })
    }

    pub fn from_config(config: &CarryConfig) -> Result<Self, regex::Error> {
        Self::new(&config.done_token, &config.ignore_token)
    }

    /// Returns whether the block opts itself and its subtree out.
    pub fn is_ignored(&self, content: &str) -> bool {
        self.ignore.matches(content)
    }

    /// Removes every enveloped done marker from `content`.
    pub fn strip_done_markers<'a>(&self, content: &'a str) -> Cow<'a, str> {
        let mut stripped = Cow::Borrowed(content);
        for envelope in &self.done_envelopes {
            if stripped.contains(envelope.as_str()) {
                stripped = Cow::Owned(stripped.replace(envelope.as_str(), ""));
            }
        }
        stripped
    }
}

#[cfg(test)]
mod tests {
    use super::CarryRules;
    use std::borrow::Cow;

    #[test]
    fn strip_removes_both_envelopes() {
        let rules = CarryRules::new("", "").expect("default rules");
        let content = "#+BEGIN_COMMENT\ntodos_transferred\n#+END_COMMENT[^todos_transferred] keep";
        assert_eq!(rules.strip_done_markers(content), " keep");
    }

    #[test]
    fn strip_borrows_when_nothing_matches() {
        let rules = CarryRules::new("", "").expect("default rules");
        assert!(matches!(
            rules.strip_done_markers("plain text"),
            Cow::Borrowed("plain text")
        ));
    }
}
