//! Open-task and opt-out classification of single blocks.

use crate::carry::marker::{escape_pattern_literal, resolve_ignore_token};
use once_cell::sync::Lazy;
use regex::Regex;

static OPEN_TASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(TODO)\s+").expect("valid open task regex"));

/// Returns whether `content` starts with `TODO` followed by whitespace.
///
/// Case-sensitive. No other task states are recognized.
pub fn is_open_task(content: &str) -> bool {
    OPEN_TASK_RE.is_match(content)
}

/// Returns whether `content` contains the ignore token.
///
/// Compiles the token on every call; use `IgnoreRule` inside tree walks.
pub fn is_ignored(content: &str, ignore_token: &str) -> bool {
    match IgnoreRule::new(ignore_token) {
        Ok(rule) => rule.matches(content),
        Err(_) => content.contains(resolve_ignore_token(ignore_token)),
    }
}

/// Compiled opt-out check for one run.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    token: String,
    regex: Regex,
}

impl IgnoreRule {
    /// Compiles an unanchored "contains" pattern for `token`.
    ///
    /// A blank token resolves to the default ignore token.
    pub fn new(token: &str) -> Result<Self, regex::Error> {
        let token = resolve_ignore_token(token).to_string();
        let regex = Regex::new(&escape_pattern_literal(&token))?;
        Ok(Self { token, regex })
    }

    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    pub fn matches(&self, content: &str) -> bool {
        self.regex.is_match(content)
    }
}
