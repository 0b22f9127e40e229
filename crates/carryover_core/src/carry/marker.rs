//! Done-marker and ignore-token codec.
//!
//! # Responsibility
//! - Build the per-day done marker in one of two textual envelopes.
//! - Escape user tokens so they can be embedded in a match pattern.
//!
//! # Invariants
//! - `build_done_marker` is pure: same inputs yield byte-identical output.
//!   The same string is written to the page and later matched against it.
//! - Blank tokens always resolve to the built-in defaults.

use regex::Regex;

/// Done token used when none is configured.
pub const DEFAULT_DONE_TOKEN: &str = "todos_transferred";
/// Ignore token used when none is configured.
pub const DEFAULT_IGNORE_TOKEN: &str = "dont_transfer";

pub const COMMENT_START: &str = "#+BEGIN_COMMENT\n";
pub const COMMENT_END: &str = "\n#+END_COMMENT";
pub const SMALL_INDICATOR_START: &str = "[^";
pub const SMALL_INDICATOR_END: &str = "]";

const PATTERN_METACHARS: &[char] = &[
    '.', '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

/// Returns the effective done token. Empty or whitespace-only tokens
/// resolve to the default; others are used untrimmed.
pub fn resolve_done_token(token: &str) -> &str {
    if token.trim().is_empty() {
        DEFAULT_DONE_TOKEN
    } else {
        token
    }
}

/// Returns the effective ignore token.
pub fn resolve_ignore_token(token: &str) -> &str {
    if token.trim().is_empty() {
        DEFAULT_IGNORE_TOKEN
    } else {
        token
    }
}

/// Wraps the done token in the comment or small-indicator envelope.
pub fn build_done_marker(token: &str, use_comment_envelope: bool) -> String {
    let token = resolve_done_token(token);
    if use_comment_envelope {
        format!("{COMMENT_START}{token}{COMMENT_END}")
    } else {
        format!("{SMALL_INDICATOR_START}{token}{SMALL_INDICATOR_END}")
    }
}

/// Both enveloped forms of one done token, comment form first.
///
/// Pruning strips either form regardless of the envelope currently
/// configured.
pub fn marker_envelopes(token: &str) -> [String; 2] {
    [build_done_marker(token, true), build_done_marker(token, false)]
}

/// Escapes regex metacharacters so `value` matches itself literally.
pub fn escape_pattern_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if PATTERN_METACHARS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Compiled "contains this marker" pattern.
#[derive(Debug, Clone)]
pub struct MarkerPattern {
    marker: String,
    regex: Regex,
}

impl MarkerPattern {
    /// Compiles a pattern matching `marker` anywhere in a block.
    pub fn new(marker: impl Into<String>) -> Result<Self, regex::Error> {
        let marker = marker.into();
        let regex = Regex::new(&escape_pattern_literal(&marker))?;
        Ok(Self { marker, regex })
    }

    /// Compiles the pattern of the done marker for `token` and envelope.
    pub fn done_marker(token: &str, use_comment_envelope: bool) -> Result<Self, regex::Error> {
        Self::new(build_done_marker(token, use_comment_envelope))
    }

    pub fn as_str(&self) -> &str {
        self.marker.as_str()
    }

    pub fn matches(&self, content: &str) -> bool {
        self.regex.is_match(content)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        build_done_marker, escape_pattern_literal, marker_envelopes, resolve_ignore_token,
        MarkerPattern, DEFAULT_DONE_TOKEN,
    };

    #[test]
    fn small_indicator_envelope_wraps_token() {
        assert_eq!(build_done_marker("done_today", false), "[^done_today]");
    }

    #[test]
    fn comment_envelope_wraps_token_on_own_line() {
        assert_eq!(
            build_done_marker("done_today", true),
            "#+BEGIN_COMMENT\ndone_today\n#+END_COMMENT"
        );
    }

    #[test]
    fn blank_tokens_fall_back_to_defaults() {
        assert_eq!(
            build_done_marker("  ", false),
            format!("[^{DEFAULT_DONE_TOKEN}]")
        );
        assert_eq!(resolve_ignore_token(""), "dont_transfer");
        assert_eq!(resolve_ignore_token(" \t "), "dont_transfer");
        assert_eq!(resolve_ignore_token("skip_me"), "skip_me");
        assert_eq!(resolve_ignore_token(" skip me "), " skip me ");
    }

    #[test]
    fn escape_covers_every_metacharacter() {
        assert_eq!(
            escape_pattern_literal(r".*+?^${}()|[]\"),
            r"\.\*\+\?\^\$\{\}\(\)\|\[\]\\"
        );
        assert_eq!(escape_pattern_literal("plain_text"), "plain_text");
    }

    #[test]
    fn marker_pattern_matches_its_own_output() {
        for comment in [true, false] {
            for token in ["todos_transferred", "a.b*c", "(x)|[y]", "$^\\"] {
                let marker = build_done_marker(token, comment);
                let pattern = MarkerPattern::done_marker(token, comment).expect("valid pattern");
                assert!(pattern.matches(&format!("before {marker} after")));
            }
        }
    }

    #[test]
    fn changed_token_no_longer_matches_old_pattern() {
        let old = MarkerPattern::done_marker("carried", false).expect("valid pattern");
        let written = build_done_marker("carried_v2", false);
        assert!(!old.matches(&written));
    }

    #[test]
    fn escaped_token_does_not_act_as_wildcard() {
        let pattern = MarkerPattern::new("a.c").expect("valid pattern");
        assert!(pattern.matches("xa.cx"));
        assert!(!pattern.matches("abc"));
    }

    #[test]
    fn envelopes_hold_comment_then_small_indicator() {
        let [comment, small] = marker_envelopes("t");
        assert!(comment.starts_with("#+BEGIN_COMMENT"));
        assert_eq!(small, "[^t]");
    }
}
