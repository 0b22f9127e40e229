//! Carry-over configuration.
//!
//! # Responsibility
//! - Hold the user-facing settings the orchestrator consumes.
//! - Load them from a TOML file with per-key fallbacks.
//!
//! # Invariants
//! - Every setting has a hardcoded default; a missing file or key is never
//!   an error.
//! - Effective tokens are resolved at use time, so a blank token in the file
//!   behaves like the default.

use crate::carry::marker::{
    build_done_marker, resolve_ignore_token, DEFAULT_DONE_TOKEN, DEFAULT_IGNORE_TOKEN,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default seconds between scheduler ticks.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
/// Default `strftime` format for journal page names.
pub const DEFAULT_PAGE_NAME_FORMAT: &str = "%Y-%m-%d";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from strict configuration loading and saving.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Serialize(toml::ser::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "config io error at `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
        }
    }
}

/// Settings consumed by the carry-over run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarryConfig {
    /// Token inside the done marker. Blank means `todos_transferred`.
    pub done_token: String,
    /// `true` wraps the done marker in a hidden comment block, `false` in a
    /// small `[^token]` indicator.
    pub done_as_comment: bool,
    /// Blocks containing this token are never carried. Blank means
    /// `dont_transfer`.
    pub ignore_token: String,
    /// Template page applied once to today's journal. Blank means none.
    pub journal_template: String,
    /// Seconds between scheduler ticks.
    pub interval_secs: u64,
    /// `strftime` format of journal page names.
    pub page_name_format: String,
}

impl Default for CarryConfig {
    fn default() -> Self {
        Self {
            done_token: DEFAULT_DONE_TOKEN.to_string(),
            done_as_comment: false,
            ignore_token: DEFAULT_IGNORE_TOKEN.to_string(),
            journal_template: String::new(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            page_name_format: DEFAULT_PAGE_NAME_FORMAT.to_string(),
        }
    }
}

impl CarryConfig {
    /// Enveloped done marker for the current settings.
    pub fn done_marker(&self) -> String {
        build_done_marker(&self.done_token, self.done_as_comment)
    }

    /// Effective ignore token.
    pub fn effective_ignore_token(&self) -> &str {
        resolve_ignore_token(&self.ignore_token)
    }

    /// Configured template name, if any.
    pub fn journal_template(&self) -> Option<&str> {
        let name = self.journal_template.trim();
        (!name.is_empty()).then_some(name)
    }

    /// Tick interval, never shorter than one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// Literal rewrites needed to move today's page from `self` to `next`.
    ///
    /// Returns `(old, new)` pairs for the done marker and the ignore token
    /// when their effective values differ.
    pub fn rewrites_to(&self, next: &CarryConfig) -> Vec<(String, String)> {
        let mut rewrites = Vec::new();
        let (old_marker, new_marker) = (self.done_marker(), next.done_marker());
        if old_marker != new_marker {
            rewrites.push((old_marker, new_marker));
        }
        let (old_ignore, new_ignore) = (
            self.effective_ignore_token(),
            next.effective_ignore_token(),
        );
        if old_ignore != new_ignore {
            rewrites.push((old_ignore.to_string(), new_ignore.to_string()));
        }
        rewrites
    }

    /// Renders the config as TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

/// Loads configuration strictly.
///
/// A missing file yields defaults; unreadable or malformed files are errors.
pub fn load_config(path: &Path) -> ConfigResult<CarryConfig> {
    if !path.is_file() {
        return Ok(CarryConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads configuration, falling back to defaults on any error.
pub fn load_config_or_default(path: &Path) -> CarryConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(err) => {
            warn!(
                "event=config_load module=config status=fallback path={} error={}",
                path.display(),
                err
            );
            CarryConfig::default()
        }
    }
}

/// Writes configuration as TOML, creating parent directories.
pub fn save_config(path: &Path, config: &CarryConfig) -> ConfigResult<()> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, config.to_toml()?).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::{load_config, load_config_or_default, save_config, CarryConfig, ConfigError};
    use std::time::Duration;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: CarryConfig =
            toml::from_str("done_as_comment = true\n").expect("partial config parses");
        assert!(config.done_as_comment);
        assert_eq!(config.done_token, "todos_transferred");
        assert_eq!(config.ignore_token, "dont_transfer");
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.journal_template(), None);
    }

    #[test]
    fn blank_tokens_resolve_to_defaults() {
        let config = CarryConfig {
            done_token: String::new(),
            ignore_token: " ".to_string(),
            ..CarryConfig::default()
        };
        assert_eq!(config.done_marker(), "[^todos_transferred]");
        assert_eq!(config.effective_ignore_token(), "dont_transfer");
    }

    #[test]
    fn zero_interval_is_clamped() {
        let config = CarryConfig {
            interval_secs: 0,
            ..CarryConfig::default()
        };
        assert_eq!(config.interval(), Duration::from_secs(1));
    }

    #[test]
    fn rewrites_cover_marker_envelope_and_ignore_token() {
        let current = CarryConfig::default();
        let next = CarryConfig {
            done_as_comment: true,
            ignore_token: "private".to_string(),
            ..CarryConfig::default()
        };

        let rewrites = current.rewrites_to(&next);

        assert_eq!(
            rewrites,
            vec![
                (
                    "[^todos_transferred]".to_string(),
                    "#+BEGIN_COMMENT\ntodos_transferred\n#+END_COMMENT".to_string()
                ),
                ("dont_transfer".to_string(), "private".to_string()),
            ]
        );
        assert!(current.rewrites_to(&current.clone()).is_empty());
    }

    #[test]
    fn save_then_load_round_trips_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("carryover.toml");
        let config = CarryConfig {
            journal_template: "daily".to_string(),
            interval_secs: 300,
            ..CarryConfig::default()
        };

        save_config(&path, &config).expect("save config");

        assert_eq!(load_config(&path).expect("load config"), config);
    }

    #[test]
    fn malformed_file_is_strict_error_and_lenient_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("carryover.toml");
        std::fs::write(&path, "interval_secs = \"often\"").expect("write config");

        let err = load_config(&path).expect_err("malformed config must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(load_config_or_default(&path), CarryConfig::default());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config, CarryConfig::default());
    }
}
