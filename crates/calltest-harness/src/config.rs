//! Harness configuration.
//!
//! Read from the environment; command-line flags override each field:
//! - `CALLTEST_COLOR`: `auto` (default), `always`, or `never`.
//! - `CALLTEST_COMPARE`: `exact` (default) or `type-only`. Applies to fixture
//!   cases that do not set `type_only` themselves.
//! - `CALLTEST_LOG`: path of a JSONL structured log. Unset means no log.

use std::path::PathBuf;

use calltest_core::{ColorChoice, CompareMode};

pub const COLOR_ENV: &str = "CALLTEST_COLOR";
pub const COMPARE_ENV: &str = "CALLTEST_COMPARE";
pub const LOG_ENV: &str = "CALLTEST_LOG";

/// Resolved harness settings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub color: ColorChoice,
    pub default_mode: CompareMode,
    pub log_path: Option<PathBuf>,
}

impl HarnessConfig {
    /// Read settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`. Unrecognized values fall back to the
    /// defaults; empty values count as unset.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());
        Self {
            color: get(COLOR_ENV)
                .map(|raw| ColorChoice::from_str_loose(&raw))
                .unwrap_or_default(),
            default_mode: get(COMPARE_ENV)
                .and_then(|raw| CompareMode::from_str_loose(&raw))
                .unwrap_or_default(),
            log_path: get(LOG_ENV).map(PathBuf::from),
        }
    }

    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub const fn with_default_mode(mut self, mode: CompareMode) -> Self {
        self.default_mode = mode;
        self
    }

    #[must_use]
    pub fn with_log_path(mut self, path: PathBuf) -> Self {
        self.log_path = Some(path);
        self
    }
}
