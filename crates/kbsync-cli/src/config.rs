//! Command line configuration
//!
//! One TOML file holds the helpdesk settings at top level plus optional
//! `[sheets]` and `[preview]` sections:
//!
//! ```toml
//! api_key = "..."
//! domain = "acme"
//! portal_scope_ids = [7]
//!
//! [retry]
//! max_attempts = 3
//!
//! [sheets]
//! access_token = "..."
//! ```

use anyhow::Context;
use kbsync_api::HelpdeskConfig;
use kbsync_preview::PreviewOptions;
use kbsync_sheet::SheetsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable that overrides the configured API key
pub(crate) const API_KEY_ENV: &str = "KBSYNC_API_KEY";

/// Default configuration file name
pub(crate) const DEFAULT_CONFIG_FILE: &str = "kbsync.toml";

/// Everything the `kbsync` binary can be configured with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SyncConfig {
    /// Helpdesk connection
    #[serde(flatten)]
    pub(crate) helpdesk: HelpdeskConfig,
    /// Hosted spreadsheet backend, used for write-back without a local workbook
    #[serde(default)]
    pub(crate) sheets: Option<SheetsConfig>,
    /// Preview page references
    #[serde(default)]
    pub(crate) preview: PreviewOptions,
}

impl SyncConfig {
    /// Decode a TOML document
    pub(crate) fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Read a configuration file
    ///
    /// A missing file yields the defaults, so commands that never reach
    /// the helpdesk work without one.
    pub(crate) fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Replace the API key when `key` is set and non-blank
    #[must_use]
    pub(crate) fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.helpdesk.api_key = key;
        }
        self
    }

    /// Apply [`API_KEY_ENV`]
    #[must_use]
    pub(crate) fn with_env(self) -> Self {
        self.with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }
}
