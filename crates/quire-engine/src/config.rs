//! Engine configuration.
//!
//! Every section has defaults, so an empty file (or no file) is valid:
//!
//! ```toml
//! [autosave]
//! enabled = true
//! debounce_ms = 1000
//!
//! [history]
//! limit = 100        # 0 = unbounded
//!
//! [events]
//! capacity = 1024
//!
//! [text]
//! default_field = "text"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub autosave: AutosaveConfig,
    pub history: HistoryConfig,
    pub events: EventsConfig,
    pub text: TextConfig,
}

/// Debounced auto-save settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub enabled: bool,
    /// Quiet period after the last change before saving.
    pub debounce_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum undo depth; 0 keeps everything.
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: quire_tree::DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Per-subscriber buffer; slow subscribers past this many events lag.
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Field used by split/merge when the caller names none.
    pub default_field: String,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            default_field: quire_tree::DEFAULT_TEXT_FIELD.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.autosave.debounce_ms)
    }

    pub fn with_autosave_debounce(mut self, ms: u64) -> Self {
        self.autosave.enabled = true;
        self.autosave.debounce_ms = ms;
        self
    }

    pub fn without_autosave(mut self) -> Self {
        self.autosave.enabled = false;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history.limit = limit;
        self
    }

    pub fn with_default_text_field(mut self, field: impl Into<String>) -> Self {
        self.text.default_field = field.into();
        self
    }
}
