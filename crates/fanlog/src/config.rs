//! Configuration loading
//!
//! Declarative sink configuration from TOML, for applications that prefer a
//! config file over wiring settings in code.
//!
//! ```toml
//! [[sink]]
//! type = "console"
//! minimum_level = "info"
//! format = "text"
//!
//! [[sink]]
//! type = "file"
//! path = "logs/app.log"
//! minimum_level = "warn"
//! max_size_mb = 10
//! max_backups = 5
//! ```

use std::path::Path;

use serde::Deserialize;

use contracts::LogError;
use dispatcher::SinkSetting;
use sinks::{ConsoleSetting, FileSetting, TelegramSetting};

/// Root of a logger configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggerConfig {
    /// Sink declarations, in registration order
    #[serde(default, rename = "sink")]
    pub sinks: Vec<SinkConfig>,
}

/// One declared sink, tagged by `type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    Console(ConsoleSetting),
    File(FileSetting),
    Telegram(TelegramSetting),
}

impl SinkConfig {
    fn into_setting(self) -> Box<dyn SinkSetting> {
        match self {
            SinkConfig::Console(setting) => Box::new(setting),
            SinkConfig::File(setting) => Box::new(setting),
            SinkConfig::Telegram(setting) => Box::new(setting),
        }
    }
}

impl LoggerConfig {
    /// Parse TOML configuration text
    ///
    /// # Errors
    /// Returns [`LogError::ConfigParse`] with the underlying parse error
    /// attached.
    pub fn from_toml(content: &str) -> Result<Self, LogError> {
        toml::from_str(content).map_err(|e| LogError::ConfigParse {
            message: format!("TOML parse error: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Load and parse a TOML configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Convert the declarations into settings for [`crate::Logger::init`]
    pub fn into_settings(self) -> Vec<Box<dyn SinkSetting>> {
        self.sinks.into_iter().map(SinkConfig::into_setting).collect()
    }
}
