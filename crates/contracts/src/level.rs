//! Severity levels with total ordering and lenient parsing

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LogError;

/// Log severity level
///
/// The derived `Ord` follows the declaration order, so
/// `Info < Warning < Error < Fatal` holds by construction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Routine operational messages
    #[default]
    Info = 1,
    /// Something suspicious, but the process continues
    #[serde(alias = "warn")]
    Warning = 2,
    /// An operation failed
    Error = 3,
    /// The process is about to fall over
    Fatal = 4,
}

impl Level {
    /// Canonical lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }

    /// Message prefix tag, e.g. `"[WARNING]"`
    pub fn tag(self) -> &'static str {
        match self {
            Level::Info => "[INFO]",
            Level::Warning => "[WARNING]",
            Level::Error => "[ERROR]",
            Level::Fatal => "[FATAL]",
        }
    }

    /// Numeric code (1..=4)
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a numeric level code
    ///
    /// Unknown codes fall back to [`Level::Info`] so that a corrupt or
    /// out-of-range value still renders as the lowest severity.
    pub fn from_code(code: u8) -> Self {
        match code {
            2 => Level::Warning,
            3 => Level::Error,
            4 => Level::Fatal,
            _ => Level::Info,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    /// Case-insensitive parse; accepts both `"warn"` and `"warning"`.
    ///
    /// # Errors
    /// Returns [`LogError::InvalidLevel`] for unrecognized input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            _ => Err(LogError::invalid_level(s)),
        }
    }
}
