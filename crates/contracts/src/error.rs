//! Layered error definitions
//!
//! Categorized by source: configuration / level parsing / sink delivery

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum LogError {
    // ===== Configuration Errors =====
    /// A sink setting cannot be built into a sink
    #[error("configuration error for sink '{sink}': {message}")]
    Configuration { sink: String, message: String },

    /// Configuration text could not be parsed
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== Level Errors =====
    /// Text does not name a known severity level
    #[error("invalid log level '{input}'")]
    InvalidLevel { input: String },

    // ===== Sink Errors =====
    /// Sink delivery error (isolated at the worker, never reaches producers)
    #[error("sink '{sink}' write error: {message}")]
    SinkWrite { sink: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogError {
    /// Create a configuration error
    pub fn configuration(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a config parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid-level error
    pub fn invalid_level(input: impl Into<String>) -> Self {
        Self::InvalidLevel {
            input: input.into(),
        }
    }

    /// Create a sink write error
    pub fn sink_write(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink: sink.into(),
            message: message.into(),
        }
    }
}
