//! ConsoleSink - writes rendered lines to stdout

use std::io::Write;

use serde::{Deserialize, Serialize};

use contracts::{Level, LogContext, LogError, LogSink};
use dispatcher::{SinkHandle, SinkSetting};

use crate::format::{render_line, LineFormat};
use crate::{default_queue_capacity, default_true};

/// Configuration for the console sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleSetting {
    /// Whether the sink is built at init time
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Severity floor
    #[serde(default)]
    pub minimum_level: Level,
    /// Line format
    #[serde(default)]
    pub format: LineFormat,
    /// Worker queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for ConsoleSetting {
    fn default() -> Self {
        Self {
            enabled: true,
            minimum_level: Level::Info,
            format: LineFormat::Text,
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl SinkSetting for ConsoleSetting {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn build(&self) -> Result<SinkHandle, LogError> {
        let sink = ConsoleSink::new(self.format);
        Ok(SinkHandle::spawn(sink, self.minimum_level, self.queue_capacity))
    }
}

/// Sink that renders events to stdout
pub struct ConsoleSink {
    name: String,
    format: LineFormat,
}

impl ConsoleSink {
    /// Create a new ConsoleSink with the given line format
    pub fn new(format: LineFormat) -> Self {
        Self {
            name: "console".to_string(),
            format,
        }
    }

    fn write_line(
        &self,
        level: Level,
        message: &str,
        context: &LogContext,
    ) -> Result<(), LogError> {
        let line = render_line(self.format, level, message, context);
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}")?;
        Ok(())
    }
}

impl LogSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn info(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
        self.write_line(Level::Info, message, context)
    }

    async fn warn(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
        self.write_line(Level::Warning, message, context)
    }

    async fn error(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
        self.write_line(Level::Error, message, context)
    }

    async fn fatal(&mut self, message: &str, context: &LogContext) -> Result<(), LogError> {
        self.write_line(Level::Fatal, message, context)
    }

    async fn flush(&mut self) -> Result<(), LogError> {
        std::io::stdout().flush()?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), LogError> {
        Ok(())
    }
}
