//! # Sinks
//!
//! Built-in sink adapters and their settings.
//!
//! Provides:
//! - `ConsoleSink` - stdout, text or JSON lines
//! - `FileSink` - append to disk with optional size rotation
//! - `TelegramSink` - chat alerting with MarkdownV2 formatting

pub mod console;
pub mod file;
pub mod format;
pub mod telegram;

pub use console::{ConsoleSetting, ConsoleSink};
pub use file::{FileSetting, FileSink};
pub use format::LineFormat;
pub use telegram::{TelegramSetting, TelegramSink};

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_queue_capacity() -> usize {
    64
}
