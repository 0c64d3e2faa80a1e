//! LogSink trait - dispatch output interface
//!
//! Defines the abstract interface for sinks.

use crate::{LogContext, LogError};

/// Log destination trait
///
/// All sink implementations must implement this trait. One method per
/// severity; the dispatch worker invokes the method matching the event's
/// level. Sinks should self-handle ordinary I/O failures where they can
/// (e.g. fallback messaging); a returned error is isolated by the worker,
/// never propagated to producers.
#[trait_variant::make(LogSink: Send)]
pub trait LocalLogSink {
    /// Sink name (used for diagnostics/metrics)
    fn name(&self) -> &str;

    /// Deliver an info-level event
    ///
    /// # Errors
    /// Returns a write error (should include context)
    async fn info(&mut self, message: &str, context: &LogContext) -> Result<(), LogError>;

    /// Deliver a warning-level event
    async fn warn(&mut self, message: &str, context: &LogContext) -> Result<(), LogError>;

    /// Deliver an error-level event
    async fn error(&mut self, message: &str, context: &LogContext) -> Result<(), LogError>;

    /// Deliver a fatal-level event
    async fn fatal(&mut self, message: &str, context: &LogContext) -> Result<(), LogError>;

    /// Flush buffered output (if any)
    async fn flush(&mut self) -> Result<(), LogError>;

    /// Close the sink
    async fn close(&mut self) -> Result<(), LogError>;
}
