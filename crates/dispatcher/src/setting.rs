//! SinkSetting trait - configuration objects that build sinks

use contracts::LogError;

use crate::handle::SinkHandle;

/// A configuration value that can report whether it is active and construct
/// its corresponding sink.
///
/// `build` spawns the sink's worker and returns the handle, so it must be
/// called from within a tokio runtime. It may perform I/O (open a file,
/// construct an HTTP client) and may fail with
/// [`LogError::Configuration`] for missing or invalid parameters; that
/// error surfaces synchronously to the `init` caller.
pub trait SinkSetting: Send + Sync {
    /// Whether this setting should produce a sink at init time
    fn is_enabled(&self) -> bool {
        true
    }

    /// Construct the sink and spawn its worker
    ///
    /// # Errors
    /// Returns [`LogError::Configuration`] when the setting cannot be built.
    fn build(&self) -> Result<SinkHandle, LogError>;
}
