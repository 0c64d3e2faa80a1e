//! # Dispatcher
//!
//! The asynchronous dispatch engine.
//!
//! Responsible for:
//! - Consuming `LogEvent`s from one bounded FIFO queue
//! - Fan-out to every registered sink at or above its severity floor
//! - Isolating slow or failing sinks from producers

pub mod dispatcher;
pub mod handle;
pub mod metrics;
pub mod setting;

pub use contracts::{Level, LogEvent, LogSink};
pub use dispatcher::{Dispatcher, DEFAULT_QUEUE_CAPACITY};
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use setting::SinkSetting;
