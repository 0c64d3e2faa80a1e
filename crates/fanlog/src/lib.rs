//! # Fanlog
//!
//! A composite logging facade: one call fans a log event out to multiple
//! independently-configured destinations, with per-destination severity
//! filtering and stack-trace enrichment for error-level events.
//!
//! The [`Logger`] handle is explicitly owned - construct one at the
//! application root and pass clones down; there is no implicit global.
//!
//! ```ignore
//! use fanlog::{ConsoleSetting, FileSetting, LogContext, Logger};
//!
//! let logger = Logger::new();
//! logger
//!     .init([
//!         Box::new(ConsoleSetting::default()) as _,
//!         Box::new(FileSetting::new("logs/app.log")) as _,
//!     ])
//!     .await?;
//!
//! logger
//!     .info("Application started", Some(&LogContext::new().with("version", "1.0.0")))
//!     .await;
//!
//! logger.stop().await;
//! ```

pub mod config;
pub mod logger;
pub mod trace;

pub use config::{LoggerConfig, SinkConfig};
pub use logger::Logger;
pub use trace::enrich_error_context;

pub use contracts::{
    ContextValue, DetailedTrace, Level, LogContext, LogError, LogEvent, LogSink, LoggedError,
};
pub use dispatcher::{Dispatcher, MetricsSnapshot, SinkHandle, SinkSetting};
pub use sinks::{ConsoleSetting, ConsoleSink, FileSetting, FileSink, LineFormat, TelegramSetting, TelegramSink};
