//! # Contracts
//!
//! Frozen interface contracts, defining inter-crate data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Severity Model
//! - Four fixed levels with a strict total order: info < warning < error < fatal
//! - A sink receives an event iff `event.level >= sink.minimum_level`

mod context;
mod error;
mod event;
mod level;
mod sink;

pub use context::{ContextValue, DetailedTrace, LogContext, LoggedError};
pub use error::LogError;
pub use event::LogEvent;
pub use level::Level;
pub use sink::*;
