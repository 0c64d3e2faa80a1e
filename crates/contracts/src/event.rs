//! Log event: the unit flowing through the dispatch queue

use crate::{Level, LogContext};

/// A single log event
///
/// The message already carries its level tag prefix (e.g. `"[ERROR] ..."`)
/// by the time it reaches the dispatch queue.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
    pub context: LogContext,
}

impl LogEvent {
    pub fn new(level: Level, message: impl Into<String>, context: LogContext) -> Self {
        Self {
            level,
            message: message.into(),
            context,
        }
    }
}
