//! Logger - lifecycle manager and level entry points
//!
//! Coordinates init/reinit/stop of the dispatch instance under one lock and
//! funnels every logging call through it. The lock guards only the instance
//! slot and submission; the consumer loop runs unlocked.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use contracts::{ContextValue, Level, LogContext, LogError, LogEvent};
use dispatcher::{Dispatcher, MetricsSnapshot, SinkSetting};

use crate::trace::enrich_error_context;

/// Lifecycle states of a logger handle
enum State {
    /// Never initialized; logging no-ops
    Idle,
    /// Dispatching to a live instance
    Running(Dispatcher),
    /// Explicitly stopped; logging no-ops until the next `init`
    Stopped,
}

/// An explicitly owned logging handle
///
/// Cheap to clone; all clones share one dispatch instance. Construct one at
/// the application root and pass it down - several independent handles can
/// coexist in the same process.
///
/// Logging calls before [`Logger::init`] or after [`Logger::stop`] are
/// silently accepted and dropped; they never fail.
#[derive(Clone, Default)]
pub struct Logger {
    state: Arc<Mutex<State>>,
}

impl Default for State {
    fn default() -> Self {
        State::Idle
    }
}

impl Logger {
    /// Create an uninitialized handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every enabled setting into a sink and start dispatching
    ///
    /// A running instance is fully drained before any replacement sink is
    /// built, so no event is ever processed by a stale and a fresh instance
    /// concurrently.
    ///
    /// # Errors
    /// Returns the first [`LogError::Configuration`] a setting produces.
    /// Sinks built before the failure are shut down again; the handle is
    /// left without a running instance.
    pub async fn init<I>(&self, settings: I) -> Result<(), LogError>
    where
        I: IntoIterator<Item = Box<dyn SinkSetting>>,
    {
        let mut state = self.state.lock().await;

        // Drain the old instance first; its consumer must have exited
        // before the replacement's sinks are built.
        if let State::Running(old) = std::mem::replace(&mut *state, State::Stopped) {
            old.drain_and_stop().await;
        }

        let mut handles = Vec::new();
        for setting in settings {
            if !setting.is_enabled() {
                continue;
            }
            match setting.build() {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    for built in handles {
                        built.shutdown().await;
                    }
                    return Err(e);
                }
            }
        }

        info!(sinks = handles.len(), "Logger initialized");
        *state = State::Running(Dispatcher::start(handles));
        Ok(())
    }

    /// Drain the running instance and stop dispatching
    ///
    /// Blocks until every already-submitted event has been processed by
    /// every sink. Safe to call repeatedly.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        if let State::Running(dispatcher) = std::mem::replace(&mut *state, State::Stopped) {
            dispatcher.drain_and_stop().await;
            info!("Logger stopped");
        }
    }

    /// Log at info level
    pub async fn info(&self, message: &str, context: Option<&LogContext>) {
        self.log(Level::Info, message, context.cloned().unwrap_or_default())
            .await;
    }

    /// Log at warning level
    pub async fn warn(&self, message: &str, context: Option<&LogContext>) {
        self.log(Level::Warning, message, context.cloned().unwrap_or_default())
            .await;
    }

    /// Log at error level; the context is enriched with a stack trace
    pub async fn error(&self, message: &str, context: Option<&LogContext>) {
        self.log(Level::Error, message, enrich_error_context(context))
            .await;
    }

    /// Log at fatal level; the context is enriched with a stack trace
    pub async fn fatal(&self, message: &str, context: Option<&LogContext>) {
        self.log(Level::Fatal, message, enrich_error_context(context))
            .await;
    }

    async fn log(&self, level: Level, message: &str, context: LogContext) {
        let state = self.state.lock().await;
        let State::Running(dispatcher) = &*state else {
            return;
        };

        let event = LogEvent::new(level, format!("{} {message}", level.tag()), context);
        dispatcher.submit(event).await;
    }

    /// Run `scope`, logging a panic as a single fatal event instead of
    /// propagating it
    ///
    /// On unwind the recovered payload lands under key `panic` and the
    /// caller-supplied context under key `ctx`, enriched with a stack
    /// trace; the call then returns `None`. A normal exit returns
    /// `Some(value)` and logs nothing.
    pub async fn recover<T>(
        &self,
        context: Option<&LogContext>,
        scope: impl FnOnce() -> T,
    ) -> Option<T> {
        match catch_unwind(AssertUnwindSafe(scope)) {
            Ok(value) => Some(value),
            Err(payload) => {
                let recovered = LogContext::new()
                    .with("panic", panic_payload_value(payload.as_ref()))
                    .with("ctx", context.cloned().unwrap_or_default());
                self.fatal("Panic recovered", Some(&recovered)).await;
                None
            }
        }
    }

    /// Delivery metrics of the running instance (empty when not running)
    pub async fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        let state = self.state.lock().await;
        match &*state {
            State::Running(dispatcher) => dispatcher.metrics(),
            _ => Vec::new(),
        }
    }
}

fn panic_payload_value(payload: &(dyn Any + Send)) -> ContextValue {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).into()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str().into()
    } else {
        "<non-string panic payload>".into()
    }
}
