//! Dispatcher - bounded queue, single consumer, fan-out to sinks

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use contracts::LogEvent;

use crate::handle::SinkHandle;
use crate::metrics::{MetricsSnapshot, SinkMetrics};

/// Reference capacity of the main event queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// A running dispatch instance
///
/// Owns the bounded FIFO and exactly one background consumer task. Producers
/// interact only through [`Dispatcher::submit`]; the consumer fans each
/// event out to every sink handle whose severity floor it passes, in the
/// fixed registration order.
///
/// Full-queue policy: `submit` awaits space rather than dropping. Nothing is
/// ever lost between `submit` returning and a completed drain.
pub struct Dispatcher {
    tx: mpsc::Sender<LogEvent>,
    consumer_handle: JoinHandle<()>,
    sink_metrics: Vec<(String, Arc<SinkMetrics>)>,
}

impl Dispatcher {
    /// Start a dispatcher over `handles` with the reference queue capacity
    ///
    /// Spawns the consumer task and returns immediately.
    pub fn start(handles: Vec<SinkHandle>) -> Self {
        Self::start_with_capacity(handles, DEFAULT_QUEUE_CAPACITY)
    }

    /// Start a dispatcher with an explicit main-queue capacity
    #[instrument(name = "dispatcher_start", skip(handles), fields(sinks = handles.len()))]
    pub fn start_with_capacity(handles: Vec<SinkHandle>, queue_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));

        let sink_metrics = handles
            .iter()
            .map(|h| (h.name().to_string(), Arc::clone(h.metrics())))
            .collect();

        let consumer_handle = tokio::spawn(consumer_loop(rx, handles));

        Self {
            tx,
            consumer_handle,
            sink_metrics,
        }
    }

    /// Enqueue an event
    ///
    /// Awaits space when the queue is at capacity. If the instance has
    /// already been torn down this is a silent no-op; it never errors.
    pub async fn submit(&self, event: LogEvent) {
        if self.tx.send(event).await.is_err() {
            debug!("Dispatch queue closed, event discarded");
        }
    }

    /// Get delivery metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.sink_metrics
            .iter()
            .map(|(name, m)| (name.clone(), m.snapshot()))
            .collect()
    }

    /// Signal that no more events will be submitted, then block until the
    /// consumer has processed everything already enqueued (including each
    /// sink's own queue).
    ///
    /// Consumes the instance, so a second stop is unrepresentable.
    #[instrument(name = "dispatcher_drain_and_stop", skip(self))]
    pub async fn drain_and_stop(self) {
        // Close the queue; the consumer drains the remainder, then shuts
        // down every sink handle.
        drop(self.tx);
        if let Err(e) = self.consumer_handle.await {
            error!(error = ?e, "Consumer task panicked");
        }
    }
}

/// Consumer loop: strictly sequential FIFO fan-out
///
/// Runs until the queue closes, then drains and shuts down all handles.
#[instrument(name = "dispatcher_consumer_loop", skip(rx, handles))]
async fn consumer_loop(mut rx: mpsc::Receiver<LogEvent>, handles: Vec<SinkHandle>) {
    info!(sinks = handles.len(), "Dispatcher started");

    let mut event_count: u64 = 0;

    while let Some(event) = rx.recv().await {
        event_count += 1;
        for handle in &handles {
            if handle.accepts(event.level) {
                handle.forward(event.clone()).await;
            }
        }
    }

    info!(events = event_count, "Dispatch queue closed, shutting down");

    for handle in handles {
        handle.shutdown().await;
    }

    info!("Dispatcher shutdown complete");
}
