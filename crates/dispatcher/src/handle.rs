//! SinkHandle - manages a sink with isolated queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use contracts::{Level, LogEvent, LogSink};

use crate::metrics::SinkMetrics;

/// Handle to a running sink worker
///
/// Each sink runs on its own task behind a bounded queue. The worker is
/// strictly sequential, so a sink observes events in exactly the order they
/// were forwarded, with no interleaving.
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Severity floor; events below it are never forwarded
    minimum_level: Level,
    /// Channel to send events to the worker
    tx: mpsc::Sender<LogEvent>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: LogSink + Send + 'static>(
        sink: S,
        minimum_level: Level,
        queue_capacity: usize,
    ) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            minimum_level,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured severity floor
    pub fn minimum_level(&self) -> Level {
        self.minimum_level
    }

    /// Whether an event at `level` passes this sink's severity floor
    pub fn accepts(&self, level: Level) -> bool {
        level >= self.minimum_level
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Forward an event to the sink worker
    ///
    /// Awaits queue space when the sink's queue is full, so delivery is
    /// lossless; a persistently slow sink backpressures the caller instead
    /// of dropping events.
    pub async fn forward(&self, event: LogEvent) {
        if self.tx.send(event).await.is_err() {
            self.metrics.inc_failure_count();
            error!(sink = %self.name, "Sink worker closed unexpectedly");
        }
    }

    /// Shutdown the sink worker gracefully
    ///
    /// Drains everything already queued, then flushes and closes the sink.
    #[instrument(name = "sink_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        // Drop sender to signal worker to stop
        drop(self.tx);
        // Wait for worker to finish
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

/// Worker task that consumes events and delivers them to the sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: LogSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<LogEvent>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(event) = rx.recv().await {
        // Update queue length
        metrics.set_queue_len(rx.len());

        let result = match event.level {
            Level::Info => sink.info(&event.message, &event.context).await,
            Level::Warning => sink.warn(&event.message, &event.context).await,
            Level::Error => sink.error(&event.message, &event.context).await,
            Level::Fatal => sink.fatal(&event.message, &event.context).await,
        };

        match result {
            Ok(()) => {
                metrics.inc_delivered_count();
            }
            Err(e) => {
                metrics.inc_failure_count();
                error!(
                    sink = %name,
                    level = %event.level,
                    error = %e,
                    "Delivery failed"
                );
                // Continue processing - don't crash on single failure
            }
        }
    }

    // Cleanup
    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}
