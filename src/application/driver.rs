// Sample driver - Timer task feeding a sample source into the shared graph
use crate::application::graph::{now_ms, SharedGraph};
use crate::application::sample_source::SampleSource;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Owns the producer task. The timer is released by `shutdown`, or aborted
/// when the driver is dropped without one.
pub struct SampleDriver {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SampleDriver {
    pub fn spawn<S>(graph: SharedGraph, mut source: S, interval: Duration) -> Self
    where
        S: SampleSource + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!("Sample driver started ({:?} interval)", interval);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let values = match source.next_values().await {
                            Ok(values) => values,
                            Err(e) => {
                                tracing::warn!("Sample source failed: {}", e);
                                continue;
                            }
                        };

                        let report = graph.lock().await.push(&values, now_ms());
                        if !report.unknown_keys.is_empty() {
                            tracing::debug!("Source produced unknown series: {:?}", report.unknown_keys);
                        }
                    }
                }
            }

            tracing::info!("Sample driver stopped");
        });

        Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Stop the timer and wait for the task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Sample driver task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for SampleDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
