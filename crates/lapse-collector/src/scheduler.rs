//! Minute-boundary scheduler.
//!
//! Sleeps until the next `* * * * *` fire time, then asks the collector
//! whether a flush is due. Runs as its own task; talks to the collector only
//! through ordinary calls.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use lapse_core::clock::next_minute_boundary;

use crate::collector::{Collector, FlushOutcome};

/// Time left until the next minute boundary.
pub fn until_next_minute(now: DateTime<Utc>) -> Duration {
    (next_minute_boundary(now) - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Run until `shutdown` flips to `true` (or its sender is dropped), then do
/// one final unconditional flush so completed traces are not lost.
///
/// Waits are measured on the collector's clock, the same one `flush_if_due`
/// compares against.
pub async fn run(collector: Arc<Collector>, mut shutdown: watch::Receiver<bool>) {
    tracing::info!("minute scheduler started");
    loop {
        let wait = until_next_minute(collector.registry().now());
        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                if let FlushOutcome::Delivered { traces, keys } = collector.flush_if_due().await {
                    tracing::info!(traces, keys, "minute report delivered");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    let outcome = collector.flush().await;
    tracing::info!(?outcome, "minute scheduler stopped");
}

/// Spawn `run` on the current runtime.
pub fn spawn(collector: Arc<Collector>, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(run(collector, shutdown))
}
