//! lapse collector demo binary.
//!
//! - Loads `lapse.yaml` (or the path given as first argument)
//! - Builds the configured stream driver and a collector
//! - Spawns the minute scheduler
//! - Runs an instrumented demo workload until Ctrl-C, then flushes once more

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use lapse_collector::{config, scheduler, Collector, Traced};
use lapse_core::trace_key;

const DEFAULT_CONFIG: &str = "lapse.yaml";

#[derive(Debug)]
struct DemoError(String);

impl std::fmt::Display for DemoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

async fn fetch_page(n: u64) -> Result<u64, DemoError> {
    tokio::time::sleep(Duration::from_millis(20 + (n * 37) % 180)).await;
    if n % 11 == 0 {
        return Err(DemoError(format!("page {n} unavailable")));
    }
    Ok(n)
}

#[tokio::main]
async fn main() -> lapse_core::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1);
    let cfg = match path.as_deref() {
        Some(p) => config::load_from_file(p)?,
        None if Path::new(DEFAULT_CONFIG).exists() => config::load_from_file(DEFAULT_CONFIG)?,
        None => config::CollectorConfig::default(),
    };

    let driver = config::build_driver(&cfg)?;
    let mut builder = Collector::builder().driver(driver);
    if let Some(h) = &cfg.instance.hostname {
        builder = builder.hostname(h.clone());
    }
    let collector = Arc::new(builder.build());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sched = scheduler::spawn(collector.clone(), shutdown_rx);

    let mut tick = tokio::time::interval(Duration::from_millis(500));
    let mut n: u64 = 0;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                n += 1;
                let page = fetch_page(n).traced_result(&collector, trace_key!("fetch_page"));
                if let Err(e) = page.await {
                    tracing::debug!(error = %e, "demo call failed");
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    tracing::info!("shutting down");
    let _ = shutdown_tx.send(true);
    sched
        .await
        .map_err(|e| lapse_core::LapseError::Internal(format!("scheduler task failed: {e}")))?;
    Ok(())
}
