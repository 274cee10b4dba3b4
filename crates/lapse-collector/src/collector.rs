//! Trace lifecycle controller.
//!
//! Owns the registry, the instance identity, and the configured driver.
//! Built once by whoever bootstraps the application and shared via `Arc`.
//!
//! Per-trace states: `InFlight -> Completed -> Drained`, or
//! `InFlight -> FailedSynthetic -> Drained` when the wrapped call errors.
//! Only `flush` drains.

use std::sync::{Arc, OnceLock};

use lapse_core::clock::{crossed_minute, minute_bucket, Clock, SystemClock};
use lapse_core::error::{LapseError, Result};
use lapse_core::{summarize, InstanceIdentity, Report, TraceId};

use crate::drivers::{StdoutDriver, StreamDriver};
use crate::registry::TraceRegistry;

/// Result of one flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// No rollover since the oldest trace started.
    NotDue,
    /// Nothing eligible; the driver was not called.
    Skipped,
    /// A report was handed to the driver.
    Delivered { traces: usize, keys: usize },
}

pub struct Collector {
    registry: TraceRegistry,
    identity: OnceLock<InstanceIdentity>,
    hostname: Option<String>,
    driver: Arc<dyn StreamDriver>,
}

#[derive(Default)]
pub struct CollectorBuilder {
    driver: Option<Arc<dyn StreamDriver>>,
    clock: Option<Arc<dyn Clock>>,
    hostname: Option<String>,
}

impl CollectorBuilder {
    pub fn driver(mut self, driver: Arc<dyn StreamDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Override the resolved hostname in the instance identity.
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn build(self) -> Collector {
        let driver = self.driver.unwrap_or_else(|| Arc::new(StdoutDriver::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let collector = Collector {
            registry: TraceRegistry::new(clock),
            identity: OnceLock::new(),
            hostname: self.hostname,
            driver,
        };
        let instance = collector.identity();
        tracing::info!(
            driver = collector.driver.name(),
            "new instance initialized {}@{}",
            instance.id,
            instance.hostname
        );
        collector
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Collector {
    pub fn builder() -> CollectorBuilder {
        CollectorBuilder::default()
    }

    pub fn new(driver: Arc<dyn StreamDriver>) -> Self {
        Self::builder().driver(driver).build()
    }

    /// Instance identity, resolved on first call and fixed afterwards.
    pub fn identity(&self) -> &InstanceIdentity {
        self.identity.get_or_init(|| {
            let hostname = self
                .hostname
                .clone()
                .unwrap_or_else(|| gethostname::gethostname().to_string_lossy().into_owned());
            InstanceIdentity::generate(hostname)
        })
    }

    pub fn registry(&self) -> &TraceRegistry {
        &self.registry
    }

    pub fn driver(&self) -> &dyn StreamDriver {
        self.driver.as_ref()
    }

    // ---- transitions

    pub fn begin(&self, key: impl Into<String>) -> TraceId {
        let key = key.into();
        let id = self.registry.begin(key.as_str());
        tracing::trace!(%id, key = %key, "trace begin");
        id
    }

    pub fn complete(&self, id: TraceId) -> Result<()> {
        let trace = self.registry.complete(id)?;
        tracing::trace!(
            %id,
            key = %trace.key,
            total_ms = trace.total_time.unwrap_or_default(),
            "trace complete"
        );
        Ok(())
    }

    /// Replace the in-flight trace `id` with a zero-duration failure trace.
    /// The failure is recorded even if `id` is already gone.
    pub fn fail(&self, id: TraceId, key: &str, error_class: &str, message: &str) -> TraceId {
        if let Err(e) = self.registry.abandon(id) {
            tracing::debug!(%id, key = %key, error = %e, "failed trace was not in flight");
        }
        let failure = self.registry.record_failure(key, error_class, message);
        tracing::debug!(%id, key = %key, class = %error_class, "trace failed");
        failure
    }

    // ---- flushing

    /// Flush when the oldest registered trace started in an earlier minute.
    pub async fn flush_if_due(&self) -> FlushOutcome {
        let Some(oldest) = self.registry.oldest_start_time() else {
            return FlushOutcome::NotDue;
        };
        let now = self.registry.now();
        if !crossed_minute(oldest, now) {
            return FlushOutcome::NotDue;
        }
        self.flush().await
    }

    /// Drain eligible traces, summarize them, and hand the report to the driver.
    pub async fn flush(&self) -> FlushOutcome {
        let now = self.registry.now();
        let drained = self.registry.drain_eligible(now);
        if drained.is_empty() {
            tracing::trace!(minute = %minute_bucket(now), "flush skipped: nothing eligible");
            return FlushOutcome::Skipped;
        }

        let report = Report {
            instance: self.identity().clone(),
            traces: summarize(&drained),
        };
        let outcome = FlushOutcome::Delivered {
            traces: drained.len(),
            keys: report.traces.len(),
        };

        tracing::debug!(
            minute = %minute_bucket(now),
            traces = drained.len(),
            keys = report.traces.len(),
            driver = self.driver.name(),
            "flushing report"
        );
        self.driver.stream(&report).await;
        outcome
    }

    /// Look up a trace, for callers holding a trace id.
    pub fn trace(&self, id: TraceId) -> Result<lapse_core::Trace> {
        self.registry.get(id).ok_or(LapseError::NotFound(id))
    }
}
