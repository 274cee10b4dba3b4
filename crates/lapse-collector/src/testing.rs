//! Drivers for tests and local tooling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use lapse_core::error::LapseError;
use lapse_core::Report;

use crate::drivers::StreamDriver;

/// Keep every streamed report in memory.
#[derive(Default)]
pub struct RecordingDriver {
    reports: Mutex<Vec<Report>>,
}

impl RecordingDriver {
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn calls(&self) -> usize {
        self.reports.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

#[async_trait]
impl StreamDriver for RecordingDriver {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn stream(&self, report: &Report) {
        self.reports
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(report.clone());
    }
}

/// Fail every delivery (and contain it, like real drivers do).
#[derive(Default)]
pub struct FailingDriver {
    attempts: AtomicUsize,
}

impl FailingDriver {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StreamDriver for FailingDriver {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn stream(&self, _report: &Report) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        let e = LapseError::Sink("sink unavailable".into());
        tracing::warn!(driver = self.name(), error = %e, "report delivery failed");
    }
}
