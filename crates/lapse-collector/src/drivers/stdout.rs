use std::io::Write;

use async_trait::async_trait;

use lapse_core::error::{LapseError, Result};
use lapse_core::Report;

use super::StreamDriver;

/// Print each report as one JSON line on stdout. Default driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutDriver;

impl StdoutDriver {
    pub fn new() -> Self {
        Self
    }

    fn write_line(report: &Report) -> Result<()> {
        let line = report.to_json()?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}").map_err(|e| LapseError::Sink(format!("stdout write failed: {e}")))
    }
}

#[async_trait]
impl StreamDriver for StdoutDriver {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn stream(&self, report: &Report) {
        if let Err(e) = Self::write_line(report) {
            tracing::warn!(driver = self.name(), error = %e, "report delivery failed");
        }
    }
}
