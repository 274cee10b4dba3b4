use async_trait::async_trait;
use tracing::Level;

use lapse_core::Report;

use super::StreamDriver;

/// Emit each report as JSON through `tracing` (target `lapse::report`).
#[derive(Debug, Clone, Copy)]
pub struct LogDriver {
    level: Level,
}

impl Default for LogDriver {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LogDriver {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

#[async_trait]
impl StreamDriver for LogDriver {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn stream(&self, report: &Report) {
        let json = match report.to_json() {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(driver = self.name(), error = %e, "report delivery failed");
                return;
            }
        };

        // tracing levels must be static at the callsite.
        match self.level {
            Level::ERROR => tracing::error!(target: "lapse::report", "{json}"),
            Level::WARN => tracing::warn!(target: "lapse::report", "{json}"),
            Level::INFO => tracing::info!(target: "lapse::report", "{json}"),
            Level::DEBUG => tracing::debug!(target: "lapse::report", "{json}"),
            _ => tracing::trace!(target: "lapse::report", "{json}"),
        }
    }
}
