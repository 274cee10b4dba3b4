//! Report: the payload of one flush, handed read-only to a stream driver.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LapseError, Result};
use crate::stats::Stats;

/// Identity of the reporting process. Computed once per collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceIdentity {
    pub id: String,
    pub hostname: String,
}

impl InstanceIdentity {
    /// Fresh identity with a random id.
    pub fn generate(hostname: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            hostname: hostname.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub instance: InstanceIdentity,
    pub traces: Stats,
}

impl Report {
    /// Single-line JSON document used by the console and log drivers.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| LapseError::Internal(format!("report encode failed: {e}")))
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map_err(|e| LapseError::Internal(format!("report decode failed: {e}")))
    }

    /// Total number of traces folded into this report.
    pub fn trace_count(&self) -> u64 {
        self.traces.values().map(|s| s.count).sum()
    }
}
