//! New Relic plugin API driver.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};

use lapse_core::error::{LapseError, Result};
use lapse_core::Report;

use super::StreamDriver;

pub const NEW_RELIC_ENDPOINT: &str = "https://platform-api.newrelic.com/platform/v1/metrics";

const AGENT_VERSION: &str = "1.0.0";
const COMPONENT_GUID: &str = "com.lapse.collector";
const DURATION_SECS: u64 = 60;

/// Build the plugin payload for one report.
///
/// `sum_of_squares` is `min² + max²`, an approximation: the per-key summary
/// holds no individual samples, so the true second moment is unavailable.
pub fn build_payload(component: &str, report: &Report) -> Value {
    let mut metrics = Map::new();
    for (key, s) in &report.traces {
        metrics.insert(
            format!("Component/{key}"),
            json!({
                "total": s.count as f64 * s.avg,
                "count": s.count,
                "min": s.min,
                "max": s.max,
                "sum_of_squares": s.min.powi(2) + s.max.powi(2),
            }),
        );
    }

    json!({
        "agent": {
            "host": report.instance.hostname,
            "version": AGENT_VERSION,
        },
        "components": [{
            "name": component,
            "guid": COMPONENT_GUID,
            "duration": DURATION_SECS,
            "metrics": metrics,
        }]
    })
}

pub struct NewRelicDriver {
    component: String,
    license_key: String,
    endpoint: String,
    client: Client,
}

impl NewRelicDriver {
    pub fn new(
        component: impl Into<String>,
        license_key: impl Into<String>,
        endpoint: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LapseError::Config(format!("http client build failed: {e}")))?;
        Ok(Self {
            component: component.into(),
            license_key: license_key.into(),
            endpoint: endpoint.unwrap_or_else(|| NEW_RELIC_ENDPOINT.to_string()),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn push(&self, report: &Report) -> Result<()> {
        let payload = build_payload(&self.component, report);

        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-License-Key", &self.license_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| LapseError::Sink(format!("newrelic request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LapseError::Sink(format!("newrelic responded {status}")));
        }
        Ok(())
    }
}

#[async_trait]
impl StreamDriver for NewRelicDriver {
    fn name(&self) -> &'static str {
        "newrelic"
    }

    async fn stream(&self, report: &Report) {
        if let Err(e) = self.push(report).await {
            tracing::error!(driver = self.name(), error = %e, "report delivery failed");
        }
    }
}
