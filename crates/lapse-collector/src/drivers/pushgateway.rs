//! Prometheus Pushgateway driver.
//!
//! Every summary field becomes one gauge named `<job>:<key>_<field>`,
//! rendered in text exposition format and POSTed to
//! `<base-url>/metrics/job/<job>`.

use std::fmt::Write;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use lapse_core::error::{LapseError, Result};
use lapse_core::{Report, Stats};

use super::StreamDriver;

/// Render stats as gauge lines. Values use two decimals; every line,
/// including the last, is newline-terminated, which the gateway requires.
pub fn render_pushgateway(job: &str, stats: &Stats) -> String {
    let mut out = String::new();
    for (key, summary) in stats {
        for (field, value) in summary.fields() {
            let _ = writeln!(out, "# TYPE {job}:{key}_{field} gauge");
            let _ = writeln!(out, "{job}:{key}_{field} {value:.2}");
        }
    }
    out
}

pub struct PushGatewayDriver {
    job: String,
    url: String,
    client: Client,
}

impl PushGatewayDriver {
    pub fn new(job: impl Into<String>, base_url: &str, timeout: Duration) -> Result<Self> {
        let job = job.into();
        let url = format!("{}/metrics/job/{}", base_url.trim_end_matches('/'), job);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LapseError::Config(format!("http client build failed: {e}")))?;
        Ok(Self { job, url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the rendered stats; non-2xx is an error.
    pub async fn push(&self, report: &Report) -> Result<()> {
        let body = render_pushgateway(&self.job, &report.traces);
        tracing::debug!(url = %self.url, body = %body, "pushgateway payload");

        let resp = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain; version=0.0.4")
            .body(body)
            .send()
            .await
            .map_err(|e| LapseError::Sink(format!("pushgateway request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LapseError::Sink(format!("pushgateway responded {status}")));
        }
        Ok(())
    }
}

#[async_trait]
impl StreamDriver for PushGatewayDriver {
    fn name(&self) -> &'static str {
        "pushgateway"
    }

    async fn stream(&self, report: &Report) {
        if let Err(e) = self.push(report).await {
            tracing::error!(
                driver = self.name(),
                url = %self.url,
                error = %e,
                "report delivery failed"
            );
        }
    }
}
