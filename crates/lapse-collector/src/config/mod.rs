//! Collector config loader (strict parsing).

pub mod schema;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use lapse_core::error::{LapseError, Result};

use crate::drivers::{LogDriver, NewRelicDriver, PushGatewayDriver, StdoutDriver, StreamDriver};

pub use schema::{CollectorConfig, DriverConfig, HttpSection, InstanceSection, LogLevel};

pub fn load_from_file(path: &str) -> Result<CollectorConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| LapseError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<CollectorConfig> {
    let cfg: CollectorConfig = serde_yaml::from_str(s)
        .map_err(|e| LapseError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Instantiate the configured stream driver.
pub fn build_driver(cfg: &CollectorConfig) -> Result<Arc<dyn StreamDriver>> {
    let timeout = Duration::from_millis(cfg.http.timeout_ms);
    let driver: Arc<dyn StreamDriver> = match &cfg.driver {
        DriverConfig::Stdout => Arc::new(StdoutDriver::new()),
        DriverConfig::Log { level } => Arc::new(LogDriver::new((*level).into())),
        DriverConfig::Pushgateway { name, url } => {
            Arc::new(PushGatewayDriver::new(name.as_str(), url, timeout)?)
        }
        DriverConfig::Newrelic { name, license_key, endpoint } => Arc::new(NewRelicDriver::new(
            name.as_str(),
            license_key.as_str(),
            endpoint.clone(),
            timeout,
        )?),
    };
    Ok(driver)
}
