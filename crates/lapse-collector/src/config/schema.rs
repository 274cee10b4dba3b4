use serde::Deserialize;
use lapse_core::error::{LapseError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    pub version: u32,

    #[serde(default)]
    pub instance: InstanceSection,

    #[serde(default)]
    pub driver: DriverConfig,

    #[serde(default)]
    pub http: HttpSection,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            instance: InstanceSection::default(),
            driver: DriverConfig::default(),
            http: HttpSection::default(),
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LapseError::Config(format!("unsupported version: {}", self.version)));
        }
        if let Some(h) = &self.instance.hostname {
            if h.trim().is_empty() {
                return Err(LapseError::Config("instance.hostname must not be empty".into()));
            }
        }

        self.driver.validate()?;
        self.http.validate()?;

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceSection {
    /// Overrides the resolved hostname in reports.
    #[serde(default)]
    pub hostname: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
pub enum DriverConfig {
    #[default]
    Stdout,
    Log {
        #[serde(default)]
        level: LogLevel,
    },
    Pushgateway {
        name: String,
        url: String,
    },
    Newrelic {
        name: String,
        license_key: String,
        #[serde(default)]
        endpoint: Option<String>,
    },
}

impl DriverConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            DriverConfig::Stdout | DriverConfig::Log { .. } => Ok(()),
            DriverConfig::Pushgateway { name, url } => {
                non_empty("driver.name", name)?;
                http_url("driver.url", url)
            }
            DriverConfig::Newrelic { name, license_key, endpoint } => {
                non_empty("driver.name", name)?;
                non_empty("driver.license_key", license_key)?;
                match endpoint {
                    Some(e) => http_url("driver.endpoint", e),
                    None => Ok(()),
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl HttpSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=120000).contains(&self.timeout_ms) {
            return Err(LapseError::Config(
                "http.timeout_ms must be between 100 and 120000".into(),
            ));
        }
        Ok(())
    }
}

fn default_timeout_ms() -> u64 {
    10000
}

fn non_empty(field: &str, v: &str) -> Result<()> {
    if v.trim().is_empty() {
        return Err(LapseError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn http_url(field: &str, v: &str) -> Result<()> {
    if !(v.starts_with("http://") || v.starts_with("https://")) {
        return Err(LapseError::Config(format!("{field} must be an http(s) url: {v}")));
    }
    Ok(())
}
