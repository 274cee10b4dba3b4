//! Trace record: one timed observation of an instrumented unit of work.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Process-unique trace identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(Uuid);

impl TraceId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One observation. `end_time`/`total_time` stay `None` while in flight and
/// are written exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub id: TraceId,
    pub key: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Elapsed milliseconds.
    pub total_time: Option<f64>,
}

impl Trace {
    /// New in-flight trace.
    pub fn started(key: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: TraceId::generate(),
            key: key.into(),
            start_time,
            end_time: None,
            total_time: None,
        }
    }

    /// Zero-duration trace that is complete from birth (failure path).
    pub fn synthetic(key: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: TraceId::generate(),
            key: key.into(),
            start_time: at,
            end_time: Some(at),
            total_time: Some(0.0),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Stamp end time and derive `total_time`. Returns `false` (and leaves the
    /// trace untouched) if it was already stamped.
    pub fn stamp_end(&mut self, end_time: DateTime<Utc>) -> bool {
        if self.end_time.is_some() {
            return false;
        }
        let elapsed = (end_time - self.start_time)
            .num_microseconds()
            .map(|us| us as f64 / 1000.0)
            .unwrap_or_else(|| (end_time - self.start_time).num_milliseconds() as f64);
        self.end_time = Some(end_time);
        self.total_time = Some(elapsed.max(0.0));
        true
    }
}

/// Key for a failed call: `Exception:<key>:<Class>(<first line of message>)`.
pub fn failure_key(key: &str, error_class: &str, message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("");
    format!("Exception:{key}:{error_class}({first_line})")
}

/// Short type name of `E`: last path segment, generic arguments dropped.
///
/// `my_app::errors::ValueError` -> `ValueError`,
/// `std::boxed::Box<dyn std::error::Error>` -> `Box`.
pub fn error_class<E: ?Sized>() -> &'static str {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Build a trace key for the enclosing module: `"<module_path>:<name>"`.
#[macro_export]
macro_rules! trace_key {
    ($name:literal) => {
        concat!(module_path!(), ":", $name)
    };
}
