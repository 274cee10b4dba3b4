use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use lapse_core::clock::Clock;
use lapse_core::error::{LapseError, Result};
use lapse_core::trace::{failure_key, Trace, TraceId};

/// Trace registry:
/// - `trace_id -> Trace`, in insertion (= start) order
/// - the only place traces are created, stamped, and removed
///
/// The lock is never held across an `.await`.
pub struct TraceRegistry {
    traces: Mutex<IndexMap<TraceId, Trace>>,
    clock: Arc<dyn Clock>,
}

impl TraceRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            traces: Mutex::new(IndexMap::new()),
            clock,
        }
    }

    // A panic inside a caller's critical section must not disable metrics.
    fn lock(&self) -> MutexGuard<'_, IndexMap<TraceId, Trace>> {
        self.traces.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Insert a new in-flight trace stamped with `now`.
    pub fn begin(&self, key: impl Into<String>) -> TraceId {
        let trace = Trace::started(key, self.clock.now());
        let id = trace.id;
        self.lock().insert(id, trace);
        id
    }

    /// Stamp `end_time`/`total_time`. Returns a copy of the completed trace.
    pub fn complete(&self, id: TraceId) -> Result<Trace> {
        let now = self.clock.now();
        let mut traces = self.lock();
        let trace = traces.get_mut(&id).ok_or(LapseError::NotFound(id))?;
        if !trace.stamp_end(now) {
            return Err(LapseError::AlreadyCompleted(id));
        }
        Ok(trace.clone())
    }

    /// Insert a zero-duration, already completed trace for a failed call.
    pub fn record_failure(&self, key: &str, error_class: &str, message: &str) -> TraceId {
        let trace = Trace::synthetic(failure_key(key, error_class, message), self.clock.now());
        let id = trace.id;
        self.lock().insert(id, trace);
        id
    }

    /// Remove an in-flight trace without recording it.
    pub fn abandon(&self, id: TraceId) -> Result<Trace> {
        // shift_remove keeps the remaining entries in start order.
        self.lock().shift_remove(&id).ok_or(LapseError::NotFound(id))
    }

    /// Start time of the earliest inserted entry still present.
    pub fn oldest_start_time(&self) -> Option<DateTime<Utc>> {
        self.lock().first().map(|(_, t)| t.start_time)
    }

    /// Remove and return every completed trace that started before `now`.
    /// In-flight traces stay put.
    pub fn drain_eligible(&self, now: DateTime<Utc>) -> Vec<Trace> {
        let mut traces = self.lock();
        let mut drained = Vec::new();
        traces.retain(|_, t| {
            if t.is_completed() && t.start_time < now {
                drained.push(t.clone());
                false
            } else {
                true
            }
        });
        drained
    }

    pub fn get(&self, id: TraceId) -> Option<Trace> {
        self.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of traces without an end time.
    pub fn in_flight(&self) -> usize {
        self.lock().values().filter(|t| !t.is_completed()).count()
    }
}
