//! Instrumentation entry point: wrap a unit of work with begin/complete/fail.
//!
//! The wrapped call's output is always returned untouched. Errors from the
//! collector itself are logged and never replace it.

use std::fmt::Display;
use std::future::Future;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use lapse_core::trace::error_class;
use lapse_core::TraceId;

use crate::collector::Collector;

/// Error class recorded when the wrapped future is dropped before it resolves.
pub const CANCELLED: &str = "Cancelled";
/// Error class recorded when the wrapped call panics.
pub const PANICKED: &str = "Panic";

/// Owns an in-flight trace until the wrapped call resolves. If it is dropped
/// while still armed (future cancelled, closure unwinding), the trace is
/// failed instead of being left in flight.
struct Pending<'a> {
    collector: &'a Collector,
    id: TraceId,
    key: &'a str,
    armed: bool,
}

impl<'a> Pending<'a> {
    fn begin(collector: &'a Collector, key: &'a str) -> Self {
        Self {
            collector,
            id: collector.begin(key),
            key,
            armed: true,
        }
    }

    fn complete(mut self) {
        self.armed = false;
        if let Err(e) = self.collector.complete(self.id) {
            tracing::warn!(
                id = %self.id,
                key = %self.key,
                kind = e.kind().as_str(),
                error = %e,
                "trace complete failed"
            );
        }
    }

    fn fail<E: Display>(mut self, err: &E) {
        self.armed = false;
        self.collector.fail(self.id, self.key, error_class::<E>(), &err.to_string());
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let class = if std::thread::panicking() { PANICKED } else { CANCELLED };
        self.collector.fail(self.id, self.key, class, "");
    }
}

impl Collector {
    /// Time an infallible future under `key`.
    pub async fn instrument<F>(&self, key: &str, fut: F) -> F::Output
    where
        F: Future,
    {
        let pending = Pending::begin(self, key);
        let out = fut.await;
        pending.complete();
        out
    }

    /// Time a fallible future. `Err` is recorded as a failure trace keyed
    /// `Exception:<key>:<ErrorType>(<first line>)` and returned unchanged.
    pub async fn instrument_result<F, T, E>(&self, key: &str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let pending = Pending::begin(self, key);
        match fut.await {
            Ok(v) => {
                pending.complete();
                Ok(v)
            }
            Err(e) => {
                pending.fail(&e);
                Err(e)
            }
        }
    }

    /// Time a synchronous closure.
    pub fn instrument_sync<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let pending = Pending::begin(self, key);
        let out = f();
        pending.complete();
        out
    }

    /// Time a fallible synchronous closure.
    pub fn instrument_sync_result<T, E: Display>(
        &self,
        key: &str,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let pending = Pending::begin(self, key);
        let out = f();
        match &out {
            Ok(_) => pending.complete(),
            Err(e) => pending.fail(e),
        }
        out
    }
}

/// Extension methods so call sites read `fetch().traced(&collector, key).await`.
pub trait Traced: Future + Sized + Send {
    fn traced<'a>(self, collector: &'a Collector, key: &'a str) -> BoxFuture<'a, Self::Output>
    where
        Self: 'a,
        Self::Output: Send,
    {
        collector.instrument(key, self).boxed()
    }

    fn traced_result<'a, T, E>(
        self,
        collector: &'a Collector,
        key: &'a str,
    ) -> BoxFuture<'a, Result<T, E>>
    where
        Self: Future<Output = Result<T, E>> + 'a,
        T: Send + 'a,
        E: Display + Send + 'a,
    {
        collector.instrument_result(key, self).boxed()
    }
}

impl<F: Future + Send> Traced for F {}
