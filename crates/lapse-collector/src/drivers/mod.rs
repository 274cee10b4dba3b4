//! Stream drivers: pluggable sinks for flushed reports.
//!
//! Every driver exposes the same suspending `stream` call. Drivers that do no
//! I/O simply complete without yielding. Delivery failures stay inside the
//! driver: they are logged and never surface to the collector, so a broken
//! sink cannot disturb the instrumented application.

mod log;
mod newrelic;
mod pushgateway;
mod stdout;

use async_trait::async_trait;

use lapse_core::Report;

pub use self::log::LogDriver;
pub use newrelic::{build_payload, NewRelicDriver, NEW_RELIC_ENDPOINT};
pub use pushgateway::{render_pushgateway, PushGatewayDriver};
pub use stdout::StdoutDriver;

/// Report sink. `report` is read-only and must not be retained.
#[async_trait]
pub trait StreamDriver: Send + Sync {
    fn name(&self) -> &'static str;
    async fn stream(&self, report: &Report);
}
