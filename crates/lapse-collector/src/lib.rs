//! lapse collector library entry.
//!
//! Wires the trace registry, lifecycle controller, instrumentation helpers,
//! minute scheduler, and stream drivers into one in-process metrics
//! pipeline. Consumed by the binary (`main.rs`) and by integration tests.

pub mod collector;
pub mod config;
pub mod drivers;
pub mod instrument;
pub mod registry;
pub mod scheduler;
pub mod testing;

pub use collector::{Collector, CollectorBuilder, FlushOutcome};
pub use drivers::StreamDriver;
pub use instrument::Traced;
pub use registry::TraceRegistry;
