//! lapse core: runtime-free data model for latency traces and their reports.
//!
//! This crate defines the trace record, the aggregation summaries, the report
//! shape handed to stream drivers, and the error surface shared with the
//! collector. It carries no async runtime so report consumers can depend on
//! it alone.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Metrics code runs
//! inside someone else's process: every fallible path must surface as
//! `LapseError`/`Result` instead of taking the host down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod error;
pub mod report;
pub mod stats;
pub mod trace;

/// Shared result type.
pub use error::{LapseError, Result};
pub use report::{InstanceIdentity, Report};
pub use stats::{summarize, Stats, Summary};
pub use trace::{Trace, TraceId};
