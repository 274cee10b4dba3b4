//! Top-level facade crate for lapse.
//!
//! Re-exports the core data model and the collector so users can depend on a
//! single crate.

pub mod core {
    pub use lapse_core::*;
}

pub mod collector {
    pub use lapse_collector::*;
}

pub use lapse_collector::{Collector, StreamDriver, Traced};
pub use lapse_core::trace_key;
