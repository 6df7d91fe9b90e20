//! Lightweight in-process metrics.
//!
//! Counters and histograms are atomics keyed by label sets and rendered in
//! Prometheus text format by the `/metrics` handler.

pub mod metrics;

pub use metrics::{EngineMetrics, UNBOUND_OPERATION, UNREGISTERED_RULE};
