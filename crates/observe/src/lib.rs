//! This crate contains the code required to observe the enrichment service:
//! logging initialization, a tracing panic hook and the global metrics
//! registry.
pub mod metrics;
pub mod tracing;
