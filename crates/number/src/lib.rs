//! Exact decimal helpers shared by the enrichment crates.

pub mod decimal;
pub mod serialization;
