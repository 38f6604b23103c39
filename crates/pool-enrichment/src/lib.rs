#[macro_use]
mod macros;

pub mod address;
pub mod apr;
pub mod arguments;
pub mod config;
pub mod graph_api;
pub mod linear;
pub mod liquidity;
pub mod model;
pub mod pipeline;
pub mod pool_index;
pub mod snapshot;
pub mod subgraph;
pub mod tokens;

mod run;
#[cfg(test)]
mod test_util;

pub use self::run::{run, start};
