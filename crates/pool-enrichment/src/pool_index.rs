use {
    crate::{
        address,
        model::{LinearPool, PoolId},
    },
    alloy_primitives::Address,
    anyhow::Result,
};

/// Liquidity threshold that disables the `totalShares_gt` filter. Wrapper
/// pools referenced by a parent pool must be found no matter how little
/// liquidity they hold themselves.
pub const NO_LIQUIDITY_FILTER: i64 = -1;

/// Access to the pool index backing the enrichment, usually a subgraph.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait PoolIndex: Send + Sync {
    /// Retrieves the linear pools among `addresses` that have more than
    /// `total_shares_gt` shares, including their main and wrapped token
    /// indices.
    async fn linear_pools(
        &self,
        addresses: &[Address],
        total_shares_gt: i64,
    ) -> Result<Vec<LinearPool>>;

    /// Resolves the contract address of a pool from its ID.
    fn address_for(&self, pool_id: PoolId) -> Address {
        address::pool_address_from_id(pool_id)
    }
}
