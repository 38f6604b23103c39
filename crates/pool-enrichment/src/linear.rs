//! Decoration of pools that hold linear (wrapper) pools as tokens.
//!
//! A linear pool wraps a main token (e.g. DAI) and its yield bearing
//! counterpart (e.g. aDAI). Parent pools such as boosted pools list the
//! linear pool's address in their token list; for display purposes we want
//! to know the underlying main and wrapped tokens.

use {
    crate::{
        model::{LinearPool, Pool, PoolToken},
        pool_index::PoolIndex,
    },
    alloy_primitives::Address,
    anyhow::Result,
    std::collections::BTreeMap,
};

/// Underlying token information of the linear pools nested in a pool.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearDecoration {
    /// Main token of the linear pool at the same position in the parent's
    /// token list. Empty when the parent holds no linear pools.
    pub main_tokens: Vec<Option<Address>>,
    /// Wrapped token of the linear pool at the same position in the parent's
    /// token list. Empty when the parent holds no linear pools.
    pub wrapped_tokens: Vec<Option<Address>>,
    /// All tokens held by nested linear pools, except the linear pools' own
    /// share tokens.
    pub linear_pool_tokens_map: BTreeMap<Address, PoolToken>,
}

impl LinearDecoration {
    fn record(&mut self, position: usize, len: usize, main: Address, wrapped: Address) {
        if self.main_tokens.is_empty() {
            self.main_tokens = vec![None; len];
            self.wrapped_tokens = vec![None; len];
        }
        self.main_tokens[position] = Some(main);
        self.wrapped_tokens[position] = Some(wrapped);
    }

    /// Keeps the positional alignment with the parent's token list after
    /// entries were removed from it. `previous` is the list the decoration
    /// was computed for.
    pub fn realign(&mut self, previous: &[Address], current: &[Address]) {
        if self.main_tokens.is_empty() {
            return;
        }
        let kept = previous
            .iter()
            .map(|token| current.contains(token))
            .collect::<Vec<_>>();
        for tokens in [&mut self.main_tokens, &mut self.wrapped_tokens] {
            let mut kept = kept.iter();
            tokens.retain(|_| kept.next().copied().unwrap_or(false));
        }
    }
}

/// Looks up which tokens of `pool` are linear pools and resolves their
/// underlying tokens.
///
/// `total_shares_gt` is forwarded to the index and should not filter out
/// anything (see [`crate::pool_index::NO_LIQUIDITY_FILTER`]). Index failures
/// are returned as is, retrying is up to the caller.
pub async fn decorate_linear_pools(
    pool: &Pool,
    index: &dyn PoolIndex,
    total_shares_gt: i64,
) -> Result<LinearDecoration> {
    let linear_pools = index
        .linear_pools(&pool.tokens_list, total_shares_gt)
        .await?;
    tracing::debug!(count = linear_pools.len(), "fetched nested linear pools");

    let mut decoration = LinearDecoration::default();
    for linear_pool in &linear_pools {
        let Some(position) = pool
            .tokens_list
            .iter()
            .position(|token| *token == linear_pool.address)
        else {
            tracing::warn!(
                linear_pool = %linear_pool.address,
                "index returned linear pool that is not part of the token list"
            );
            continue;
        };
        let Some((main, wrapped)) = underlying_tokens(linear_pool) else {
            tracing::warn!(
                linear_pool = %linear_pool.address,
                main_index = linear_pool.main_index,
                wrapped_index = linear_pool.wrapped_index,
                "linear pool token indices out of bounds"
            );
            continue;
        };

        decoration.record(position, pool.tokens_list.len(), main, wrapped);
        decoration.linear_pool_tokens_map.extend(
            linear_pool
                .tokens
                .iter()
                .filter(|token| token.address != linear_pool.address)
                .map(|token| (token.address, token.clone())),
        );
    }

    Ok(decoration)
}

fn underlying_tokens(linear_pool: &LinearPool) -> Option<(Address, Address)> {
    let main = linear_pool.tokens.get(linear_pool.main_index)?;
    let wrapped = linear_pool.tokens.get(linear_pool.wrapped_index)?;
    Some((main.address, wrapped.address))
}
