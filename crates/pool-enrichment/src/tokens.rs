//! Normalization of a pool's token set.

use {
    crate::{
        model::{Pool, PoolToken, PoolType},
        pool_index::PoolIndex,
    },
    alloy_primitives::Address,
    bigdecimal::BigDecimal,
    number::decimal,
    std::{cmp::Reverse, collections::HashSet},
};

/// Pool types whose tokens keep the order in which they were fetched.
///
/// Stable-like pools have no meaningful weights to sort by. Linear pools are
/// always exempt, regardless of configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExemptPoolTypes(HashSet<PoolType>);

impl ExemptPoolTypes {
    pub fn new(pool_types: impl IntoIterator<Item = PoolType>) -> Self {
        Self(pool_types.into_iter().collect())
    }

    pub fn contains(&self, pool_type: &PoolType) -> bool {
        pool_type.is_linear() || self.0.contains(pool_type)
    }
}

impl Default for ExemptPoolTypes {
    fn default() -> Self {
        Self::new([
            PoolType::Stable,
            PoolType::MetaStable,
            PoolType::StablePhantom,
            PoolType::ComposableStable,
            PoolType::Element,
            PoolType::Gyro2,
            PoolType::Gyro3,
            PoolType::GyroE,
        ])
    }
}

/// Orders the pool tokens by weight, heaviest first, unless the pool type is
/// exempt. Addresses are canonical by construction, so ordering is the only
/// normalization left to do.
///
/// Ties keep their fetch order. Missing or unparsable weights sort as zero.
pub fn format_pool_tokens<'a>(pool: &'a mut Pool, exempt: &ExemptPoolTypes) -> &'a [PoolToken] {
    if !exempt.contains(&pool.pool_type) {
        // `sort_by_cached_key` is stable.
        pool.tokens.sort_by_cached_key(|token| Reverse(weight(token)));
    }
    &pool.tokens
}

fn weight(token: &PoolToken) -> BigDecimal {
    token
        .weight
        .as_deref()
        .and_then(|weight| decimal::parse(weight).ok())
        .unwrap_or_default()
}

/// Removes the pool's own pre-minted share token (BPT) from its token list
/// and token set. Composable pools register their own BPT as a pool token,
/// which must not count towards the pool's composition or liquidity.
///
/// Removing an absent address is a no-op, so this is idempotent.
pub fn remove_pre_minted_bpt<'a>(pool: &'a mut Pool, index: &dyn PoolIndex) -> &'a [Address] {
    let share_tokens = [pool.address, index.address_for(pool.id)];
    pool.tokens_list.retain(|token| !share_tokens.contains(token));
    pool.tokens.retain(|token| !share_tokens.contains(&token.address));
    &pool.tokens_list
}
