//! Valuation of the liquidity held by a pool.

use {
    crate::model::{Currency, PoolToken, TokenPrices},
    alloy_primitives::Address,
    bigdecimal::BigDecimal,
    number::decimal,
    prometheus::IntCounterVec,
};

/// Values all `tokens` in `currency`.
///
/// Tokens without a price contribute nothing: a pool with partially known
/// prices shows a lower bound instead of no liquidity at all.
pub fn total_liquidity(
    tokens: &[PoolToken],
    prices: &TokenPrices,
    currency: &Currency,
) -> BigDecimal {
    tokens
        .iter()
        .filter_map(|token| token_value(token, prices, currency))
        .sum()
}

/// Subtracts the value of the pool tokens in `excluded` from an already
/// computed total, e.g. to not count treasury held or recursive BPT towards
/// displayed liquidity.
pub fn remove_excluded_addresses(
    total_liquidity: &BigDecimal,
    excluded: &[Address],
    tokens: &[PoolToken],
    prices: &TokenPrices,
    currency: &Currency,
) -> BigDecimal {
    let excluded_value: BigDecimal = tokens
        .iter()
        .filter(|token| excluded.contains(&token.address))
        .filter_map(|token| token_value(token, prices, currency))
        .sum();
    total_liquidity - excluded_value
}

/// Price of one pool share. `None` when the pool has no shares.
pub fn bpt_price(total_liquidity: &BigDecimal, total_shares: &BigDecimal) -> Option<BigDecimal> {
    decimal::checked_div(total_liquidity, total_shares)
}

fn token_value(token: &PoolToken, prices: &TokenPrices, currency: &Currency) -> Option<BigDecimal> {
    let Some(price) = prices.price(&token.address, currency) else {
        tracing::debug!(token = %token.address, %currency, "missing token price");
        Metrics::get()
            .missing_token_prices
            .with_label_values(&[currency.to_string().as_str()])
            .inc();
        return None;
    };
    Some(&token.balance * price)
}

#[derive(prometheus_metric_storage::MetricStorage)]
struct Metrics {
    /// Token valuations skipped because of a missing price.
    #[metric(labels("currency"))]
    missing_token_prices: IntCounterVec,
}

impl Metrics {
    fn get() -> &'static Self {
        Metrics::instance(observe::metrics::get_storage_registry()).unwrap()
    }
}
