//! Turns a raw pool into a [`DecoratedPool`] ready to be displayed.

use {
    crate::{
        address::Checksummed,
        apr::{self, AprBreakdown, AprInputs, AprParameters, SwapFeeAprCalculating},
        linear,
        liquidity,
        model::{Currency, Pool, PoolSnapshot, PoolToken, TokenPrices},
        pool_index::{NO_LIQUIDITY_FILTER, PoolIndex},
        snapshot,
        tokens::{self, ExemptPoolTypes},
    },
    alloy_primitives::Address,
    anyhow::{Context, Result},
    bigdecimal::BigDecimal,
    chrono::{DateTime, Duration, Utc},
    number::serialization::DecimalString,
    prometheus::{IntCounter, IntCounterVec},
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
    std::{collections::BTreeMap, sync::Arc},
    tracing::Instrument,
};

#[derive(Clone, Debug)]
pub struct Config {
    pub exempt_pool_types: ExemptPoolTypes,
    /// Forwarded to the linear pool lookup.
    pub linear_pool_total_shares_threshold: i64,
    /// Pools younger than this are flagged as new.
    pub new_pool_window: Duration,
    pub max_staking_boost: BigDecimal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exempt_pool_types: ExemptPoolTypes::default(),
            linear_pool_total_shares_threshold: NO_LIQUIDITY_FILTER,
            new_pool_window: Duration::weeks(1),
            max_staking_boost: apr::default_max_boost(),
        }
    }
}

/// Prices and protocol figures the enrichment of a pool depends on. All of it
/// is fetched by the caller beforehand.
#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    #[serde(default)]
    pub prices: TokenPrices,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub prior_snapshot: Option<PoolSnapshot>,
    #[serde_as(as = "DecimalString")]
    #[serde(default)]
    pub protocol_fee_percentage: BigDecimal,
    #[serde_as(as = "DecimalString")]
    #[serde(default)]
    pub staking_bal_apr: BigDecimal,
    #[serde_as(as = "DecimalString")]
    #[serde(default)]
    pub staking_reward_apr: BigDecimal,
    /// Tokens whose value is not shown as part of the pool's liquidity.
    #[serde_as(as = "Vec<Checksummed>")]
    #[serde(default)]
    pub excluded_addresses: Vec<Address>,
    #[serde(default = "Utc::now")]
    pub now: DateTime<Utc>,
}

/// A fully enriched pool.
///
/// The pool's `total_liquidity` holds the valuation in the requested currency
/// (excluded addresses removed). `tokens` and `tokens_list` no longer contain
/// the pool's own share token.
#[serde_as]
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecoratedPool {
    #[serde(flatten)]
    pub pool: Pool,
    #[serde_as(as = "Vec<Option<Checksummed>>")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub main_tokens: Vec<Option<Address>>,
    #[serde_as(as = "Vec<Option<Checksummed>>")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wrapped_tokens: Vec<Option<Address>>,
    #[serde_as(as = "BTreeMap<Checksummed, _>")]
    pub linear_pool_tokens_map: BTreeMap<Address, PoolToken>,
    #[serde_as(as = "Option<DecimalString>")]
    pub bpt_price: Option<BigDecimal>,
    pub apr: AprBreakdown,
    #[serde_as(as = "DecimalString")]
    pub fees_snapshot: BigDecimal,
    #[serde_as(as = "DecimalString")]
    pub volume_snapshot: BigDecimal,
    pub is_new: bool,
}

impl DecoratedPool {
    pub fn total_liquidity(&self) -> &BigDecimal {
        &self.pool.total_liquidity
    }
}

/// Runs the enrichment stages in a fixed order. Distinct pools can be
/// enriched concurrently.
pub struct PoolEnrichment {
    config: Config,
    index: Arc<dyn PoolIndex>,
    swap_fee_apr: Arc<dyn SwapFeeAprCalculating>,
    metrics: &'static Metrics,
}

impl PoolEnrichment {
    pub fn new(
        config: Config,
        index: Arc<dyn PoolIndex>,
        swap_fee_apr: Arc<dyn SwapFeeAprCalculating>,
    ) -> Self {
        Self {
            config,
            index,
            swap_fee_apr,
            metrics: Metrics::get(),
        }
    }

    /// Enriches `pool` with the market data. Only a failing pool index lookup
    /// makes this fail, everything else degrades to zero contributions.
    pub async fn enrich(&self, pool: Pool, market: &MarketData) -> Result<DecoratedPool> {
        let span = tracing::info_span!("enrich", pool = %pool.id, pool_type = %pool.pool_type);
        let result = self.decorate(pool, market).instrument(span).await;
        let label = match &result {
            Ok(_) => "success",
            Err(_) => "failure",
        };
        self.metrics
            .pool_enrichments
            .with_label_values(&[label])
            .inc();
        result
    }

    async fn decorate(&self, mut pool: Pool, market: &MarketData) -> Result<DecoratedPool> {
        let index = self.index.as_ref();

        tokens::format_pool_tokens(&mut pool, &self.config.exempt_pool_types);

        let mut decoration = linear::decorate_linear_pools(
            &pool,
            index,
            self.config.linear_pool_total_shares_threshold,
        )
        .await
        .context("linear pool lookup")?;
        self.metrics
            .linear_pool_lookups
            .inc_by(decoration.main_tokens.iter().flatten().count() as u64);

        let listed = pool.tokens_list.clone();
        let tokens_list = tokens::remove_pre_minted_bpt(&mut pool, index);
        decoration.realign(&listed, tokens_list);

        let total_liquidity = liquidity::remove_excluded_addresses(
            &liquidity::total_liquidity(&pool.tokens, &market.prices, &market.currency),
            &market.excluded_addresses,
            &pool.tokens,
            &market.prices,
            &market.currency,
        );

        let prior = market.prior_snapshot.as_ref();
        let fees_snapshot = snapshot::fees_snapshot(&pool, prior);
        let volume_snapshot = snapshot::volume_snapshot(&pool, prior);

        let apr = apr::compute_apr(
            AprInputs {
                pool: &pool,
                prior_snapshot: prior,
                prices: &market.prices,
                currency: &market.currency,
                total_liquidity: Some(&total_liquidity),
                parameters: &AprParameters {
                    protocol_fee_percentage: market.protocol_fee_percentage.clone(),
                    staking_bal_apr: market.staking_bal_apr.clone(),
                    staking_reward_apr: market.staking_reward_apr.clone(),
                    max_boost: self.config.max_staking_boost.clone(),
                },
                now: market.now,
            },
            self.swap_fee_apr.as_ref(),
        );

        let is_new = snapshot::is_new(&pool, market.now, self.config.new_pool_window);
        let bpt_price = liquidity::bpt_price(&total_liquidity, &pool.total_shares);
        if bpt_price.is_none() {
            tracing::debug!("pool has no shares, no share price");
        }

        pool.total_liquidity = total_liquidity;
        Ok(DecoratedPool {
            pool,
            main_tokens: decoration.main_tokens,
            wrapped_tokens: decoration.wrapped_tokens,
            linear_pool_tokens_map: decoration.linear_pool_tokens_map,
            bpt_price,
            apr,
            fees_snapshot,
            volume_snapshot,
            is_new,
        })
    }
}

#[derive(prometheus_metric_storage::MetricStorage)]
struct Metrics {
    /// Pool enrichments by result.
    #[metric(labels("result"))]
    pool_enrichments: IntCounterVec,

    /// Nested linear pools resolved to their main and wrapped tokens.
    linear_pool_lookups: IntCounter,
}

impl Metrics {
    fn get() -> &'static Self {
        Metrics::instance(observe::metrics::get_storage_registry()).unwrap()
    }
}
