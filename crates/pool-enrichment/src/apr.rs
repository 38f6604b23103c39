//! Aggregation of a pool's yield sources into an APR breakdown.
//!
//! The swap fee APR formula and the staking rates are computed elsewhere;
//! this module feeds them the right inputs and combines the results.

use {
    crate::{
        liquidity,
        model::{Currency, Pool, PoolSnapshot, TokenPrices},
        snapshot,
    },
    bigdecimal::{BigDecimal, One, Zero},
    chrono::{DateTime, Utc},
    number::{decimal, serialization::DecimalString},
    serde::Serialize,
    serde_with::serde_as,
};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// veBAL holders can boost their BAL staking rewards up to 2.5x.
pub fn default_max_boost() -> BigDecimal {
    BigDecimal::new(25.into(), 1)
}

/// Computes the yearly yield of the swap fees a pool collects in a day.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait SwapFeeAprCalculating: Send + Sync {
    /// `net_daily_fees` are the fees collected over the snapshot period
    /// after deducting the protocol's share.
    fn swap_fee_apr(&self, net_daily_fees: &BigDecimal, total_liquidity: &BigDecimal)
    -> BigDecimal;
}

/// Simple annualization of daily fees: `fees * 365 / liquidity`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DailyFeeAnnualizer;

impl SwapFeeAprCalculating for DailyFeeAnnualizer {
    fn swap_fee_apr(
        &self,
        net_daily_fees: &BigDecimal,
        total_liquidity: &BigDecimal,
    ) -> BigDecimal {
        decimal::checked_div(&(net_daily_fees * &BigDecimal::from(365)), total_liquidity)
            .unwrap_or_default()
    }
}

/// Protocol and staking parameters, prefetched by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct AprParameters {
    /// Share of swap fees going to the protocol, e.g. `0.5` for 50%.
    pub protocol_fee_percentage: BigDecimal,
    /// Unboosted APR from staking the pool's shares in its gauge.
    pub staking_bal_apr: BigDecimal,
    /// APR of additional gauge reward tokens.
    pub staking_reward_apr: BigDecimal,
    pub max_boost: BigDecimal,
}

impl Default for AprParameters {
    fn default() -> Self {
        Self {
            protocol_fee_percentage: BigDecimal::zero(),
            staking_bal_apr: BigDecimal::zero(),
            staking_reward_apr: BigDecimal::zero(),
            max_boost: default_max_boost(),
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AprRange {
    #[serde_as(as = "DecimalString")]
    pub min: BigDecimal,
    #[serde_as(as = "DecimalString")]
    pub max: BigDecimal,
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StakingApr {
    pub bal: AprRange,
    #[serde_as(as = "DecimalString")]
    pub rewards: BigDecimal,
}

/// The yield of a pool by source. `min` is the total without any staking
/// boost, `max` with the maximum boost.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AprBreakdown {
    #[serde_as(as = "DecimalString")]
    pub swap_fees: BigDecimal,
    pub staking: StakingApr,
    #[serde_as(as = "DecimalString")]
    pub min: BigDecimal,
    #[serde_as(as = "DecimalString")]
    pub max: BigDecimal,
}

pub struct AprInputs<'a> {
    pub pool: &'a Pool,
    pub prior_snapshot: Option<&'a PoolSnapshot>,
    pub prices: &'a TokenPrices,
    pub currency: &'a Currency,
    /// Liquidity to compute the fee yield on. Defaults to valuing the pool's
    /// tokens with `prices`.
    pub total_liquidity: Option<&'a BigDecimal>,
    pub parameters: &'a AprParameters,
    /// Reference time for the age of `prior_snapshot`.
    pub now: DateTime<Utc>,
}

pub fn compute_apr(inputs: AprInputs<'_>, calculator: &dyn SwapFeeAprCalculating) -> AprBreakdown {
    let AprParameters {
        protocol_fee_percentage,
        staking_bal_apr,
        staking_reward_apr,
        max_boost,
    } = inputs.parameters;

    let swap_fees = match inputs.prior_snapshot {
        Some(prior) => {
            let total_liquidity = match inputs.total_liquidity {
                Some(total_liquidity) => total_liquidity.clone(),
                None => liquidity::total_liquidity(
                    &inputs.pool.tokens,
                    inputs.prices,
                    inputs.currency,
                ),
            };
            let fees = snapshot::fees_snapshot(inputs.pool, Some(prior));
            let net_fees = fees * (BigDecimal::one() - protocol_fee_percentage);
            let net_daily_fees = net_fees / snapshot_age_in_days(prior, inputs.now);
            calculator.swap_fee_apr(&net_daily_fees, &total_liquidity)
        }
        None => {
            tracing::debug!("no prior snapshot, swap fee APR is zero");
            BigDecimal::zero()
        }
    };

    let bal = AprRange {
        min: staking_bal_apr.clone(),
        max: staking_bal_apr * max_boost,
    };
    let min = &swap_fees + &bal.min + staking_reward_apr;
    let max = &swap_fees + &bal.max + staking_reward_apr;

    AprBreakdown {
        swap_fees,
        staking: StakingApr {
            bal,
            rewards: staking_reward_apr.clone(),
        },
        min,
        max,
    }
}

/// Days between `prior` and `now`. Snapshots are taken daily, so a snapshot
/// without a usable timestamp (missing, zero or not in the past) counts as one
/// day old.
fn snapshot_age_in_days(prior: &PoolSnapshot, now: DateTime<Utc>) -> BigDecimal {
    match DateTime::from_timestamp(prior.timestamp, 0) {
        Some(taken) if prior.timestamp > 0 && taken < now => {
            BigDecimal::from(now.signed_duration_since(taken).num_seconds())
                / BigDecimal::from(SECONDS_PER_DAY)
        }
        _ => {
            tracing::debug!(
                timestamp = prior.timestamp,
                "unknown snapshot age, assuming one day"
            );
            BigDecimal::one()
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{model::PoolType, test_util},
        chrono::Duration,
        serde_json::json,
    };

    fn pool(total_swap_fee: &str) -> Pool {
        Pool {
            total_swap_fee: decimal::parse(total_swap_fee).unwrap(),
            ..test_util::pool(PoolType::Weighted, vec![test_util::token(1, "10950")])
        }
    }

    fn prices() -> TokenPrices {
        let mut prices = TokenPrices::default();
        prices.insert(test_util::token_address(1), Currency::usd(), BigDecimal::one());
        prices
    }

    fn snapshot(total_swap_fee: &str) -> PoolSnapshot {
        PoolSnapshot {
            total_swap_fee: decimal::parse(total_swap_fee).unwrap(),
            total_swap_volume: BigDecimal::zero(),
            timestamp: 0,
        }
    }

    fn parameters() -> AprParameters {
        AprParameters {
            protocol_fee_percentage: decimal::parse("0.5").unwrap(),
            staking_bal_apr: decimal::parse("0.1").unwrap(),
            staking_reward_apr: decimal::parse("0.05").unwrap(),
            max_boost: default_max_boost(),
        }
    }

    #[test]
    fn combines_fee_and_staking_yield() {
        let pool = pool("130");
        let prior = snapshot("100");
        let apr = compute_apr(
            AprInputs {
                pool: &pool,
                prior_snapshot: Some(&prior),
                prices: &prices(),
                currency: &Currency::usd(),
                total_liquidity: None,
                parameters: &parameters(),
                now: Utc::now(),
            },
            &DailyFeeAnnualizer,
        );

        assert_eq!(
            serde_json::to_value(&apr).unwrap(),
            json!({
                "swapFees": "0.5",
                "staking": {
                    "bal": { "min": "0.1", "max": "0.25" },
                    "rewards": "0.05",
                },
                "min": "0.65",
                "max": "0.8",
            })
        );
    }

    #[test]
    fn missing_snapshot_has_no_fee_yield() {
        let pool = pool("130");
        let calculator = MockSwapFeeAprCalculating::new();
        let apr = compute_apr(
            AprInputs {
                pool: &pool,
                prior_snapshot: None,
                prices: &prices(),
                currency: &Currency::usd(),
                total_liquidity: None,
                parameters: &parameters(),
                now: Utc::now(),
            },
            &calculator,
        );

        assert_eq!(apr.swap_fees, BigDecimal::zero());
        assert_eq!(apr.min, decimal::parse("0.15").unwrap());
        assert_eq!(apr.max, decimal::parse("0.3").unwrap());
    }

    #[test]
    fn passes_net_fees_and_liquidity_to_calculator() {
        let pool = pool("130");
        let prior = snapshot("100");
        let liquidity = BigDecimal::from(1000);

        let mut calculator = MockSwapFeeAprCalculating::new();
        calculator
            .expect_swap_fee_apr()
            .withf(|fees, liquidity| {
                *fees == BigDecimal::from(15) && *liquidity == BigDecimal::from(1000)
            })
            .times(1)
            .returning(|_, _| BigDecimal::from(2));

        let apr = compute_apr(
            AprInputs {
                pool: &pool,
                prior_snapshot: Some(&prior),
                prices: &TokenPrices::default(),
                currency: &Currency::usd(),
                total_liquidity: Some(&liquidity),
                parameters: &parameters(),
                now: Utc::now(),
            },
            &calculator,
        );

        assert_eq!(apr.swap_fees, BigDecimal::from(2));
        assert_eq!(apr.min, decimal::parse("2.15").unwrap());
    }

    #[test]
    fn fee_delta_is_weighted_by_snapshot_age() {
        let now = Utc::now();
        let liquidity = BigDecimal::from(365);
        let parameters = AprParameters::default();
        let swap_fee_apr = |fees: &str, age: Duration| {
            let pool = pool(fees);
            let prior = PoolSnapshot {
                timestamp: (now - age).timestamp(),
                ..snapshot("0")
            };
            compute_apr(
                AprInputs {
                    pool: &pool,
                    prior_snapshot: Some(&prior),
                    prices: &TokenPrices::default(),
                    currency: &Currency::usd(),
                    total_liquidity: Some(&liquidity),
                    parameters: &parameters,
                    now,
                },
                &DailyFeeAnnualizer,
            )
            .swap_fees
        };

        // The same rate of 10 per day, observed over different periods.
        assert_eq!(swap_fee_apr("10", Duration::days(1)), BigDecimal::from(10));
        assert_eq!(swap_fee_apr("70", Duration::days(7)), BigDecimal::from(10));
        assert_eq!(swap_fee_apr("5", Duration::hours(12)), BigDecimal::from(10));
    }

    #[test]
    fn unknown_snapshot_age_counts_as_one_day() {
        let now = Utc::now();
        for timestamp in [0, -1, (now + Duration::hours(1)).timestamp(), i64::MAX] {
            let prior = PoolSnapshot {
                timestamp,
                ..snapshot("0")
            };
            assert_eq!(snapshot_age_in_days(&prior, now), BigDecimal::one());
        }

        let prior = PoolSnapshot {
            timestamp: (now - Duration::days(3)).timestamp(),
            ..snapshot("0")
        };
        assert_eq!(snapshot_age_in_days(&prior, now), BigDecimal::from(3));
    }

    #[test]
    fn annualizer_handles_empty_pools() {
        assert_eq!(
            DailyFeeAnnualizer.swap_fee_apr(&BigDecimal::from(10), &BigDecimal::zero()),
            BigDecimal::zero()
        );
        assert_eq!(
            DailyFeeAnnualizer.swap_fee_apr(&BigDecimal::from(1), &BigDecimal::from(365)),
            BigDecimal::one()
        );
    }

    #[test]
    fn staking_defaults() {
        let parameters = AprParameters::default();
        assert_eq!(parameters.staking_reward_apr, BigDecimal::zero());
        assert_eq!(parameters.max_boost, decimal::parse("2.5").unwrap());
    }
}
