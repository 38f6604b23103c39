//! Pool records as returned by the indexing backend and the auxiliary market
//! data used to enrich them.

use {
    crate::address::Checksummed,
    alloy_primitives::{Address, B256},
    bigdecimal::BigDecimal,
    number::serialization::DecimalString,
    serde::{Deserialize, Serialize},
    serde_with::{DeserializeFromStr, SerializeDisplay, serde_as},
    std::{
        collections::HashMap,
        convert::Infallible,
        fmt::{self, Display, Formatter},
        str::FromStr,
    },
};

/// A Balancer pool ID: the pool address followed by the specialization and a
/// registration nonce.
pub type PoolId = B256;

/// Pool type tags as reported by the subgraph.
///
/// Unknown tags are kept verbatim so that new pool types never fail
/// deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub enum PoolType {
    Weighted,
    Investment,
    LiquidityBootstrapping,
    Stable,
    MetaStable,
    StablePhantom,
    ComposableStable,
    Element,
    Gyro2,
    Gyro3,
    GyroE,
    AaveLinear,
    Erc4626Linear,
    Linear,
    Other(String),
}

impl PoolType {
    /// Wrapper pools holding a main token and its yield bearing wrapped
    /// counterpart. Every `*Linear` tag qualifies, including ones we have no
    /// dedicated variant for (e.g. `EulerLinear`).
    pub fn is_linear(&self) -> bool {
        match self {
            Self::AaveLinear | Self::Erc4626Linear | Self::Linear => true,
            Self::Other(name) => name.ends_with("Linear"),
            _ => false,
        }
    }
}

impl FromStr for PoolType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Weighted" => Self::Weighted,
            "Investment" => Self::Investment,
            "LiquidityBootstrapping" => Self::LiquidityBootstrapping,
            "Stable" => Self::Stable,
            "MetaStable" => Self::MetaStable,
            "StablePhantom" => Self::StablePhantom,
            "ComposableStable" => Self::ComposableStable,
            "Element" => Self::Element,
            "Gyro2" => Self::Gyro2,
            "Gyro3" => Self::Gyro3,
            "GyroE" => Self::GyroE,
            "AaveLinear" => Self::AaveLinear,
            "ERC4626Linear" => Self::Erc4626Linear,
            "Linear" => Self::Linear,
            other => Self::Other(other.to_string()),
        })
    }
}

impl Display for PoolType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Weighted => "Weighted",
            Self::Investment => "Investment",
            Self::LiquidityBootstrapping => "LiquidityBootstrapping",
            Self::Stable => "Stable",
            Self::MetaStable => "MetaStable",
            Self::StablePhantom => "StablePhantom",
            Self::ComposableStable => "ComposableStable",
            Self::Element => "Element",
            Self::Gyro2 => "Gyro2",
            Self::Gyro3 => "Gyro3",
            Self::GyroE => "GyroE",
            Self::AaveLinear => "AaveLinear",
            Self::Erc4626Linear => "ERC4626Linear",
            Self::Linear => "Linear",
            Self::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// A token held by a pool.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolToken {
    #[serde_as(as = "Checksummed")]
    pub address: Address,
    #[serde_as(as = "DecimalString")]
    pub balance: BigDecimal,
    /// Normalized weight. Kept as the raw string the backend sent since it is
    /// only used for ordering and is absent for non-weighted pools.
    #[serde(default)]
    pub weight: Option<String>,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// A raw pool as fetched from the indexing backend.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: PoolId,
    #[serde_as(as = "Checksummed")]
    pub address: Address,
    pub pool_type: PoolType,
    pub tokens: Vec<PoolToken>,
    #[serde_as(as = "Vec<Checksummed>")]
    pub tokens_list: Vec<Address>,
    #[serde_as(as = "DecimalString")]
    pub total_shares: BigDecimal,
    /// Liquidity as reported by the backend. Replaced by the valuation in the
    /// requested currency during enrichment.
    #[serde_as(as = "DecimalString")]
    #[serde(default)]
    pub total_liquidity: BigDecimal,
    #[serde_as(as = "DecimalString")]
    pub total_swap_fee: BigDecimal,
    #[serde_as(as = "DecimalString")]
    pub total_swap_volume: BigDecimal,
    /// Unix timestamp (seconds) of the pool creation.
    pub create_time: i64,
}

/// A pool wrapping a main token and its wrapped counterpart.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinearPool {
    pub id: PoolId,
    #[serde_as(as = "Checksummed")]
    pub address: Address,
    pub pool_type: PoolType,
    pub main_index: usize,
    pub wrapped_index: usize,
    pub tokens: Vec<PoolToken>,
    #[serde_as(as = "DecimalString")]
    #[serde(default)]
    pub total_shares: BigDecimal,
}

/// Historic cumulative figures of a pool, typically from 24 hours ago.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    #[serde_as(as = "DecimalString")]
    pub total_swap_fee: BigDecimal,
    #[serde_as(as = "DecimalString")]
    pub total_swap_volume: BigDecimal,
    #[serde(default)]
    pub timestamp: i64,
}

/// A lower-case fiat currency code such as `usd`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct Currency(String);

impl Currency {
    pub fn usd() -> Self {
        Self("usd".to_string())
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        anyhow::ensure!(
            !code.is_empty() && code.chars().all(|c| c.is_ascii_alphabetic()),
            "invalid currency code {s:?}"
        );
        Ok(Self(code.to_ascii_lowercase()))
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token prices keyed by token and currency.
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct TokenPrices(
    #[serde_as(as = "HashMap<Checksummed, HashMap<_, DecimalString>>")]
    HashMap<Address, HashMap<Currency, BigDecimal>>,
);

impl TokenPrices {
    pub fn insert(&mut self, token: Address, currency: Currency, price: BigDecimal) {
        self.0.entry(token).or_default().insert(currency, price);
    }

    pub fn price(&self, token: &Address, currency: &Currency) -> Option<&BigDecimal> {
        self.0.get(token)?.get(currency)
    }
}
