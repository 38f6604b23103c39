use {
    crate::{apr, model::PoolType, pipeline, pool_index::NO_LIQUIDITY_FILTER, tokens},
    anyhow::{Context, Result},
    bigdecimal::BigDecimal,
    number::serialization::DecimalString,
    serde::Deserialize,
    serde_with::serde_as,
    std::{path::Path, time::Duration},
    tokio::fs,
    url::Url,
};

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct File {
    /// The Balancer V2 subgraph used to look up nested linear pools.
    subgraph_url: Url,

    /// Pool types whose tokens are not reordered by weight. Linear pools are
    /// always exempt.
    #[serde(default)]
    exempt_pool_types: Option<Vec<PoolType>>,

    /// Minimum `totalShares` of nested linear pools. Disabled by default.
    #[serde(default = "default_linear_pool_total_shares_threshold")]
    linear_pool_total_shares_threshold: i64,

    /// Pools created less than this long ago are flagged as new.
    #[serde(with = "humantime_serde", default = "default_new_pool_window")]
    new_pool_window: Duration,

    /// Maximum veBAL boost applied to the BAL staking APR.
    #[serde_as(as = "DecimalString")]
    #[serde(default = "apr::default_max_boost")]
    max_staking_boost: BigDecimal,
}

fn default_linear_pool_total_shares_threshold() -> i64 {
    NO_LIQUIDITY_FILTER
}

fn default_new_pool_window() -> Duration {
    Duration::from_secs(7 * 24 * 60 * 60)
}

#[derive(Clone, Debug)]
pub struct Config {
    pub subgraph_url: Url,
    pub enrichment: pipeline::Config,
}

/// Load the enrichment configuration from a TOML file.
///
/// # Panics
///
/// This method panics if the config is invalid or on I/O errors.
pub async fn load(path: &Path) -> Config {
    let data = fs::read_to_string(path)
        .await
        .unwrap_or_else(|e| panic!("I/O error while reading {path:?}: {e:?}"));
    parse(&data).unwrap_or_else(|e| panic!("invalid configuration in {path:?}: {e:#}"))
}

/// Parses the TOML configuration.
pub fn parse(data: &str) -> Result<Config> {
    let file = toml::de::from_str::<File>(data).context("TOML syntax error")?;
    let exempt_pool_types = match file.exempt_pool_types {
        Some(pool_types) => tokens::ExemptPoolTypes::new(pool_types),
        None => tokens::ExemptPoolTypes::default(),
    };
    anyhow::ensure!(
        file.max_staking_boost >= BigDecimal::from(1),
        "max-staking-boost must be at least 1"
    );

    Ok(Config {
        subgraph_url: file.subgraph_url,
        enrichment: pipeline::Config {
            exempt_pool_types,
            linear_pool_total_shares_threshold: file.linear_pool_total_shares_threshold,
            new_pool_window: chrono::Duration::from_std(file.new_pool_window)
                .context("new-pool-window out of range")?,
            max_staking_boost: file.max_staking_boost,
        },
    })
}

#[cfg(test)]
mod tests {
    use {super::*, number::decimal};

    #[test]
    fn defaults() {
        let config = parse(r#"subgraph-url = "http://localhost:8000/subgraphs/name/balancer""#)
            .unwrap();

        assert_eq!(config.subgraph_url.host_str(), Some("localhost"));
        assert_eq!(
            config.enrichment.exempt_pool_types,
            tokens::ExemptPoolTypes::default()
        );
        assert_eq!(config.enrichment.linear_pool_total_shares_threshold, -1);
        assert_eq!(config.enrichment.new_pool_window, chrono::Duration::weeks(1));
        assert_eq!(
            config.enrichment.max_staking_boost,
            decimal::parse("2.5").unwrap()
        );
    }

    #[test]
    fn all_options() {
        let config = parse(
            r#"
            subgraph-url = "https://example.com/subgraph"
            exempt-pool-types = ["Stable", "FX"]
            linear-pool-total-shares-threshold = 0
            new-pool-window = "2days"
            max-staking-boost = "2"
            "#,
        )
        .unwrap();

        let exempt = &config.enrichment.exempt_pool_types;
        assert!(exempt.contains(&PoolType::Stable));
        assert!(exempt.contains(&PoolType::Other("FX".to_string())));
        assert!(!exempt.contains(&PoolType::ComposableStable));
        assert_eq!(config.enrichment.linear_pool_total_shares_threshold, 0);
        assert_eq!(config.enrichment.new_pool_window, chrono::Duration::days(2));
        assert_eq!(config.enrichment.max_staking_boost, BigDecimal::from(2));
    }

    #[test]
    fn invalid_configs() {
        for toml in [
            "",
            r#"subgraph-url = "not a url""#,
            r#"
            subgraph-url = "http://localhost"
            currency = "usd"
            "#,
            r#"
            subgraph-url = "http://localhost"
            max-staking-boost = "0.5"
            "#,
            r#"
            subgraph-url = "http://localhost"
            new-pool-window = "soon"
            "#,
        ] {
            assert!(parse(toml).is_err(), "{toml}");
        }
    }
}
