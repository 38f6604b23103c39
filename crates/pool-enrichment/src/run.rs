use {
    crate::{
        apr::DailyFeeAnnualizer,
        arguments::Arguments,
        config,
        graph_api::BalancerSubgraphClient,
        model::Pool,
        pipeline::{MarketData, PoolEnrichment},
    },
    anyhow::{Context, Result},
    clap::Parser,
    serde::de::DeserializeOwned,
    std::{path::Path, sync::Arc},
    tokio::fs,
};

pub async fn start(args: impl Iterator<Item = String>) {
    let args = Arguments::parse_from(args);
    observe::tracing::initialize(&args.log_filter, args.log_stderr_threshold);
    observe::metrics::setup_registry(Some("pool_enrichment".to_string()), None);
    tracing::info!("running pool enrichment with validated arguments:\n{}", args);

    if let Err(err) = run(args).await {
        tracing::error!(?err, "pool enrichment failed");
        std::process::exit(1);
    }
}

pub async fn run(args: Arguments) -> Result<()> {
    let config = config::load(&args.config).await;
    let index = BalancerSubgraphClient::new(config.subgraph_url, reqwest::Client::new())?;
    let enrichment = PoolEnrichment::new(
        config.enrichment,
        Arc::new(index),
        Arc::new(DailyFeeAnnualizer),
    );

    let pool = read_json::<Pool>(&args.pool).await?;
    let market = read_json::<MarketData>(&args.market).await?;
    let decorated = enrichment.enrich(pool, &market).await?;

    let json = serde_json::to_string_pretty(&decorated)?;
    match &args.output {
        Some(path) => fs::write(path, json)
            .await
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    tracing::debug!(
        metrics = %observe::metrics::encode(observe::metrics::get_registry()),
        "enrichment metrics"
    );
    Ok(())
}

async fn read_json<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let data = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("decoding {}", path.display()))
}

#[cfg(test)]
mod tests {
    use {super::*, crate::model::PoolType, std::io::Write};

    #[tokio::test]
    async fn reads_pool_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "id": "0x5c6ee304399dbdb9c8ef030ab642b10820db8f56000200000000000000000014",
                "address": "0x5c6ee304399dbdb9c8ef030ab642b10820db8f56",
                "poolType": "Weighted",
                "tokens": [],
                "tokensList": [],
                "totalShares": "1000",
                "totalSwapFee": "0",
                "totalSwapVolume": "0",
                "createTime": 1620000000
            }}"#
        )
        .unwrap();

        let pool = read_json::<Pool>(file.path()).await.unwrap();
        assert_eq!(pool.pool_type, PoolType::Weighted);
    }

    #[tokio::test]
    async fn reports_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "prices": {{}}, "protocolFeePercentage": "half" }}"#).unwrap();

        let err = read_json::<MarketData>(file.path()).await.unwrap_err();
        assert!(err.to_string().starts_with("decoding "));

        let err = read_json::<MarketData>(Path::new("/nonexistent/market.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("reading "));
    }
}
