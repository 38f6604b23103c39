use {
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
    },
    tracing::level_filters::LevelFilter,
};

/// Enrich a Balancer pool with liquidity, linear pool and yield information
#[derive(clap::Parser)]
#[command(version)]
pub struct Arguments {
    #[clap(long, env, default_value = "warn")]
    pub log_filter: String,

    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    /// Path to the enrichment configuration file. This file should be in TOML
    /// format.
    #[clap(long, env)]
    pub config: PathBuf,

    /// Path to the JSON encoded pool as fetched from the subgraph.
    #[clap(long, env)]
    pub pool: PathBuf,

    /// Path to the JSON encoded market data (prices, prior snapshot and
    /// protocol figures).
    #[clap(long, env)]
    pub market: PathBuf,

    /// Where to write the JSON encoded decorated pool. Defaults to stdout.
    #[clap(long, env)]
    pub output: Option<PathBuf>,
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            log_filter,
            log_stderr_threshold,
            config,
            pool,
            market,
            output,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        writeln!(f, "config: {}", config.display())?;
        writeln!(f, "pool: {}", pool.display())?;
        writeln!(f, "market: {}", market.display())?;
        match output {
            Some(output) => writeln!(f, "output: {}", output.display())?,
            None => writeln!(f, "output: stdout")?,
        }
        Ok(())
    }
}
