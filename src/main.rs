use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coupon_scraper::config::Config;
use coupon_scraper::server::ScraperServer;
use coupon_scraper::sources::{SourceKind, SourceRegistry};

#[derive(Parser)]
#[command(
    name = "coupon-scraper",
    version,
    about = "Aggregates game redemption codes from community wiki pages",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the config file
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the coupon API
    Serve {
        /// Listen address, overrides the config file
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Scrape once and print the records as JSON
    Scrape {
        /// Source slug (genshin, honkai-star-rail, blox-fruits, play-together, fc-mobile) or "all"
        #[arg(default_value = "all")]
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_address = bind;
                config.validate()?;
            }
            tracing::info!(bind = %config.server.bind_address, "Starting serve command");
            serve(config).await?;
        }

        Commands::Scrape { source } => {
            tracing::info!(source = %source, "Starting scrape command");
            scrape(config, &source).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("coupon_scraper=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("coupon_scraper={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let registry = SourceRegistry::from_config(&config)?;
    let server = ScraperServer::new(&config, registry)?;

    server
        .start_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    Ok(())
}

async fn scrape(config: Config, source: &str) -> Result<()> {
    let registry = SourceRegistry::from_config(&config)?;

    let kinds: Vec<SourceKind> = if source.eq_ignore_ascii_case("all") {
        registry.kinds()
    } else {
        vec![source.parse().map_err(anyhow::Error::msg)?]
    };

    let runs = kinds.iter().filter_map(|&kind| {
        let adapter = registry.get(kind)?;
        Some(async move { (kind, adapter.active_coupons().await) })
    });

    let mut output = serde_json::Map::new();
    for (kind, result) in join_all(runs).await {
        let records = result.with_context(|| kind.failure_message())?;
        tracing::info!(source = %kind, count = records.len(), "Scraped");
        output.insert(kind.slug().to_string(), serde_json::to_value(records)?);
    }

    let json = if kinds.len() == 1 {
        output
            .into_iter()
            .next()
            .map(|(_, records)| records)
            .unwrap_or_default()
    } else {
        serde_json::Value::Object(output)
    };

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
