mod maintenance;
mod scrape;
mod sources;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use shelfdb_core::AppConfig;
use shelfdb_db::{PgProductStore, PoolConfig};
use shelfdb_scraper::{AdapterOptions, AdapterRegistry, FetchRelay, RelayOptions};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shelfdb-cli")]
#[command(about = "shelfdb product ingestion command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape full catalogs from the configured sources
    Scrape {
        /// Restrict the run to one source (by slug)
        #[arg(long)]
        source: Option<String>,

        /// Check listings against the store without inserting anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Refresh price and image of every favorite product from its source
    Favorites,
    /// Delete duplicate listings, keeping the oldest of each identity group
    Dedupe {
        /// Restrict the pass to one shop (`source_name`)
        #[arg(long)]
        scope: Option<String>,
    },
    /// Re-insert products from a JSON backup through the batch executor
    Restore {
        #[arg(long)]
        file: PathBuf,
    },
    /// Fetch one asset through the configured relay and save it to disk
    Relay {
        url: String,

        #[arg(long)]
        out: PathBuf,
    },
    /// Apply pending database migrations
    Migrate,
    /// List the configured sources and their slugs
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("shelfdb-cli: no command given (see --help)");
        return Ok(());
    };

    let config = shelfdb_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    match command {
        Commands::Scrape { source, dry_run } => {
            scrape::run_scrape(&config, source.as_deref(), dry_run).await
        }
        Commands::Favorites => scrape::run_favorites(&config).await,
        Commands::Dedupe { scope } => maintenance::run_dedupe(&config, scope.as_deref()).await,
        Commands::Restore { file } => maintenance::run_restore(&config, &file).await,
        Commands::Relay { url, out } => sources::run_relay(&config, &url, &out).await,
        Commands::Migrate => maintenance::run_migrate(&config).await,
        Commands::Sources => sources::run_list_sources(&config),
    }
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

pub(crate) async fn connect_store(config: &AppConfig) -> anyhow::Result<PgProductStore> {
    let pool =
        shelfdb_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config)).await?;
    Ok(PgProductStore::new(pool))
}

/// Resolves the proxy once and builds the process-wide relay.
pub(crate) fn build_relay(config: &AppConfig) -> anyhow::Result<FetchRelay> {
    let decision = shelfdb_scraper::resolve(&config.proxy);
    Ok(FetchRelay::new(
        &decision,
        &RelayOptions::from_app_config(config),
    )?)
}

pub(crate) fn build_registry(config: &AppConfig) -> anyhow::Result<AdapterRegistry> {
    let sources = shelfdb_core::load_sources(&config.sources_path)?;
    let relay = Arc::new(build_relay(config)?);
    Ok(AdapterRegistry::from_sources(
        &sources,
        &relay,
        AdapterOptions::from_app_config(config),
    )?)
}
