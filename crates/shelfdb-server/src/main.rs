mod api;
mod middleware;

use std::sync::Arc;

use shelfdb_db::PgProductStore;
use shelfdb_ingest::ScrapeOptions;
use shelfdb_scraper::{AdapterOptions, AdapterRegistry, FetchRelay, RelayOptions};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(shelfdb_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = shelfdb_db::PoolConfig::from_app_config(&config);
    let pool = shelfdb_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = shelfdb_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let sources = shelfdb_core::load_sources(&config.sources_path)?;
    let decision = shelfdb_scraper::resolve(&config.proxy);
    let relay = Arc::new(FetchRelay::new(
        &decision,
        &RelayOptions::from_app_config(&config),
    )?);
    let registry = AdapterRegistry::from_sources(
        &sources,
        &relay,
        AdapterOptions::from_app_config(&config),
    )?;
    tracing::info!(sources = registry.len(), proxy_enabled = relay.proxy_used(), "adapters ready");

    let state = AppState {
        store: Arc::new(PgProductStore::new(pool)),
        registry: Arc::new(registry),
        relay,
        scrape_options: ScrapeOptions::from_app_config(&config),
    };
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
