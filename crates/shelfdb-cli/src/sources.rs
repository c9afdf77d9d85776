use std::path::Path;

use shelfdb_core::{AppConfig, SourceConfig};
use shelfdb_scraper::RelayedAsset;

use crate::build_relay;

pub(crate) fn run_list_sources(config: &AppConfig) -> anyhow::Result<()> {
    let sources = shelfdb_core::load_sources(&config.sources_path)?;
    if sources.sources.is_empty() {
        println!("no sources configured in {}", config.sources_path.display());
        return Ok(());
    }
    for source in &sources.sources {
        println!("{}", format_source(source));
    }
    Ok(())
}

pub(crate) async fn run_relay(config: &AppConfig, url: &str, out: &Path) -> anyhow::Result<()> {
    let relay = build_relay(config)?;
    let asset = relay.fetch(url).await?;
    write_asset(out, &asset).await?;
    println!(
        "saved {} bytes ({}) to {} proxy={}",
        asset.bytes.len(),
        asset.content_type,
        out.display(),
        relay.proxy_used()
    );
    Ok(())
}

pub(crate) async fn write_asset(out: &Path, asset: &RelayedAsset) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(out, &asset.bytes).await?;
    Ok(())
}

pub(crate) fn format_source(source: &SourceConfig) -> String {
    format!(
        "{:<24} {:<10} {} / {}  {}",
        source.slug(),
        source.adapter.to_string(),
        source.source_type,
        source.source_name,
        source.url
    )
}
