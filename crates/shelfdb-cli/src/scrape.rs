//! Scrape and favorites command handlers.
//!
//! Sources run one after another. A failing source is reported and skipped;
//! the command only errors when every selected source failed.

use std::sync::Arc;

use shelfdb_core::{AppConfig, ScrapeResult, TargetedResult};
use shelfdb_ingest::ScrapeOptions;
use shelfdb_scraper::{AdapterRegistry, SiteAdapter};

use crate::{build_registry, connect_store};

pub(crate) async fn run_scrape(
    config: &AppConfig,
    source_filter: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let registry = build_registry(config)?;
    let adapters = select_adapters(&registry, source_filter)?;
    if adapters.is_empty() {
        println!(
            "no sources configured in {}; nothing to scrape",
            config.sources_path.display()
        );
        return Ok(());
    }

    let store = connect_store(config).await?;
    let options = ScrapeOptions {
        dry_run,
        ..ScrapeOptions::from_app_config(config)
    };

    let mut results = Vec::with_capacity(adapters.len());
    for (slug, adapter) in &adapters {
        let result = shelfdb_ingest::run_full_catalog(&store, adapter.as_ref(), &options).await;
        println!("{}", summarize_scrape(slug, &result, dry_run));
        results.push(result);
    }

    if all_failed(&results) {
        anyhow::bail!("all {} selected sources failed", results.len());
    }
    Ok(())
}

pub(crate) async fn run_favorites(config: &AppConfig) -> anyhow::Result<()> {
    let registry = build_registry(config)?;
    let store = connect_store(config).await?;
    let options = ScrapeOptions::from_app_config(config);

    let result = shelfdb_ingest::refresh_favorites(&store, &registry, &options).await;
    println!("{}", summarize_favorites(&result));
    for item in result.results.iter().filter(|r| !r.success) {
        println!(
            "  #{}: {}",
            item.item_id,
            item.error.as_deref().unwrap_or("unknown error")
        );
    }

    if !result.success {
        anyhow::bail!("favorites refresh failed for all {} items", result.total);
    }
    Ok(())
}

/// Every registered adapter, or just the one named by `source_filter`.
pub(crate) fn select_adapters(
    registry: &AdapterRegistry,
    source_filter: Option<&str>,
) -> anyhow::Result<Vec<(String, Arc<dyn SiteAdapter>)>> {
    let Some(slug) = source_filter else {
        return Ok(registry
            .iter()
            .map(|(slug, adapter)| (slug.to_owned(), Arc::clone(adapter)))
            .collect());
    };

    let adapter = registry.by_slug(slug).ok_or_else(|| {
        let known: Vec<&str> = registry.iter().map(|(s, _)| s).collect();
        anyhow::anyhow!(
            "source '{slug}' not found; configured sources: [{}]",
            known.join(", ")
        )
    })?;
    Ok(vec![(slug.to_owned(), adapter)])
}

/// `true` when at least one source ran and none succeeded.
pub(crate) fn all_failed(results: &[ScrapeResult]) -> bool {
    !results.is_empty() && results.iter().all(|r| !r.success)
}

pub(crate) fn summarize_scrape(slug: &str, result: &ScrapeResult, dry_run: bool) -> String {
    let prefix = if dry_run { "dry-run: " } else { "" };
    let status = if result.success { "ok" } else { "FAILED" };
    format!(
        "{prefix}{slug}: {status} found={} saved={} skipped={} failed={} proxy={}",
        result.total_found,
        result.saved_count,
        result.skipped_count,
        result.failed_count(),
        result.proxy_used
    )
}

pub(crate) fn summarize_favorites(result: &TargetedResult) -> String {
    format!(
        "favorites: updated {} of {} ({} failed) proxy={}",
        result.updated_count, result.total, result.failed_count, result.proxy_used
    )
}
