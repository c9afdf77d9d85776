use std::path::Path;

use shelfdb_core::{AppConfig, BatchOutcome, DedupOutcome};
use shelfdb_ingest::BatchConfig;

use crate::connect_store;

pub(crate) async fn run_dedupe(config: &AppConfig, scope: Option<&str>) -> anyhow::Result<()> {
    let store = connect_store(config).await?;
    let outcome = shelfdb_ingest::deduplicate(&store, scope).await;

    println!("{}", summarize_dedup(scope, &outcome));
    for error in &outcome.errors {
        println!("  {error}");
    }

    if !outcome.succeeded() {
        anyhow::bail!("dedup pass failed with {} errors", outcome.errors.len());
    }
    Ok(())
}

pub(crate) async fn run_restore(config: &AppConfig, file: &Path) -> anyhow::Result<()> {
    let products = shelfdb_ingest::load_backup(file)?;
    if products.is_empty() {
        println!("{}: backup is empty; nothing to restore", file.display());
        return Ok(());
    }

    let store = connect_store(config).await?;
    let outcome =
        shelfdb_ingest::restore(&store, &products, &BatchConfig::from_app_config(config)).await;

    println!("{}", summarize_restore(products.len(), &outcome));
    for error in &outcome.errors {
        println!("  {error}");
    }

    if outcome.inserted_count == 0 {
        anyhow::bail!("restore inserted nothing from {}", file.display());
    }
    Ok(())
}

pub(crate) async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let store = connect_store(config).await?;
    let applied = shelfdb_db::run_migrations(store.pool()).await?;
    println!("applied {applied} migrations");
    Ok(())
}

pub(crate) fn summarize_dedup(scope: Option<&str>, outcome: &DedupOutcome) -> String {
    format!(
        "dedupe ({}): deleted {} rows across {} duplicate groups, {} errors",
        scope.unwrap_or("all sources"),
        outcome.deleted_count,
        outcome.groups_processed,
        outcome.errors.len()
    )
}

pub(crate) fn summarize_restore(total: usize, outcome: &BatchOutcome) -> String {
    format!(
        "restore: inserted {} of {total} (tier {:?}, {} failed batches, {} failed items)",
        outcome.inserted_count,
        outcome.tier_reached,
        outcome.failed_batches,
        outcome.errors.len()
    )
}
