//! Drives one site adapter through a scrape run.
//!
//! A run goes list discovery → per-item detail fetch → normalization →
//! write-time dedup → persist, strictly one item at a time. Item failures are
//! collected into the result and never stop the run.

use std::time::Duration;

use shelfdb_core::{ItemResult, ProductPatch, ProductRecord, ProductRef, ScrapeResult, TargetedResult};
use shelfdb_db::ProductStore;
use shelfdb_scraper::{normalize_product, refreshed_fields, SiteAdapter};

use crate::dedup::is_duplicate;
use crate::error::IngestError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScrapeOptions {
    /// Pause between consecutive detail fetches.
    pub item_delay: Duration,
    /// Count new items as saved without writing them.
    pub dry_run: bool,
}

impl ScrapeOptions {
    #[must_use]
    pub fn from_app_config(config: &shelfdb_core::AppConfig) -> Self {
        Self {
            item_delay: Duration::from_millis(config.scraper_inter_request_delay_ms),
            dry_run: false,
        }
    }
}

enum Persisted {
    Saved,
    Skipped,
}

/// Scrapes the adapter's whole catalog, inserting every product not already
/// stored under the same identity key.
///
/// `success` is `false` only when list discovery fails or every listed item
/// fails. A catalog with no listings is a successful, empty run.
pub async fn run_full_catalog(
    store: &dyn ProductStore,
    adapter: &dyn SiteAdapter,
    options: &ScrapeOptions,
) -> ScrapeResult {
    let source = adapter.source_type().to_owned();
    let proxy_used = adapter.proxy_used();
    tracing::info!(source = %source, proxy_enabled = proxy_used, "full-catalog scrape started");

    let refs = match adapter.list_products().await {
        Ok(refs) => refs,
        Err(e) => {
            tracing::error!(source = %source, error = %e, "list discovery failed");
            return ScrapeResult::list_failed(
                proxy_used,
                format!("list discovery failed for {source}: {e}"),
            );
        }
    };

    let mut result = ScrapeResult {
        total_found: refs.len(),
        proxy_used,
        ..ScrapeResult::default()
    };

    for (idx, item) in refs.iter().enumerate() {
        pause(idx, options.item_delay).await;

        match persist_item(store, adapter, item, options.dry_run).await {
            Ok(Persisted::Saved) => result.saved_count += 1,
            Ok(Persisted::Skipped) => result.skipped_count += 1,
            Err(e) => {
                tracing::warn!(source = %source, item = %item.url, error = %e, "item failed");
                result.errors.push(format!("{}: {e}", item.url));
            }
        }
    }

    result.success = result.total_found == 0 || result.saved_count + result.skipped_count > 0;
    tracing::info!(
        source = %source,
        total = result.total_found,
        saved = result.saved_count,
        skipped = result.skipped_count,
        failed = result.errors.len(),
        dry_run = options.dry_run,
        "full-catalog scrape finished"
    );
    result
}

async fn persist_item(
    store: &dyn ProductStore,
    adapter: &dyn SiteAdapter,
    item: &ProductRef,
    dry_run: bool,
) -> Result<Persisted, IngestError> {
    let raw = adapter.fetch_detail(item).await?;
    let mut product = normalize_product(raw, adapter.source_type(), adapter.source_name())?;
    if product.asin.is_none() {
        product.asin.clone_from(&item.asin);
    }

    if is_duplicate(store, &product).await? {
        tracing::debug!(item = %item.url, key = %product.identity_key(), "already stored");
        return Ok(Persisted::Skipped);
    }
    if !dry_run {
        store.insert(&product).await?;
    }
    Ok(Persisted::Saved)
}

/// Re-fetches each of `targets` and refreshes its price, sale price and image
/// in place. Every target gets its own entry in `results`.
pub async fn run_targeted(
    store: &dyn ProductStore,
    adapter: &dyn SiteAdapter,
    targets: &[ProductRecord],
    options: &ScrapeOptions,
) -> TargetedResult {
    let mut result = TargetedResult {
        proxy_used: adapter.proxy_used(),
        ..TargetedResult::default()
    };

    for (idx, record) in targets.iter().enumerate() {
        pause(idx, options.item_delay).await;

        match refresh_record(store, adapter, record, options.dry_run).await {
            Ok(()) => result.push(ItemResult::ok(record.id)),
            Err(e) => {
                tracing::warn!(
                    source = %adapter.source_type(),
                    item = record.id,
                    error = %e,
                    "targeted refresh failed"
                );
                result.push(ItemResult::failed(record.id, e.to_string()));
            }
        }
    }

    result.success = result.total == 0 || result.updated_count > 0;
    result
}

async fn refresh_record(
    store: &dyn ProductStore,
    adapter: &dyn SiteAdapter,
    record: &ProductRecord,
    dry_run: bool,
) -> Result<(), IngestError> {
    let item = adapter
        .ref_for(record)
        .ok_or(IngestError::MissingSourceUrl(record.id))?;
    let raw = adapter.fetch_detail(&item).await?;
    let fields = refreshed_fields(&raw)?;

    // A detail page without an image keeps the stored one.
    let patch = ProductPatch {
        price: Some(fields.price),
        sale_price: Some(fields.sale_price),
        image_url: fields.image_url.map(Some),
        ..ProductPatch::default()
    };
    if dry_run {
        return Ok(());
    }
    if store.update(record.id, &patch).await? {
        Ok(())
    } else {
        Err(IngestError::RecordVanished(record.id))
    }
}

async fn pause(idx: usize, delay: Duration) {
    if idx > 0 && !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
