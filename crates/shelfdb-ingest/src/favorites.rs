use std::collections::BTreeMap;

use shelfdb_core::{ItemResult, ProductRecord, TargetedResult};
use shelfdb_db::{ProductFilter, ProductStore};
use shelfdb_scraper::AdapterRegistry;

use crate::orchestrator::{run_targeted, ScrapeOptions};

/// Refreshes every favorite record from its source, one source at a time.
///
/// Favorites whose `(source_type, source_name)` has no registered adapter
/// fail individually.
pub async fn refresh_favorites(
    store: &dyn ProductStore,
    registry: &AdapterRegistry,
    options: &ScrapeOptions,
) -> TargetedResult {
    let filter = ProductFilter {
        favorites_only: true,
        ..ProductFilter::default()
    };
    let favorites = match store.query(&filter).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(error = %e, "loading favorites failed");
            return TargetedResult {
                success: false,
                errors: vec![format!("loading favorites failed: {e}")],
                ..TargetedResult::default()
            };
        }
    };

    let mut by_source: BTreeMap<(String, String), Vec<ProductRecord>> = BTreeMap::new();
    for record in favorites {
        by_source
            .entry((record.source_type.clone(), record.source_name.clone()))
            .or_default()
            .push(record);
    }

    let mut overall = TargetedResult::default();
    for ((source_type, source_name), records) in by_source {
        let partial = match registry.by_source(&source_type, &source_name) {
            Some(adapter) => run_targeted(store, adapter.as_ref(), &records, options).await,
            None => {
                tracing::warn!(
                    source = %source_type,
                    shop = %source_name,
                    count = records.len(),
                    "no adapter for favorites"
                );
                let mut unmatched = TargetedResult::default();
                for record in &records {
                    unmatched.push(ItemResult::failed(
                        record.id,
                        format!("no adapter configured for {source_type} / {source_name}"),
                    ));
                }
                unmatched
            }
        };
        overall.merge(partial);
    }

    overall.success = overall.total == 0 || overall.updated_count > 0;
    tracing::info!(
        total = overall.total,
        updated = overall.updated_count,
        failed = overall.failed_count,
        "favorites refresh finished"
    );
    overall
}
