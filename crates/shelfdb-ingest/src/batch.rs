//! Tiered batch insertion.
//!
//! Tier 1 sends everything in one bulk call. If that fails, tier 2 resends in
//! fixed-size batches with a pause between them. Tier 3 retries the items of
//! each failed batch one by one. Nothing already applied is rolled back.

use std::time::Duration;

use shelfdb_core::{BatchOutcome, BatchTier, NewProduct};
use shelfdb_db::BatchSink;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub batch_size: usize,
    /// Pause between tier-2 batches.
    pub batch_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

impl BatchConfig {
    #[must_use]
    pub fn from_app_config(config: &shelfdb_core::AppConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            batch_delay: Duration::from_millis(config.batch_delay_ms),
        }
    }
}

/// Identifies an item in error messages.
pub trait BatchItem {
    fn label(&self) -> String;
}

impl BatchItem for NewProduct {
    fn label(&self) -> String {
        self.identity_key().to_string()
    }
}

/// Inserts `items` into `sink`, degrading tier by tier on failure.
///
/// Sinks reporting `supports_bulk() == false` go straight to tier 3.
/// `errors` lists only items that failed at every tier attempted.
pub async fn execute<T, S>(sink: &S, items: &[T], config: &BatchConfig) -> BatchOutcome
where
    T: BatchItem + Sync,
    S: BatchSink<T> + ?Sized,
{
    let mut outcome = BatchOutcome::default();
    if items.is_empty() {
        return outcome;
    }

    let failed: Vec<&[T]> = if sink.supports_bulk() {
        match sink.insert_bulk(items).await {
            Ok(inserted) => {
                tracing::info!(items = items.len(), inserted, "bulk insert succeeded");
                outcome.inserted_count = inserted;
                return outcome;
            }
            Err(e) => {
                tracing::warn!(items = items.len(), error = %e, "bulk insert failed; splitting into batches");
            }
        }

        outcome.tier_reached = BatchTier::Batched;
        run_batches(sink, items, config, &mut outcome).await
    } else {
        tracing::debug!(items = items.len(), "sink has no bulk support; inserting individually");
        vec![items]
    };

    if !failed.is_empty() {
        outcome.tier_reached = BatchTier::Individual;
        for batch in failed {
            insert_individually(sink, batch, &mut outcome).await;
        }
    }

    tracing::info!(
        items = items.len(),
        inserted = outcome.inserted_count,
        failed_batches = outcome.failed_batches,
        failed_items = outcome.errors.len(),
        tier = ?outcome.tier_reached,
        "batch execution finished"
    );
    outcome
}

async fn run_batches<'a, T, S>(
    sink: &S,
    items: &'a [T],
    config: &BatchConfig,
    outcome: &mut BatchOutcome,
) -> Vec<&'a [T]>
where
    T: BatchItem + Sync,
    S: BatchSink<T> + ?Sized,
{
    let mut failed = Vec::new();

    for (idx, batch) in items.chunks(config.batch_size.max(1)).enumerate() {
        if idx > 0 && !config.batch_delay.is_zero() {
            tokio::time::sleep(config.batch_delay).await;
        }

        match sink.insert_bulk(batch).await {
            Ok(inserted) => outcome.inserted_count += inserted,
            Err(e) => {
                tracing::warn!(batch = idx + 1, size = batch.len(), error = %e, "batch insert failed");
                outcome.failed_batches += 1;
                failed.push(batch);
            }
        }
    }

    failed
}

async fn insert_individually<T, S>(sink: &S, batch: &[T], outcome: &mut BatchOutcome)
where
    T: BatchItem + Sync,
    S: BatchSink<T> + ?Sized,
{
    for item in batch {
        match sink.insert_one(item).await {
            Ok(()) => outcome.inserted_count += 1,
            Err(e) => {
                let label = item.label();
                tracing::warn!(item = %label, error = %e, "individual insert failed");
                outcome.errors.push(format!("{label}: {e}"));
            }
        }
    }
}
