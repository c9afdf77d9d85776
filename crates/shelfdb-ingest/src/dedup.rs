//! Write-time and maintenance deduplication by identity key.

use std::collections::HashMap;

use shelfdb_core::{DedupOutcome, IdentityKey, NewProduct};
use shelfdb_db::{DbError, ProductFilter, ProductStore};

/// Returns `true` when a stored record already has `candidate`'s identity
/// key. A `None` ASIN matches only stored rows whose ASIN is null.
///
/// Plain read against current store state; called once per candidate right
/// before its insert. The check-then-insert pair is not atomic, so two
/// concurrent runs can both insert the same product; the maintenance pass
/// removes the later row.
///
/// # Errors
///
/// Returns [`DbError`] if the store lookup fails.
pub async fn is_duplicate(
    store: &dyn ProductStore,
    candidate: &NewProduct,
) -> Result<bool, DbError> {
    let filter = ProductFilter::by_identity(candidate.identity_key());
    Ok(store.count(&filter).await? > 0)
}

/// Removes all but the oldest record of every identity group.
///
/// Manual copies are excluded before grouping and are never deleted.
/// `scope` restricts the pass to one `source_name`. Records are taken in the
/// store's default order (`created_at`, then `id`), so the survivor of a
/// group is its first member. Each group is deleted in its own call; a
/// failed group is recorded and the pass moves on.
pub async fn deduplicate(store: &dyn ProductStore, scope: Option<&str>) -> DedupOutcome {
    let mut outcome = DedupOutcome::default();

    let filter = ProductFilter {
        source_name: scope.map(str::to_owned),
        exclude_manual_copies: true,
        ..ProductFilter::default()
    };
    let records = match store.query(&filter).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(scope = ?scope, error = %e, "dedup: loading records failed");
            outcome.errors.push(format!("loading records failed: {e}"));
            return outcome;
        }
    };

    let mut order: Vec<IdentityKey> = Vec::new();
    let mut groups: HashMap<IdentityKey, Vec<i64>> = HashMap::new();
    for record in &records {
        let key = record.identity_key();
        groups
            .entry(key)
            .or_insert_with_key(|k| {
                order.push(k.clone());
                Vec::new()
            })
            .push(record.id);
    }

    for key in order {
        let Some(ids) = groups.get(&key) else {
            continue;
        };
        let Some((keep, extras)) = ids.split_first() else {
            continue;
        };
        if extras.is_empty() {
            continue;
        }

        outcome.groups_processed += 1;
        match store.delete_by_ids(extras).await {
            Ok(deleted) => {
                tracing::debug!(group = %key, kept = *keep, deleted, "dedup: group collapsed");
                outcome.deleted_count += deleted;
            }
            Err(e) => {
                tracing::warn!(group = %key, error = %e, "dedup: group delete failed");
                outcome.errors.push(format!("{key}: {e}"));
            }
        }
    }

    tracing::info!(
        scope = ?scope,
        scanned = records.len(),
        groups = outcome.groups_processed,
        deleted = outcome.deleted_count,
        failed_groups = outcome.errors.len(),
        "dedup pass finished"
    );
    outcome
}
