//! The product store seam.
//!
//! Ingestion and maintenance code only ever talk to the store through
//! [`ProductStore`]. Individual calls are atomic; nothing spans a whole run.

use async_trait::async_trait;
use shelfdb_core::{IdentityKey, NewProduct, ProductPatch, ProductRecord};

use crate::DbError;

/// Selection criteria for `query` and `count`.
///
/// All set criteria must hold. When `identity` is set its fields take
/// precedence over `source_type` / `source_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact match on all four identity columns; a `None` ASIN matches only
    /// rows whose ASIN is null.
    pub identity: Option<IdentityKey>,
    pub source_type: Option<String>,
    pub source_name: Option<String>,
    pub favorites_only: bool,
    pub exclude_manual_copies: bool,
    pub limit: Option<i64>,
}

impl ProductFilter {
    #[must_use]
    pub fn by_identity(key: IdentityKey) -> Self {
        Self {
            identity: Some(key),
            ..Self::default()
        }
    }

    /// In-process evaluation of the filter, mirroring the SQL `WHERE` clause.
    #[must_use]
    pub fn matches(&self, record: &ProductRecord) -> bool {
        if let Some(key) = &self.identity {
            if record.source_type != key.source_type
                || record.source_name != key.source_name
                || record.name != key.name
                || record.asin != key.asin
            {
                return false;
            }
        } else {
            if self
                .source_type
                .as_ref()
                .is_some_and(|t| *t != record.source_type)
            {
                return false;
            }
            if self
                .source_name
                .as_ref()
                .is_some_and(|n| *n != record.source_name)
            {
                return false;
            }
        }
        if self.favorites_only && !record.is_favorite {
            return false;
        }
        if self.exclude_manual_copies && record.is_manual_copy() {
            return false;
        }
        true
    }
}

/// CRUD interface over persisted product records.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Returns matching records ordered by `created_at` ascending, then `id`.
    async fn query(&self, filter: &ProductFilter) -> Result<Vec<ProductRecord>, DbError>;

    async fn insert(&self, product: &NewProduct) -> Result<ProductRecord, DbError>;

    /// Applies `patch` and bumps `updated_at`. Returns `false` when no row has `id`.
    async fn update(&self, id: i64, patch: &ProductPatch) -> Result<bool, DbError>;

    /// Deletes every row whose id is in `ids`, returning the number deleted.
    async fn delete_by_ids(&self, ids: &[i64]) -> Result<u64, DbError>;

    async fn count(&self, filter: &ProductFilter) -> Result<i64, DbError>;

    /// Liveness probe for health endpoints.
    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}

/// Destination for the tiered batch executor.
///
/// `insert_bulk` must be all-or-nothing: on `Err`, none of `items` were
/// applied. Sinks that cannot offer that report `supports_bulk() == false`
/// and only receive `insert_one` calls.
#[async_trait]
pub trait BatchSink<T: Sync>: Send + Sync {
    fn supports_bulk(&self) -> bool {
        true
    }

    async fn insert_bulk(&self, items: &[T]) -> Result<u64, DbError>;

    async fn insert_one(&self, item: &T) -> Result<(), DbError>;
}
