//! In-process [`ProductStore`] for tests and dry runs. No database required.
//!
//! Failures can be injected per product name or record id so callers can
//! exercise their partial-failure paths.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use shelfdb_core::{NewProduct, ProductPatch, ProductRecord};

use crate::store::{BatchSink, ProductFilter, ProductStore};
use crate::DbError;

#[derive(Default)]
struct State {
    next_id: i64,
    records: Vec<ProductRecord>,
    rejected_names: HashSet<String>,
    rejected_delete_ids: HashSet<i64>,
    reject_queries: bool,
}

/// Thread-safe in-memory product store.
#[derive(Default)]
pub struct MemoryProductStore {
    state: Mutex<State>,
}

impl MemoryProductStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn records(&self) -> Vec<ProductRecord> {
        self.state.lock().unwrap().records.clone()
    }

    /// Makes every insert of a product with this exact name fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn reject_inserts_named(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected_names
            .insert(name.to_string());
    }

    /// Makes any delete call that includes `id` fail without deleting anything.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn reject_deletes_of(&self, id: i64) {
        self.state.lock().unwrap().rejected_delete_ids.insert(id);
    }

    /// Makes `query`, `count` and `ping` fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn reject_queries(&self) {
        self.state.lock().unwrap().reject_queries = true;
    }

    fn store_one(state: &mut State, product: &NewProduct) -> ProductRecord {
        state.next_id += 1;
        let created_at = product.created_at.unwrap_or_else(Utc::now);
        let record = ProductRecord {
            id: state.next_id,
            source_type: product.source_type.clone(),
            source_name: product.source_name.clone(),
            name: product.name.clone(),
            price: product.price,
            sale_price: product.sale_price,
            image_url: product.image_url.clone(),
            source_url: product.source_url.clone(),
            asin: product.asin.clone(),
            is_hidden: product.is_hidden,
            is_favorite: product.is_favorite,
            memo: product.memo.clone(),
            original_product_id: product.original_product_id,
            created_at,
            updated_at: created_at,
        };
        state.records.push(record.clone());
        record
    }

    fn rejected_insert(state: &State, product: &NewProduct) -> Option<DbError> {
        state
            .rejected_names
            .contains(&product.name)
            .then(|| DbError::Rejected(format!("insert of '{}' rejected", product.name)))
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn query(&self, filter: &ProductFilter) -> Result<Vec<ProductRecord>, DbError> {
        let state = self.state.lock().unwrap();
        if state.reject_queries {
            return Err(DbError::Rejected("query rejected".to_string()));
        }

        let mut matched: Vec<ProductRecord> = state
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        if let Some(limit) = filter.limit {
            matched.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        }
        Ok(matched)
    }

    async fn insert(&self, product: &NewProduct) -> Result<ProductRecord, DbError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = Self::rejected_insert(&state, product) {
            return Err(err);
        }
        Ok(Self::store_one(&mut state, product))
    }

    async fn update(&self, id: i64, patch: &ProductPatch) -> Result<bool, DbError> {
        let mut state = self.state.lock().unwrap();
        let Some(record) = state.records.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };

        if let Some(price) = patch.price {
            record.price = price;
        }
        if let Some(sale_price) = patch.sale_price {
            record.sale_price = sale_price;
        }
        if let Some(image_url) = &patch.image_url {
            record.image_url.clone_from(image_url);
        }
        if let Some(is_hidden) = patch.is_hidden {
            record.is_hidden = is_hidden;
        }
        if let Some(is_favorite) = patch.is_favorite {
            record.is_favorite = is_favorite;
        }
        if let Some(memo) = &patch.memo {
            record.memo.clone_from(memo);
        }
        record.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<u64, DbError> {
        let mut state = self.state.lock().unwrap();
        if let Some(id) = ids.iter().find(|id| state.rejected_delete_ids.contains(id)) {
            return Err(DbError::Rejected(format!("delete of id {id} rejected")));
        }

        let before = state.records.len();
        state.records.retain(|r| !ids.contains(&r.id));
        Ok((before - state.records.len()) as u64)
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, DbError> {
        let state = self.state.lock().unwrap();
        if state.reject_queries {
            return Err(DbError::Rejected("count rejected".to_string()));
        }
        let count = state.records.iter().filter(|r| filter.matches(r)).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn ping(&self) -> Result<(), DbError> {
        if self.state.lock().unwrap().reject_queries {
            return Err(DbError::Rejected("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BatchSink<NewProduct> for MemoryProductStore {
    async fn insert_bulk(&self, items: &[NewProduct]) -> Result<u64, DbError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = items.iter().find_map(|p| Self::rejected_insert(&state, p)) {
            return Err(err);
        }
        for product in items {
            Self::store_one(&mut state, product);
        }
        Ok(items.len() as u64)
    }

    async fn insert_one(&self, item: &NewProduct) -> Result<(), DbError> {
        self.insert(item).await.map(|_| ())
    }
}
