//! Postgres-backed [`ProductStore`] over the `products` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shelfdb_core::{NewProduct, ProductPatch, ProductRecord, COPY_MEMO_MARKER};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::store::{BatchSink, ProductFilter, ProductStore};
use crate::DbError;

/// Rows per multi-row `INSERT` inside a bulk transaction. Keeps the bind
/// count (13 per row) well under Postgres' 65 535 parameter limit.
const BULK_CHUNK_ROWS: usize = 1_000;

const PRODUCT_COLUMNS: &str = "id, source_type, source_name, name, price, sale_price, \
     image_url, source_url, asin, is_hidden, is_favorite, memo, original_product_id, \
     created_at, updated_at";

/// Shared `WHERE` clause for `query` and `count`. Binds:
/// `$1` `source_type`, `$2` `source_name`, `$3` name, `$4` match-asin flag,
/// `$5` asin, `$6` favorites-only, `$7` exclude-copies, `$8` copy memo pattern.
const FILTER_WHERE: &str = "WHERE ($1::TEXT IS NULL OR source_type = $1) \
       AND ($2::TEXT IS NULL OR source_name = $2) \
       AND ($3::TEXT IS NULL OR name = $3) \
       AND (NOT $4::BOOLEAN OR asin IS NOT DISTINCT FROM $5::TEXT) \
       AND (NOT $6::BOOLEAN OR is_favorite) \
       AND (NOT $7::BOOLEAN OR (original_product_id IS NULL \
            AND (memo IS NULL OR memo NOT LIKE $8)))";

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub source_type: String,
    pub source_name: String,
    pub name: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub asin: Option<String>,
    pub is_hidden: bool,
    pub is_favorite: bool,
    pub memo: Option<String>,
    pub original_product_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            source_type: row.source_type,
            source_name: row.source_name,
            name: row.name,
            price: row.price,
            sale_price: row.sale_price,
            image_url: row.image_url,
            source_url: row.source_url,
            asin: row.asin,
            is_hidden: row.is_hidden,
            is_favorite: row.is_favorite,
            memo: row.memo,
            original_product_id: row.original_product_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Flattened bind values for [`FILTER_WHERE`].
struct FilterBinds<'a> {
    source_type: Option<&'a str>,
    source_name: Option<&'a str>,
    name: Option<&'a str>,
    match_asin: bool,
    asin: Option<&'a str>,
    favorites_only: bool,
    exclude_copies: bool,
}

impl<'a> FilterBinds<'a> {
    fn from_filter(filter: &'a ProductFilter) -> Self {
        match &filter.identity {
            Some(key) => Self {
                source_type: Some(&key.source_type),
                source_name: Some(&key.source_name),
                name: Some(&key.name),
                match_asin: true,
                asin: key.asin.as_deref(),
                favorites_only: filter.favorites_only,
                exclude_copies: filter.exclude_manual_copies,
            },
            None => Self {
                source_type: filter.source_type.as_deref(),
                source_name: filter.source_name.as_deref(),
                name: None,
                match_asin: false,
                asin: None,
                favorites_only: filter.favorites_only,
                exclude_copies: filter.exclude_manual_copies,
            },
        }
    }
}

fn copy_memo_pattern() -> String {
    format!("{COPY_MEMO_MARKER}%")
}

#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn query(&self, filter: &ProductFilter) -> Result<Vec<ProductRecord>, DbError> {
        let binds = FilterBinds::from_filter(filter);
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products {FILTER_WHERE} \
             ORDER BY created_at ASC, id ASC \
             LIMIT $9"
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(binds.source_type)
            .bind(binds.source_name)
            .bind(binds.name)
            .bind(binds.match_asin)
            .bind(binds.asin)
            .bind(binds.favorites_only)
            .bind(binds.exclude_copies)
            .bind(copy_memo_pattern())
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }

    async fn insert(&self, product: &NewProduct) -> Result<ProductRecord, DbError> {
        let sql = format!(
            "INSERT INTO products \
                 (source_type, source_name, name, price, sale_price, image_url, source_url, \
                  asin, is_hidden, is_favorite, memo, original_product_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, \
                     $8, $9, $10, $11, $12, COALESCE($13, NOW()), COALESCE($13, NOW())) \
             RETURNING {PRODUCT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&product.source_type)
            .bind(&product.source_name)
            .bind(&product.name)
            .bind(product.price)
            .bind(product.sale_price)
            .bind(&product.image_url)
            .bind(&product.source_url)
            .bind(&product.asin)
            .bind(product.is_hidden)
            .bind(product.is_favorite)
            .bind(&product.memo)
            .bind(product.original_product_id)
            .bind(product.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, patch: &ProductPatch) -> Result<bool, DbError> {
        // Nullable columns carry a "touch" flag so `Some(None)` can clear them.
        let rows_affected = sqlx::query(
            "UPDATE products SET \
                 price       = COALESCE($2, price), \
                 sale_price  = CASE WHEN $3 THEN $4 ELSE sale_price END, \
                 image_url   = CASE WHEN $5 THEN $6 ELSE image_url END, \
                 is_hidden   = COALESCE($7, is_hidden), \
                 is_favorite = COALESCE($8, is_favorite), \
                 memo        = CASE WHEN $9 THEN $10 ELSE memo END, \
                 updated_at  = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(patch.price)
        .bind(patch.sale_price.is_some())
        .bind(patch.sale_price.flatten())
        .bind(patch.image_url.is_some())
        .bind(patch.image_url.clone().flatten())
        .bind(patch.is_hidden)
        .bind(patch.is_favorite)
        .bind(patch.memo.is_some())
        .bind(patch.memo.clone().flatten())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<u64, DbError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let rows_affected = sqlx::query("DELETE FROM products WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, DbError> {
        let binds = FilterBinds::from_filter(filter);
        let sql = format!("SELECT COUNT(*) FROM products {FILTER_WHERE}");

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(binds.source_type)
            .bind(binds.source_name)
            .bind(binds.name)
            .bind(binds.match_asin)
            .bind(binds.asin)
            .bind(binds.favorites_only)
            .bind(binds.exclude_copies)
            .bind(copy_memo_pattern())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), DbError> {
        crate::health_check(&self.pool).await
    }
}

#[async_trait]
impl BatchSink<NewProduct> for PgProductStore {
    /// Inserts every item inside one transaction. Any failing chunk rolls the
    /// whole call back.
    async fn insert_bulk(&self, items: &[NewProduct]) -> Result<u64, DbError> {
        if items.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted: u64 = 0;

        for chunk in items.chunks(BULK_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO products \
                     (source_type, source_name, name, price, sale_price, image_url, source_url, \
                      asin, is_hidden, is_favorite, memo, original_product_id, created_at) ",
            );
            builder.push_values(chunk, |mut row, product| {
                row.push_bind(&product.source_type)
                    .push_bind(&product.source_name)
                    .push_bind(&product.name)
                    .push_bind(product.price)
                    .push_bind(product.sale_price)
                    .push_bind(&product.image_url)
                    .push_bind(&product.source_url)
                    .push_bind(&product.asin)
                    .push_bind(product.is_hidden)
                    .push_bind(product.is_favorite)
                    .push_bind(&product.memo)
                    .push_bind(product.original_product_id)
                    .push_bind(product.created_at.unwrap_or_else(Utc::now));
            });

            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        tracing::debug!(rows = inserted, "bulk insert committed");
        Ok(inserted)
    }

    async fn insert_one(&self, item: &NewProduct) -> Result<(), DbError> {
        self.insert(item).await.map(|_| ())
    }
}
