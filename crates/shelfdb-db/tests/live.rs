//! Live integration tests for `PgProductStore` using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database from the sqlx
//! test harness and therefore needs `DATABASE_URL`. Run them with
//! `cargo test -p shelfdb-db -- --ignored`.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use shelfdb_core::{NewProduct, ProductPatch};
use shelfdb_db::{BatchSink, PgProductStore, ProductFilter, ProductStore};

fn new_product(name: &str, asin: Option<&str>) -> NewProduct {
    NewProduct {
        source_type: "DHC".to_string(),
        source_name: "DHC Online Shop".to_string(),
        name: name.to_string(),
        price: Decimal::new(1_650, 0),
        sale_price: None,
        image_url: Some(format!("https://img.example.com/{name}.jpg")),
        source_url: Some(format!("https://dhc.example.com/products/{name}")),
        asin: asin.map(str::to_string),
        is_hidden: false,
        is_favorite: false,
        memo: None,
        original_product_id: None,
        created_at: None,
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn insert_then_query_by_identity(pool: sqlx::PgPool) {
    let store = PgProductStore::new(pool);
    let stored = store
        .insert(&new_product("cleansing-oil", None))
        .await
        .expect("insert failed");

    let found = store
        .query(&ProductFilter::by_identity(stored.identity_key()))
        .await
        .expect("query failed");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, stored.id);

    let mut other_asin = stored.identity_key();
    other_asin.asin = Some("B0NOPE".to_string());
    let count = store
        .count(&ProductFilter::by_identity(other_asin))
        .await
        .expect("count failed");
    assert_eq!(count, 0, "null asin must not match a concrete asin");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn query_orders_oldest_first(pool: sqlx::PgPool) {
    let store = PgProductStore::new(pool);
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    let mut newer = new_product("newer", None);
    newer.created_at = Some(base + Duration::days(1));
    let mut older = new_product("older", None);
    older.created_at = Some(base);
    store.insert(&newer).await.expect("insert newer");
    store.insert(&older).await.expect("insert older");

    let names: Vec<String> = store
        .query(&ProductFilter::default())
        .await
        .expect("query failed")
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["older".to_string(), "newer".to_string()]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn update_clears_nullable_column(pool: sqlx::PgPool) {
    let store = PgProductStore::new(pool);
    let stored = store
        .insert(&new_product("serum", None))
        .await
        .expect("insert failed");

    let patch = ProductPatch {
        price: Some(Decimal::new(1_200, 0)),
        image_url: Some(None),
        ..ProductPatch::default()
    };
    assert!(store.update(stored.id, &patch).await.expect("update failed"));
    assert!(!store.update(stored.id + 1_000, &patch).await.expect("update failed"));

    let refreshed = store
        .query(&ProductFilter::default())
        .await
        .expect("query failed");
    assert_eq!(refreshed[0].price, Decimal::new(1_200, 0));
    assert!(refreshed[0].image_url.is_none());
    assert!(refreshed[0].source_url.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn exclude_copies_skips_marked_rows(pool: sqlx::PgPool) {
    let store = PgProductStore::new(pool);
    let original = store
        .insert(&new_product("toner", None))
        .await
        .expect("insert failed");

    let mut by_reference = new_product("toner", None);
    by_reference.original_product_id = Some(original.id);
    store.insert(&by_reference).await.expect("insert copy");

    let mut by_memo = new_product("toner", None);
    by_memo.memo = Some("[copy] gift set".to_string());
    store.insert(&by_memo).await.expect("insert memo copy");

    let filter = ProductFilter {
        exclude_manual_copies: true,
        ..ProductFilter::default()
    };
    let rows = store.query(&filter).await.expect("query failed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, original.id);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn bulk_insert_and_delete(pool: sqlx::PgPool) {
    let store = PgProductStore::new(pool);
    let items: Vec<NewProduct> = (0..25)
        .map(|i| new_product(&format!("item-{i}"), Some(&format!("B{i:05}"))))
        .collect();

    let inserted = store.insert_bulk(&items).await.expect("bulk insert failed");
    assert_eq!(inserted, 25);

    let rows = store
        .query(&ProductFilter::default())
        .await
        .expect("query failed");
    let ids: Vec<i64> = rows.iter().take(10).map(|r| r.id).collect();
    let deleted = store.delete_by_ids(&ids).await.expect("delete failed");
    assert_eq!(deleted, 10);
    assert_eq!(
        store
            .count(&ProductFilter::default())
            .await
            .expect("count failed"),
        15
    );
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deleting_original_keeps_copy_back_reference(pool: sqlx::PgPool) {
    let store = PgProductStore::new(pool);
    let original = store
        .insert(&new_product("cream", None))
        .await
        .expect("insert original");

    let mut copy = new_product("cream", None);
    copy.original_product_id = Some(original.id);
    let copy = store.insert(&copy).await.expect("insert copy");

    assert_eq!(
        store.delete_by_ids(&[original.id]).await.expect("delete failed"),
        1
    );

    let rows = store
        .query(&ProductFilter::default())
        .await
        .expect("query failed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, copy.id);
    assert_eq!(rows[0].original_product_id, Some(original.id));
    assert!(rows[0].is_manual_copy());
}
