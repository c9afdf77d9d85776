//! Tiered restore into `MemoryProductStore`.

use std::time::Duration;

use rust_decimal::Decimal;
use shelfdb_core::{BatchTier, NewProduct};
use shelfdb_db::{MemoryProductStore, ProductFilter, ProductStore};
use shelfdb_ingest::{deduplicate, parse_backup, restore, BatchConfig};

fn product(i: usize) -> NewProduct {
    NewProduct {
        source_type: "Amazon".to_owned(),
        source_name: "Beauty Select".to_owned(),
        name: format!("Product {i}"),
        price: Decimal::new(1_000 + i64::try_from(i).unwrap(), 0),
        sale_price: None,
        image_url: None,
        source_url: None,
        asin: Some(format!("B{i:09}")),
        is_hidden: false,
        is_favorite: false,
        memo: None,
        original_product_id: None,
        created_at: None,
    }
}

fn config() -> BatchConfig {
    BatchConfig {
        batch_size: 100,
        batch_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn second_batch_failure_recovers_all_but_bad_rows() {
    let store = MemoryProductStore::new();
    store.reject_inserts_named("Product 120");
    store.reject_inserts_named("Product 175");
    let items: Vec<NewProduct> = (0..250).map(product).collect();

    let outcome = restore(&store, &items, &config()).await;

    // Batches 1 and 3 land in bulk (150); batch 2 recovers 98 of 100.
    assert_eq!(outcome.inserted_count, 248);
    assert_eq!(outcome.failed_batches, 1);
    assert_eq!(outcome.tier_reached, BatchTier::Individual);
    assert_eq!(outcome.errors.len(), 2);
    assert!(outcome.errors[0].contains("Product 120"));
    assert!(outcome.errors[1].contains("Product 175"));
    assert_eq!(store.count(&ProductFilter::default()).await.unwrap(), 248);
}

#[tokio::test]
async fn clean_restore_uses_single_bulk_call() {
    let store = MemoryProductStore::new();
    let items: Vec<NewProduct> = (0..30).map(product).collect();

    let outcome = restore(&store, &items, &config()).await;

    assert_eq!(outcome.inserted_count, 30);
    assert_eq!(outcome.tier_reached, BatchTier::Bulk);
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn restored_history_dedups_to_oldest_row() {
    let backup = r#"[
        {"source_type": "DHC", "source_name": "DHC Online Shop", "name": "Lip Cream",
         "price": "770", "created_at": "2025-01-05T00:00:00Z", "memo": "newer"},
        {"source_type": "DHC", "source_name": "DHC Online Shop", "name": "Lip Cream",
         "price": "700", "created_at": "2024-12-01T00:00:00Z", "memo": "older"}
    ]"#;
    let store = MemoryProductStore::new();
    let items = parse_backup(backup).unwrap();

    restore(&store, &items, &config()).await;
    let outcome = deduplicate(&store, None).await;

    assert_eq!(outcome.deleted_count, 1);
    let survivors = store.records();
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].memo.as_deref(), Some("older"));
}
