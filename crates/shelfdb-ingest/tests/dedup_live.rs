//! Maintenance dedup against a real `PgProductStore`.
//!
//! Needs `DATABASE_URL`; run with `cargo test -p shelfdb-ingest -- --ignored`.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use shelfdb_core::{DedupOutcome, NewProduct};
use shelfdb_db::{PgProductStore, ProductFilter, ProductStore};
use shelfdb_ingest::deduplicate;

fn listing(hours: i64) -> NewProduct {
    let base = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    NewProduct {
        source_type: "Amazon".to_owned(),
        source_name: "Beauty Select".to_owned(),
        name: "Hyaluronic Serum".to_owned(),
        price: Decimal::new(2_480, 0),
        sale_price: None,
        image_url: None,
        source_url: None,
        asin: Some("B0SERUM01".to_owned()),
        is_hidden: false,
        is_favorite: false,
        memo: None,
        original_product_id: None,
        created_at: Some(base + Duration::hours(hours)),
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn copy_of_deleted_duplicate_survives_repeated_passes(pool: sqlx::PgPool) {
    let store = PgProductStore::new(pool);
    let oldest = store.insert(&listing(1)).await.expect("insert oldest");
    let newer = store.insert(&listing(2)).await.expect("insert newer");

    let mut copy = listing(3);
    copy.original_product_id = Some(newer.id);
    let copy = store.insert(&copy).await.expect("insert copy");

    let first = deduplicate(&store, None).await;
    assert_eq!(
        first,
        DedupOutcome {
            deleted_count: 1,
            groups_processed: 1,
            errors: vec![],
        }
    );

    let second = deduplicate(&store, None).await;
    assert_eq!(second, DedupOutcome::default());

    let remaining: Vec<i64> = store
        .query(&ProductFilter::default())
        .await
        .expect("query failed")
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(remaining, vec![oldest.id, copy.id]);
}
