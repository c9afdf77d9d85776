use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Memo prefix written by the UI when a user duplicates a listing by hand.
pub const COPY_MEMO_MARKER: &str = "[copy]";

/// The fields that define "the same logical product".
///
/// Comparison is exact and case-sensitive. A `None` ASIN only ever matches
/// another `None`, never a concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub source_type: String,
    pub source_name: String,
    pub name: String,
    pub asin: Option<String>,
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.source_type,
            self.source_name,
            self.name,
            self.asin.as_deref().unwrap_or("null")
        )
    }
}

/// A product listing as persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    /// Site or marketplace the listing came from (e.g. `"DHC"`).
    pub source_type: String,
    /// Shop or store label within that site.
    pub source_name: String,
    pub name: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    /// External marketplace identifier, when the source has one.
    pub asin: Option<String>,
    pub is_hidden: bool,
    pub is_favorite: bool,
    pub memo: Option<String>,
    /// Back-reference set on manual copies of another record.
    pub original_product_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRecord {
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            source_type: self.source_type.clone(),
            source_name: self.source_name.clone(),
            name: self.name.clone(),
            asin: self.asin.clone(),
        }
    }

    /// Returns `true` for records a user copied by hand. These never take
    /// part in duplicate grouping.
    #[must_use]
    pub fn is_manual_copy(&self) -> bool {
        self.original_product_id.is_some()
            || self
                .memo
                .as_deref()
                .is_some_and(|m| m.starts_with(COPY_MEMO_MARKER))
    }
}

/// A product ready to be inserted. The store assigns `id` and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub source_type: String,
    pub source_name: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub original_product_id: Option<i64>,
    /// Preserved by restore tooling so maintenance dedup keeps the
    /// historically oldest row. `None` means "now".
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewProduct {
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            source_type: self.source_type.clone(),
            source_name: self.source_name.clone(),
            name: self.name.clone(),
            asin: self.asin.clone(),
        }
    }
}

/// Partial update applied by `update(id, patch)`.
///
/// Outer `None` leaves a column untouched; `Some(None)` clears a nullable one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub price: Option<Decimal>,
    pub sale_price: Option<Option<Decimal>>,
    pub image_url: Option<Option<String>>,
    pub is_hidden: Option<bool>,
    pub is_favorite: Option<bool>,
    pub memo: Option<Option<String>>,
}

/// A candidate listing discovered by a site adapter, before its detail page
/// has been fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Adapter-specific identifier (a handle, an item id, ...).
    pub id: String,
    pub url: String,
    pub asin: Option<String>,
}

/// Product data exactly as a site adapter extracted it. Prices are still
/// display strings at this point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProduct {
    pub name: String,
    pub price: String,
    pub sale_price: Option<String>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub asin: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(asin: Option<&str>) -> ProductRecord {
        let now = Utc::now();
        ProductRecord {
            id: 1,
            source_type: "DHC".to_string(),
            source_name: "DHC Online".to_string(),
            name: "Deep Cleansing Oil".to_string(),
            price: Decimal::new(2_970, 0),
            sale_price: None,
            image_url: None,
            source_url: Some("https://www.dhc.co.jp/goods/1".to_string()),
            asin: asin.map(str::to_string),
            is_hidden: false,
            is_favorite: false,
            memo: None,
            original_product_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn identity_key_distinguishes_null_asin_from_value() {
        let with_asin = make_record(Some("B000123")).identity_key();
        let without = make_record(None).identity_key();
        assert_ne!(with_asin, without);
        assert_eq!(without, make_record(None).identity_key());
    }

    #[test]
    fn identity_key_is_case_sensitive() {
        let a = make_record(None);
        let mut b = make_record(None);
        b.name = "deep cleansing oil".to_string();
        assert_ne!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn identity_key_does_not_collide_on_separator() {
        let mut a = make_record(None);
        a.source_name = "Shop-A".to_string();
        a.name = "Oil".to_string();
        let mut b = make_record(None);
        b.source_name = "Shop".to_string();
        b.name = "A-Oil".to_string();
        assert_ne!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn manual_copy_detected_by_back_reference() {
        let mut record = make_record(None);
        assert!(!record.is_manual_copy());
        record.original_product_id = Some(7);
        assert!(record.is_manual_copy());
    }

    #[test]
    fn manual_copy_detected_by_memo_marker() {
        let mut record = make_record(None);
        record.memo = Some("[copy] for the spring campaign".to_string());
        assert!(record.is_manual_copy());
        record.memo = Some("not a [copy]".to_string());
        assert!(!record.is_manual_copy());
    }

    #[test]
    fn new_product_identity_matches_stored_record() {
        let record = make_record(Some("B0001"));
        let candidate = NewProduct {
            source_type: record.source_type.clone(),
            source_name: record.source_name.clone(),
            name: record.name.clone(),
            price: Decimal::ONE,
            sale_price: None,
            image_url: None,
            source_url: None,
            asin: Some("B0001".to_string()),
            is_hidden: false,
            is_favorite: false,
            memo: None,
            original_product_id: None,
            created_at: None,
        };
        assert_eq!(candidate.identity_key(), record.identity_key());
    }

    #[test]
    fn new_product_deserializes_with_defaults() {
        let json = r#"{
            "source_type": "DHC",
            "source_name": "DHC Online",
            "name": "Lip Cream",
            "price": "880"
        }"#;
        let product: NewProduct = serde_json::from_str(json).expect("valid product json");
        assert_eq!(product.price, Decimal::new(880, 0));
        assert!(!product.is_favorite);
        assert!(product.created_at.is_none());
    }
}
