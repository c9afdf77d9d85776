//! Conversion from adapter output ([`RawProduct`]) to an insertable
//! [`NewProduct`]. Price parsing is delegated to [`crate::parse`].

use rust_decimal::Decimal;
use shelfdb_core::{NewProduct, RawProduct};

use crate::error::ScraperError;
use crate::parse::parse_price;

/// Fields refreshed in place by targeted runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedFields {
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub image_url: Option<String>,
}

/// Normalizes `raw`, stamping it with the source's display name and shop
/// label. Identity fields (`name`, `asin`) are kept exactly as the adapter
/// produced them so scraped and restored rows compare equal.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] when the name is blank or the
/// price cannot be parsed.
pub fn normalize_product(
    raw: RawProduct,
    source_type: &str,
    source_name: &str,
) -> Result<NewProduct, ScraperError> {
    let item = item_label(&raw);
    if raw.name.trim().is_empty() {
        return Err(ScraperError::Normalization {
            item,
            reason: "product name is empty".into(),
        });
    }

    let fields = refreshed_fields(&raw)?;

    Ok(NewProduct {
        source_type: source_type.to_owned(),
        source_name: source_name.to_owned(),
        name: raw.name,
        price: fields.price,
        sale_price: fields.sale_price,
        image_url: fields.image_url,
        source_url: non_blank(raw.source_url),
        asin: raw.asin.filter(|a| !a.trim().is_empty()),
        is_hidden: false,
        is_favorite: false,
        memo: None,
        original_product_id: None,
        created_at: None,
    })
}

/// Extracts only the price and image fields from `raw`.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] when the price cannot be parsed.
pub fn refreshed_fields(raw: &RawProduct) -> Result<RefreshedFields, ScraperError> {
    let price = parse_price(&raw.price).ok_or_else(|| ScraperError::Normalization {
        item: item_label(raw),
        reason: format!("unparseable price '{}'", raw.price),
    })?;

    let sale_price = raw.sale_price.as_deref().and_then(|text| {
        let parsed = parse_price(text);
        if parsed.is_none() && !text.trim().is_empty() {
            tracing::debug!(item = %item_label(raw), sale_price = text, "ignoring unparseable sale price");
        }
        parsed
    });

    Ok(RefreshedFields {
        price,
        sale_price,
        image_url: non_blank(raw.image_url.clone()),
    })
}

fn item_label(raw: &RawProduct) -> String {
    raw.source_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or(&raw.name)
        .to_owned()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
