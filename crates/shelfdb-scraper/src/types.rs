//! Wire types for the storefront formats the adapters understand.
//!
//! ### Shopify `products.json`
//! List pages return `{"products": [...]}`; an empty array marks the end of
//! the catalog. `compare_at_price` is `null` when the variant is not
//! discounted, otherwise a decimal string above `price`.
//!
//! ### Listing feeds
//! `{"items": [{"id", "url", "asin"?}]}` where each `url` serves a detail
//! document `{"name", "price", "sale_price"?, "image_url"?, "asin"?}`.
//! Prices arrive either as JSON numbers or as display strings.

use serde::Deserialize;

/// `GET /products.json?limit=&page=`
#[derive(Debug, Deserialize)]
pub struct ShopifyProductsPage {
    pub products: Vec<ShopifyListing>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyListing {
    pub handle: String,
}

/// `GET /products/{handle}.json`
#[derive(Debug, Deserialize)]
pub struct ShopifyProductEnvelope {
    pub product: ShopifyProduct,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyProduct {
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub variants: Vec<ShopifyVariant>,
    #[serde(default)]
    pub image: Option<ShopifyImage>,
    #[serde(default)]
    pub images: Vec<ShopifyImage>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyVariant {
    pub price: String,
    #[serde(default)]
    pub compare_at_price: Option<String>,
    /// `1` for the storefront-default variant.
    #[serde(default)]
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyImage {
    pub src: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedListing {
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
pub struct FeedItem {
    pub id: serde_json::Value,
    pub url: String,
    #[serde(default)]
    pub asin: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedDetail {
    pub name: String,
    pub price: serde_json::Value,
    #[serde(default)]
    pub sale_price: Option<serde_json::Value>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub asin: Option<String>,
}

/// Renders a JSON scalar as display text. `null` becomes an empty string.
#[must_use]
pub fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
