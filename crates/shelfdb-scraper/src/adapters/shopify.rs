//! Shopify storefronts via the public `products.json` endpoints.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use shelfdb_core::{ProductRecord, ProductRef, RawProduct, SourceConfig};

use super::{AdapterOptions, SiteAdapter};
use crate::error::ScraperError;
use crate::parse::parse_price;
use crate::rate_limit::retry_with_backoff;
use crate::relay::FetchRelay;
use crate::types::{ShopifyProductEnvelope, ShopifyProductsPage, ShopifyVariant};

/// Guard against storefronts that never return an empty page.
pub(crate) const MAX_PAGES: usize = 200;

const PAGE_LIMIT: u32 = 250;

pub struct ShopifyAdapter {
    source_type: String,
    source_name: String,
    /// `scheme://host[:port]` of the storefront, no trailing slash.
    origin: String,
    relay: Arc<FetchRelay>,
    options: AdapterOptions,
}

impl ShopifyAdapter {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if the source URL has no usable origin.
    pub fn new(
        source: &SourceConfig,
        relay: Arc<FetchRelay>,
        options: AdapterOptions,
    ) -> Result<Self, ScraperError> {
        Ok(Self {
            source_type: source.source_type.clone(),
            source_name: source.source_name.clone(),
            origin: store_origin(&source.url)?,
            relay,
            options,
        })
    }

    fn page_url(&self, page: usize) -> String {
        format!(
            "{}/products.json?limit={PAGE_LIMIT}&page={page}",
            self.origin
        )
    }
}

#[async_trait]
impl SiteAdapter for ShopifyAdapter {
    fn source_type(&self) -> &str {
        &self.source_type
    }

    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn proxy_used(&self) -> bool {
        self.relay.proxy_used()
    }

    async fn list_products(&self) -> Result<Vec<ProductRef>, ScraperError> {
        let mut refs = Vec::new();

        for page in 1..=MAX_PAGES {
            if page > 1 && self.options.page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.options.page_delay_ms)).await;
            }

            let url = self.page_url(page);
            let relay = &self.relay;
            let parsed: ShopifyProductsPage = retry_with_backoff(
                self.options.max_retries,
                self.options.backoff_base_secs,
                || {
                    let url = url.clone();
                    async move { relay.fetch_json::<ShopifyProductsPage>(&url).await }
                },
            )
            .await?;

            if parsed.products.is_empty() {
                tracing::debug!(
                    source = %self.source_type,
                    pages = page - 1,
                    found = refs.len(),
                    "shopify catalog exhausted"
                );
                return Ok(refs);
            }

            refs.extend(parsed.products.into_iter().map(|listing| ProductRef {
                url: format!("{}/products/{}", self.origin, listing.handle),
                id: listing.handle,
                asin: None,
            }));
        }

        Err(ScraperError::PaginationLimit {
            url: self.origin.clone(),
            max_pages: MAX_PAGES,
        })
    }

    async fn fetch_detail(&self, item: &ProductRef) -> Result<RawProduct, ScraperError> {
        let url = format!("{}/products/{}.json", self.origin, item.id);
        let envelope: ShopifyProductEnvelope = self.relay.fetch_json(&url).await?;
        let product = envelope.product;

        let variant =
            default_variant(&product.variants).ok_or_else(|| ScraperError::Normalization {
                item: item.url.clone(),
                reason: format!("product '{}' has no variants", product.handle),
            })?;
        let (price, sale_price) = split_prices(variant);

        let image_url = product
            .image
            .map(|image| image.src)
            .or_else(|| product.images.into_iter().next().map(|image| image.src));

        Ok(RawProduct {
            name: product.title.trim().to_owned(),
            price,
            sale_price,
            image_url,
            source_url: Some(item.url.clone()),
            asin: None,
        })
    }

    fn ref_for(&self, record: &ProductRecord) -> Option<ProductRef> {
        let url = record.source_url.as_deref()?;
        let handle = handle_from_url(url)?;
        Some(ProductRef {
            id: handle.to_owned(),
            url: url.to_owned(),
            asin: record.asin.clone(),
        })
    }
}

/// The position-1 variant is the storefront default; without position data,
/// the first variant.
fn default_variant(variants: &[ShopifyVariant]) -> Option<&ShopifyVariant> {
    variants
        .iter()
        .find(|v| v.position == Some(1))
        .or_else(|| variants.first())
}

/// Returns `(price, sale_price)`. A discounted variant shows its
/// `compare_at_price` as the regular price and its selling price as the sale.
fn split_prices(variant: &ShopifyVariant) -> (String, Option<String>) {
    let selling = parse_price(&variant.price);
    let compare_at = variant.compare_at_price.as_deref().and_then(parse_price);

    match (compare_at, selling) {
        (Some(regular), Some(sale)) if regular > sale => (
            variant.compare_at_price.clone().unwrap_or_default(),
            Some(variant.price.clone()),
        ),
        _ => (variant.price.clone(), None),
    }
}

fn handle_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    let (_, rest) = path.split_once("/products/")?;
    let handle = rest.split('/').next()?.trim_end_matches(".json");
    (!handle.is_empty()).then_some(handle)
}

fn store_origin(shop_url: &str) -> Result<String, ScraperError> {
    let url = Url::parse(shop_url).map_err(|e| ScraperError::InvalidUrl {
        url: shop_url.to_owned(),
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(ScraperError::InvalidUrl {
            url: shop_url.to_owned(),
            reason: "URL has no host".into(),
        });
    }
    Ok(url.origin().ascii_serialization())
}
