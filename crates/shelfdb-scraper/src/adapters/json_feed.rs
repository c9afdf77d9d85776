//! Marketplace listing feeds: one index document plus one detail document per
//! item. This is the source kind that carries ASINs.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use shelfdb_core::{ProductRecord, ProductRef, RawProduct, SourceConfig};

use super::{AdapterOptions, SiteAdapter};
use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;
use crate::relay::FetchRelay;
use crate::types::{scalar_text, FeedDetail, FeedListing};

pub struct JsonFeedAdapter {
    source_type: String,
    source_name: String,
    feed_url: Url,
    relay: Arc<FetchRelay>,
    options: AdapterOptions,
}

impl JsonFeedAdapter {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if the feed URL does not parse.
    pub fn new(
        source: &SourceConfig,
        relay: Arc<FetchRelay>,
        options: AdapterOptions,
    ) -> Result<Self, ScraperError> {
        let feed_url = Url::parse(&source.url).map_err(|e| ScraperError::InvalidUrl {
            url: source.url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source_type: source.source_type.clone(),
            source_name: source.source_name.clone(),
            feed_url,
            relay,
            options,
        })
    }
}

#[async_trait]
impl SiteAdapter for JsonFeedAdapter {
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
        let relay = &self.relay;
        let feed_url = self.feed_url.as_str();
        let listing: FeedListing = retry_with_backoff(
            self.options.max_retries,
            self.options.backoff_base_secs,
            || async move { relay.fetch_json::<FeedListing>(feed_url).await },
        )
        .await?;

        let refs: Vec<ProductRef> = listing
            .items
            .into_iter()
            .map(|item| {
                // Relative detail URLs resolve against the feed. An unusable
                // one is kept verbatim so its detail fetch fails and the run
                // records it.
                let raw_url = item.url.trim();
                let url = match self.feed_url.join(raw_url) {
                    Ok(url) => url.to_string(),
                    Err(e) => {
                        tracing::debug!(
                            source = %self.source_type,
                            item = %scalar_text(&item.id),
                            error = %e,
                            "feed item url does not resolve"
                        );
                        raw_url.to_owned()
                    }
                };
                ProductRef {
                    id: scalar_text(&item.id),
                    url,
                    asin: clean_asin(item.asin),
                }
            })
            .collect();

        Ok(refs)
    }

    async fn fetch_detail(&self, item: &ProductRef) -> Result<RawProduct, ScraperError> {
        let detail: FeedDetail = self.relay.fetch_json(&item.url).await?;

        Ok(RawProduct {
            name: detail.name.trim().to_owned(),
            price: scalar_text(&detail.price),
            sale_price: detail
                .sale_price
                .as_ref()
                .map(scalar_text)
                .filter(|s| !s.trim().is_empty()),
            image_url: detail.image_url,
            source_url: Some(item.url.clone()),
            asin: clean_asin(detail.asin).or_else(|| item.asin.clone()),
        })
    }

    fn ref_for(&self, record: &ProductRecord) -> Option<ProductRef> {
        let url = record.source_url.clone()?;
        Some(ProductRef {
            id: record.asin.clone().unwrap_or_else(|| url.clone()),
            url,
            asin: record.asin.clone(),
        })
    }
}

/// Feeds pad ASINs inconsistently; blank ones mean "none".
fn clean_asin(asin: Option<String>) -> Option<String> {
    asin.map(|a| a.trim().to_owned()).filter(|a| !a.is_empty())
}
