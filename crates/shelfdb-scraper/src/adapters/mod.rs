//! Site adapters: one implementation per storefront format.
//!
//! The ingestion orchestrator only sees [`SiteAdapter`]. Adapters fetch
//! through a shared [`FetchRelay`](crate::FetchRelay), so whatever proxy
//! decision the relay was built with applies to every list and detail call.

mod json_feed;
mod registry;
mod shopify;

use async_trait::async_trait;
use shelfdb_core::{ProductRecord, ProductRef, RawProduct};

use crate::error::ScraperError;

pub use json_feed::JsonFeedAdapter;
pub use registry::{AdapterOptions, AdapterRegistry};
pub use shopify::ShopifyAdapter;

#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Display name stored as `source_type`.
    fn source_type(&self) -> &str;

    /// Shop label stored as `source_name`.
    fn source_name(&self) -> &str;

    /// Whether this adapter's fetches go through the forward proxy.
    fn proxy_used(&self) -> bool;

    /// Enumerates every candidate listing. Returns the full list or an error;
    /// a partial list is never returned.
    async fn list_products(&self) -> Result<Vec<ProductRef>, ScraperError>;

    async fn fetch_detail(&self, item: &ProductRef) -> Result<RawProduct, ScraperError>;

    /// Rebuilds the reference for a stored record so it can be re-fetched.
    /// `None` when the record lacks the data needed (usually `source_url`).
    fn ref_for(&self, record: &ProductRecord) -> Option<ProductRef>;
}
