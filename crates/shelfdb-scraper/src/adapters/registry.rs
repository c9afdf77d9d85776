use std::sync::Arc;

use shelfdb_core::{AdapterKind, AppConfig, SourceConfig, SourcesFile};

use super::{JsonFeedAdapter, ShopifyAdapter, SiteAdapter};
use crate::error::ScraperError;
use crate::relay::FetchRelay;

/// Retry and pacing knobs shared by every adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterOptions {
    pub max_retries: u32,
    pub backoff_base_secs: u64,
    /// Pause between list pages.
    pub page_delay_ms: u64,
}

impl AdapterOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_retries: config.scraper_max_retries,
            backoff_base_secs: config.scraper_retry_backoff_base_secs,
            page_delay_ms: config.scraper_inter_request_delay_ms,
        }
    }
}

struct Entry {
    slug: String,
    adapter: Arc<dyn SiteAdapter>,
}

/// Adapters keyed by source slug, in configuration order.
#[derive(Default)]
pub struct AdapterRegistry {
    entries: Vec<Entry>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| &e.slug))
            .finish()
    }
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one adapter per configured source, all sharing `relay`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if a source URL cannot be used by
    /// its adapter.
    pub fn from_sources(
        sources: &SourcesFile,
        relay: &Arc<FetchRelay>,
        options: AdapterOptions,
    ) -> Result<Self, ScraperError> {
        let mut registry = Self::new();
        for source in &sources.sources {
            registry.register(source.slug(), build_adapter(source, relay, options)?);
        }
        Ok(registry)
    }

    /// Adds `adapter` under `slug`, replacing any adapter already registered
    /// under that slug.
    pub fn register(&mut self, slug: impl Into<String>, adapter: Arc<dyn SiteAdapter>) {
        let slug = slug.into();
        self.entries.retain(|e| e.slug != slug);
        self.entries.push(Entry { slug, adapter });
    }

    #[must_use]
    pub fn by_slug(&self, slug: &str) -> Option<Arc<dyn SiteAdapter>> {
        self.entries
            .iter()
            .find(|e| e.slug == slug)
            .map(|e| Arc::clone(&e.adapter))
    }

    #[must_use]
    pub fn by_source(&self, source_type: &str, source_name: &str) -> Option<Arc<dyn SiteAdapter>> {
        self.entries
            .iter()
            .find(|e| e.adapter.source_type() == source_type && e.adapter.source_name() == source_name)
            .map(|e| Arc::clone(&e.adapter))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn SiteAdapter>)> {
        self.entries.iter().map(|e| (e.slug.as_str(), &e.adapter))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn build_adapter(
    source: &SourceConfig,
    relay: &Arc<FetchRelay>,
    options: AdapterOptions,
) -> Result<Arc<dyn SiteAdapter>, ScraperError> {
    Ok(match source.adapter {
        AdapterKind::Shopify => Arc::new(ShopifyAdapter::new(source, Arc::clone(relay), options)?),
        AdapterKind::JsonFeed => {
            Arc::new(JsonFeedAdapter::new(source, Arc::clone(relay), options)?)
        }
    })
}
