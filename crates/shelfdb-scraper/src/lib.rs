pub mod adapters;
pub mod error;
pub mod normalize;
pub mod parse;
pub mod proxy;
pub(crate) mod rate_limit;
pub mod relay;
pub mod types;

pub use adapters::{AdapterOptions, AdapterRegistry, JsonFeedAdapter, ShopifyAdapter, SiteAdapter};
pub use error::ScraperError;
pub use normalize::{normalize_product, refreshed_fields, RefreshedFields};
pub use parse::parse_price;
pub use proxy::{build_proxy_url, resolve, ProxyConfig, ProxyDecision, ProxyDisabledReason};
pub use relay::{infer_content_type, FetchRelay, RelayOptions, RelayedAsset, DEFAULT_CONTENT_TYPE};
