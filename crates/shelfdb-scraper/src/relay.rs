//! Single-shot outbound GET, either direct or through the resolved proxy.
//!
//! The proxy choice is fixed when the relay is built: a direct relay's client
//! is constructed with `no_proxy()`, so `HTTP_PROXY`-style environment
//! variables are never consulted and never touched. One relay can be shared by
//! concurrent runs.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use shelfdb_core::AppConfig;

use crate::error::ScraperError;
use crate::proxy::{build_proxy_url, ProxyConfig, ProxyDecision};

/// Served when the URL extension gives no hint.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone)]
pub struct RelayOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl RelayOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.scraper_request_timeout_secs,
            user_agent: config.scraper_user_agent.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedAsset {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct FetchRelay {
    client: Client,
    proxy_used: bool,
}

impl FetchRelay {
    /// Builds a relay honouring `decision`.
    ///
    /// A proxy URL that `reqwest` rejects falls back to a direct client.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(decision: &ProxyDecision, options: &RelayOptions) -> Result<Self, ScraperError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent.as_str());

        let proxy = decision
            .config
            .as_ref()
            .filter(|_| decision.enabled)
            .and_then(|config| match proxy_for(config) {
                Ok(proxy) => Some(proxy),
                Err(_) => {
                    tracing::warn!(
                        proxy_enabled = false,
                        "proxy URL rejected by HTTP client; continuing without proxy"
                    );
                    None
                }
            });

        let proxy_used = proxy.is_some();
        builder = match proxy {
            Some(proxy) => builder.proxy(proxy),
            None => builder.no_proxy(),
        };

        tracing::debug!(proxy_enabled = proxy_used, "fetch relay ready");
        Ok(Self {
            client: builder.build()?,
            proxy_used,
        })
    }

    /// A relay that always connects directly.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the client cannot be constructed.
    pub fn direct(options: &RelayOptions) -> Result<Self, ScraperError> {
        Self::new(
            &ProxyDecision::direct(crate::proxy::ProxyDisabledReason::SwitchOff),
            options,
        )
    }

    #[must_use]
    pub fn proxy_used(&self) -> bool {
        self.proxy_used
    }

    /// Performs exactly one GET against `url`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `url` is not an absolute http(s) URL.
    /// - [`ScraperError::UpstreamStatus`] for any non-2xx response.
    /// - [`ScraperError::Http`] for transport failures.
    pub async fn fetch(&self, url: &str) -> Result<RelayedAsset, ScraperError> {
        let target = parse_target(url)?;
        tracing::debug!(url, proxy_enabled = self.proxy_used, "relaying fetch");

        let response = self.client.get(target).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let bytes = response.bytes().await?.to_vec();
        Ok(RelayedAsset {
            bytes,
            content_type: infer_content_type(url),
        })
    }

    /// [`Self::fetch`] followed by JSON decoding of the body.
    ///
    /// # Errors
    ///
    /// Everything [`Self::fetch`] returns, plus [`ScraperError::Deserialize`].
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ScraperError> {
        let asset = self.fetch(url).await?;
        serde_json::from_slice(&asset.bytes).map_err(|e| ScraperError::Deserialize {
            context: url.to_owned(),
            source: e,
        })
    }
}

fn proxy_for(config: &ProxyConfig) -> Result<reqwest::Proxy, reqwest::Error> {
    let proxy = reqwest::Proxy::all(build_proxy_url(config))?;
    // reqwest only lifts userinfo into Proxy-Authorization when a password is present.
    Ok(match (&config.username, &config.password) {
        (Some(user), None) => proxy.basic_auth(user, ""),
        _ => proxy,
    })
}

fn parse_target(url: &str) -> Result<Url, ScraperError> {
    let parsed = Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Guesses a MIME type from the URL path's extension, ignoring query and
/// fragment. Falls back to [`DEFAULT_CONTENT_TYPE`].
#[must_use]
pub fn infer_content_type(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    let Some((_, ext)) = file.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE;
    };

    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "bmp" => "image/bmp",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
