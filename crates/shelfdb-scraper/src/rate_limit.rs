//! Retry helper for adapter list fetches.
//!
//! The relay itself performs exactly one attempt per call; adapters that want
//! resilience against rate limiting wrap their calls in [`retry_with_backoff`].

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for transient conditions worth retrying after a delay.
///
/// Retriable: HTTP 429 and 5xx from upstream, connect failures and timeouts.
/// Everything else (404, bad JSON, normalization, invalid URLs, the
/// pagination guard) is returned immediately.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::UpstreamStatus { status, .. } => *status == 429 || *status >= 500,
        ScraperError::Http(e) => e.is_timeout() || e.is_connect(),
        ScraperError::Deserialize { .. }
        | ScraperError::Normalization { .. }
        | ScraperError::PaginationLimit { .. }
        | ScraperError::InvalidUrl { .. } => false,
    }
}

/// Executes `operation`, retrying transient errors up to `max_retries` more
/// times.
///
/// The wait before retry `n` (1-based) is `backoff_base_secs * 2^(n-1)`
/// seconds with ±25 % jitter, capped at 60 s. With `max_retries = 3` the
/// operation runs at most 4 times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;

                let computed = backoff_base_secs
                    .saturating_mul(1_000)
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient fetch error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
