use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Extension,
};
use serde::Deserialize;
use shelfdb_scraper::ScraperError;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct RelayQuery {
    pub url: Option<String>,
}

/// Fetches `url` through the process-wide relay and streams the bytes back
/// with an inferred `Content-Type`.
pub(super) async fn relay_asset(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RelayQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "bad_request", "missing url parameter"))?;

    match state.relay.fetch(url).await {
        Ok(asset) => Ok(([(header::CONTENT_TYPE, asset.content_type)], asset.bytes)),
        Err(e) => Err(map_relay_error(req_id.0, &e)),
    }
}

fn map_relay_error(request_id: String, error: &ScraperError) -> ApiError {
    match error {
        ScraperError::InvalidUrl { .. } => {
            ApiError::new(request_id, "bad_request", error.to_string())
        }
        ScraperError::UpstreamStatus { status, .. } => {
            tracing::warn!(status, error = %error, "relay upstream error");
            ApiError::new(
                request_id,
                "bad_gateway",
                format!("upstream responded with HTTP {status}"),
            )
        }
        _ => {
            tracing::warn!(error = %error, "relay fetch failed");
            ApiError::new(request_id, "bad_gateway", "upstream fetch failed")
        }
    }
}
