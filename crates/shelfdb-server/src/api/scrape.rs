use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use shelfdb_core::{ScrapeResult, TargetedResult};

use crate::middleware::RequestId;

use super::{optional_json, run_status, ApiError, AppState, RunResponse};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ScrapeRequest {
    /// Accepted for compatibility with browser-driven scrapers. HTTP adapters
    /// ignore it.
    #[serde(default)]
    pub headless: Option<bool>,
    /// Upper bound on the whole run, in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ScrapeData {
    total_products: usize,
    saved_products: usize,
    skipped_products: usize,
    proxy_used: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

impl From<ScrapeResult> for ScrapeData {
    fn from(result: ScrapeResult) -> Self {
        Self {
            total_products: result.total_found,
            saved_products: result.saved_count,
            skipped_products: result.skipped_count,
            proxy_used: result.proxy_used,
            errors: result.errors,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FavoritesData {
    total: usize,
    updated: usize,
    failed: usize,
    proxy_used: bool,
    results: Vec<FavoriteItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct FavoriteItem {
    id: i64,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<TargetedResult> for FavoritesData {
    fn from(result: TargetedResult) -> Self {
        Self {
            total: result.total,
            updated: result.updated_count,
            failed: result.failed_count,
            proxy_used: result.proxy_used,
            results: result
                .results
                .into_iter()
                .map(|r| FavoriteItem {
                    id: r.item_id,
                    success: r.success,
                    error: r.error,
                })
                .collect(),
            errors: result.errors,
        }
    }
}

pub(super) async fn scrape_source(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(source): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<RunResponse<ScrapeData>>), ApiError> {
    let request: ScrapeRequest = optional_json(&req_id.0, &body)?;
    let adapter = state.registry.by_slug(&source).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "not_found",
            format!("unknown source '{source}'"),
        )
    })?;
    if request.headless.is_some() {
        tracing::debug!(source = %source, "ignoring headless flag for HTTP adapter");
    }

    let run = shelfdb_ingest::run_full_catalog(
        state.store.as_ref(),
        adapter.as_ref(),
        &state.scrape_options,
    );
    let result = match request.timeout.filter(|secs| *secs > 0) {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
            .await
            .map_err(|_| {
                tracing::warn!(source = %source, timeout_secs = secs, "scrape run timed out");
                ApiError::new(
                    req_id.0.clone(),
                    "timeout",
                    format!(
                        "scrape of '{source}' exceeded {secs}s; outcome unknown, run maintenance dedup to reconcile"
                    ),
                )
            })?,
        None => run.await,
    };

    let message = if result.success {
        format!(
            "{}: saved {} of {} products ({} already stored)",
            adapter.source_type(),
            result.saved_count,
            result.total_found,
            result.skipped_count
        )
    } else {
        format!("{}: scrape failed", adapter.source_type())
    };

    Ok((
        run_status(result.success),
        Json(RunResponse {
            success: result.success,
            message: Some(message),
            data: result.into(),
        }),
    ))
}

pub(super) async fn refresh_favorites(
    State(state): State<AppState>,
) -> (StatusCode, Json<RunResponse<FavoritesData>>) {
    let result = shelfdb_ingest::refresh_favorites(
        state.store.as_ref(),
        &state.registry,
        &state.scrape_options,
    )
    .await;

    let message = format!(
        "refreshed {} of {} favorites",
        result.updated_count, result.total
    );
    (
        run_status(result.success),
        Json(RunResponse {
            success: result.success,
            message: Some(message),
            data: result.into(),
        }),
    )
}
