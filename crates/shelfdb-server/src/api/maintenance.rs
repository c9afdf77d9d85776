use axum::{body::Bytes, extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use shelfdb_core::DedupOutcome;

use crate::middleware::RequestId;

use super::{optional_json, run_status, ApiError, AppState, RunResponse};

#[derive(Debug, Default, Deserialize)]
pub(super) struct DedupRequest {
    /// Restricts the pass to one `source_name`.
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DedupData {
    deleted_count: u64,
    duplicate_groups: usize,
    errors: Vec<String>,
}

impl From<DedupOutcome> for DedupData {
    fn from(outcome: DedupOutcome) -> Self {
        Self {
            deleted_count: outcome.deleted_count,
            duplicate_groups: outcome.groups_processed,
            errors: outcome.errors,
        }
    }
}

pub(super) async fn deduplicate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<(StatusCode, Json<RunResponse<DedupData>>), ApiError> {
    let request: DedupRequest = optional_json(&req_id.0, &body)?;
    let scope = request.scope.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let outcome = shelfdb_ingest::deduplicate(state.store.as_ref(), scope).await;
    let success = outcome.succeeded();

    Ok((
        run_status(success),
        Json(RunResponse {
            success,
            message: None,
            data: outcome.into(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_data_uses_camel_case() {
        let json = serde_json::to_value(DedupData::from(DedupOutcome::default())).unwrap();
        assert_eq!(json["deletedCount"], 0);
        assert_eq!(json["duplicateGroups"], 0);
        assert!(json["errors"].as_array().unwrap().is_empty());
    }
}
