use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use shelfdb_core::ProductRecord;
use shelfdb_db::ProductFilter;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub source_type: Option<String>,
    pub source_name: Option<String>,
    #[serde(default)]
    pub favorites: bool,
    pub limit: Option<i64>,
}

impl ProductQuery {
    fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            source_type: self.source_type.clone(),
            source_name: self.source_name.clone(),
            favorites_only: self.favorites,
            limit: Some(normalize_limit(self.limit)),
            ..ProductFilter::default()
        }
    }
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<ProductRecord>>>, ApiError> {
    let data = state
        .store
        .query(&query.to_filter())
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
