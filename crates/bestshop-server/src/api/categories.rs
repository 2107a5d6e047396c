use axum::{extract::State, Extension, Json};
use bestshop_core::CategoryConfig;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<CategoryConfig>>> {
    Json(ApiResponse {
        data: state.categories.categories.clone(),
        meta: ResponseMeta::new(req_id.0),
    })
}
