use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use bestshop_core::{evaluate_bag, parse_bag, BagEvaluation, BagRequest, ParsedBag};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn best_shop(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<BagRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BagEvaluation>>, ApiError> {
    let Json(request) = payload
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let parsed = parse_bag(&request.items, &state.categories)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;
    log_skipped(&req_id, &parsed);

    let products = bestshop_db::load_bag_products(&state.pool, &parsed)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let evaluation = evaluate_bag(&state.categories, &products);
    for result in &evaluation.results {
        tracing::debug!(
            request_id = %req_id.0,
            category = %result.category,
            products = result.products.len(),
            shops_ranked = result.shop_totals.len(),
            best_shop = ?result.best_shop,
            "category evaluated"
        );
    }

    Ok(Json(ApiResponse {
        data: evaluation,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn log_skipped(req_id: &RequestId, parsed: &ParsedBag) {
    for skipped in &parsed.skipped {
        tracing::warn!(
            request_id = %req_id.0,
            item_id = %skipped.id,
            category = %skipped.category,
            reason = %skipped.reason,
            "skipping bag item"
        );
    }
}
