use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use vitrine_core::NormalizedProduct;
use vitrine_nuvemshop::{normalize_products, StoreCredentials};

use crate::middleware::RequestId;

use super::{map_upstream_error, ApiError, AppState};

const DEFAULT_PAGE: &str = "1";
const DEFAULT_PER_PAGE: &str = "30";

/// Query parameters are taken as strings and forwarded as-is (trimmed):
/// the upstream API validates its own pagination window, and its error
/// payload is more useful to callers than a local 400 would be.
#[derive(Debug, Deserialize)]
pub(super) struct ProductsQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ProductsPayload {
    page: u32,
    per_page: u32,
    count: usize,
    products: Vec<NormalizedProduct>,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<ProductsPayload>, ApiError> {
    let has_user_id = state.config.store_id.is_some();
    let has_token = state.config.access_token.is_some();

    let store = match (&state.config.store_id, &state.config.access_token) {
        (Some(store_id), Some(access_token)) => StoreCredentials {
            store_id: store_id.clone(),
            access_token: access_token.clone(),
        },
        _ => {
            return Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                req_id.0,
                "missing_credentials",
                "store credentials are not configured",
            )
            .with_details(serde_json::json!({
                "has_token": has_token,
                "has_user_id": has_user_id,
            })));
        }
    };

    let page = query.page.as_deref().map_or(DEFAULT_PAGE, str::trim);
    let per_page = query.per_page.as_deref().map_or(DEFAULT_PER_PAGE, str::trim);

    let raw = state
        .nuvemshop
        .list_products(&store, page, per_page)
        .await
        .map_err(|e| map_upstream_error(req_id.0.clone(), &e))?;

    let products = normalize_products(raw);
    tracing::debug!(count = products.len(), page, "normalized catalog page");

    Ok(Json(ProductsPayload {
        page: page.parse().unwrap_or(1),
        per_page: per_page.parse().unwrap_or(30),
        count: products.len(),
        products,
    }))
}
