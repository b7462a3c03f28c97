use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use vitrine_nuvemshop::{AppCredentials, NuvemshopError, TokenGrant};

use crate::middleware::RequestId;

use super::{map_upstream_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CallbackQuery {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CallbackPayload {
    success: bool,
    access_token: Option<String>,
    /// The full grant as returned by the platform, for clients that need
    /// `user_id`, `scope`, or future fields.
    data: TokenGrant,
}

pub(super) async fn oauth_callback(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<CallbackPayload>, ApiError> {
    let Some(code) = query.code.filter(|c| !c.trim().is_empty()) else {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            req_id.0,
            "missing_code",
            "the code query parameter is required",
        ));
    };

    let app = match (
        &state.config.app_id,
        &state.config.client_secret,
        &state.config.redirect_uri,
    ) {
        (Some(client_id), Some(client_secret), Some(redirect_uri)) => AppCredentials {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
            redirect_uri: redirect_uri.clone(),
        },
        _ => {
            return Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                req_id.0,
                "missing_credentials",
                "app credentials are not configured",
            ));
        }
    };

    let grant = state
        .nuvemshop
        .exchange_code(&app, code.trim())
        .await
        .map_err(|e| map_token_error(req_id.0.clone(), &e))?;

    Ok(Json(CallbackPayload {
        success: true,
        access_token: grant.access_token.clone(),
        data: grant,
    }))
}

/// Token-endpoint rejections surface as 500 rather than passing the
/// upstream status through: the browser lands here after the install
/// redirect, and any failure is a server-side provisioning problem, not
/// something the end user can correct.
fn map_token_error(request_id: String, error: &NuvemshopError) -> ApiError {
    match error {
        NuvemshopError::UpstreamStatus { details, .. } => {
            tracing::error!(error = %error, "token exchange failed");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                request_id,
                "token_exchange_failed",
                "failed to obtain an access token",
            )
            .with_details(details.clone())
        }
        other => map_upstream_error(request_id, other),
    }
}
