mod auth;
mod products;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use vitrine_core::AppConfig;
use vitrine_nuvemshop::{NuvemshopClient, NuvemshopError};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub nuvemshop: Arc<NuvemshopClient>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    /// Upstream diagnostics relayed to the caller, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store_credentials: &'static str,
    app_credentials: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details: None,
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

/// Maps a client error to the response envelope.
///
/// Upstream rejections pass through with their original status and payload
/// (the caller is debugging against the platform, not against us); transport
/// and parse failures surface as 500s with what diagnostics exist.
pub(super) fn map_upstream_error(request_id: String, error: &NuvemshopError) -> ApiError {
    match error {
        NuvemshopError::UpstreamStatus { status, details } => {
            let status =
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
            ApiError::new(
                status,
                request_id,
                "upstream_error",
                "the Nuvemshop API rejected the request",
            )
            .with_details(details.clone())
        }
        NuvemshopError::Deserialize { snippet, .. } => {
            tracing::error!(error = %error, "upstream returned a non-JSON response");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                request_id,
                "invalid_upstream_response",
                "the Nuvemshop API returned a non-JSON response",
            )
            .with_details(serde_json::json!({ "raw": snippet }))
        }
        NuvemshopError::Http(_) | NuvemshopError::InvalidBaseUrl { .. } => {
            tracing::error!(error = %error, "upstream request failed");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                request_id,
                "upstream_unreachable",
                "failed to reach the Nuvemshop API",
            )
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/auth/callback", get(auth::oauth_callback))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let configured = |present: bool| if present { "configured" } else { "missing" };

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData {
                status: "ok",
                store_credentials: configured(
                    state.config.store_id.is_some() && state.config.access_token.is_some(),
                ),
                app_credentials: configured(
                    state.config.app_id.is_some()
                        && state.config.client_secret.is_some()
                        && state.config.redirect_uri.is_some(),
                ),
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_config() -> AppConfig {
        AppConfig {
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "info".to_owned(),
            api_base_url: "https://api.nuvemshop.com.br/v1".to_owned(),
            token_url: "https://www.nuvemshop.com.br/apps/authorize/token".to_owned(),
            request_timeout_secs: 5,
            user_agent: "vitrine-test/0.1".to_owned(),
            store_id: None,
            access_token: None,
            app_id: None,
            client_secret: None,
            redirect_uri: None,
        }
    }

    fn test_app(config: AppConfig) -> Router {
        let nuvemshop = NuvemshopClient::with_base_urls(
            config.request_timeout_secs,
            &config.user_agent,
            &config.api_base_url,
            &config.token_url,
        )
        .expect("client");
        build_app(AppState {
            config: Arc::new(config),
            nuvemshop: Arc::new(nuvemshop),
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    #[tokio::test]
    async fn health_reports_missing_credentials() {
        let app = test_app(test_config());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["store_credentials"], "missing");
        assert_eq!(body["data"]["app_credentials"], "missing");
        assert!(body["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn health_reports_configured_credentials() {
        let mut config = test_config();
        config.store_id = Some("123".to_owned());
        config.access_token = Some("tok".to_owned());
        let app = test_app(config);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        let body = body_json(response).await;
        assert_eq!(body["data"]["store_credentials"], "configured");
        assert_eq!(body["data"]["app_credentials"], "missing");
    }

    #[tokio::test]
    async fn request_id_header_is_echoed() {
        let app = test_app(test_config());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header("x-request-id", "req-test-42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-test-42")
        );
        let body = body_json(response).await;
        assert_eq!(body["meta"]["request_id"], "req-test-42");
    }

    #[tokio::test]
    async fn products_without_credentials_is_500_with_diagnostics() {
        let mut config = test_config();
        config.access_token = Some("tok".to_owned()); // store_id still missing
        let app = test_app(config);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/products")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "missing_credentials");
        assert_eq!(body["error"]["details"]["has_token"], true);
        assert_eq!(body["error"]["details"]["has_user_id"], false);
    }

    #[tokio::test]
    async fn auth_callback_without_code_is_400() {
        let app = test_app(test_config());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/auth/callback")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "missing_code");
    }

    #[tokio::test]
    async fn auth_callback_without_app_credentials_is_500() {
        let app = test_app(test_config());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/auth/callback?code=abc")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "missing_credentials");
    }

    // -----------------------------------------------------------------------
    // End-to-end against a wiremock upstream
    // -----------------------------------------------------------------------

    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Config with store and app credentials set, pointed at the mock server.
    fn upstream_config(server: &MockServer) -> AppConfig {
        let mut config = test_config();
        config.api_base_url = server.uri();
        config.token_url = format!("{}/apps/authorize/token", server.uri());
        config.store_id = Some("777".to_owned());
        config.access_token = Some("tok-777".to_owned());
        config.app_id = Some("4321".to_owned());
        config.client_secret = Some("shh".to_owned());
        config.redirect_uri = Some("https://app.example.com/callback".to_owned());
        config
    }

    #[tokio::test]
    async fn products_endpoint_returns_normalized_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/777/products"))
            .and(query_param("page", "2"))
            .and(query_param("per_page", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&serde_json::json!([{
                "id": 7,
                "name": "Shirt",
                "images": [{"src": "\"https://cdn.example.com/x.jpg\""}],
                "canonical_url": "[https://store.example.com/p/7]",
                "variants": [{"price": 19.9, "inventory_levels": [{"stock": "4"}]}]
            }])))
            .mount(&server)
            .await;

        let app = test_app(upstream_config(&server));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/products?page=2&per_page=5")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["page"], 2);
        assert_eq!(body["per_page"], 5);
        assert_eq!(body["count"], 1);
        assert_eq!(
            body["products"][0],
            serde_json::json!({
                "id": 7,
                "name": "Shirt",
                "price": "19.9",
                "promotional_price": "",
                "image_url": "https://cdn.example.com/x.jpg",
                "url": "https://store.example.com/p/7",
                "stock": 4
            })
        );
    }

    #[tokio::test]
    async fn products_endpoint_defaults_page_window() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/777/products"))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let app = test_app(upstream_config(&server));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/products")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["page"], 1);
        assert_eq!(body["per_page"], 30);
        assert_eq!(body["count"], 0);
        assert_eq!(body["products"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn products_endpoint_passes_upstream_status_through() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/777/products"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                &serde_json::json!({"message": "Unauthorized"}),
            ))
            .mount(&server)
            .await;

        let app = test_app(upstream_config(&server));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/products")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "upstream_error");
        assert_eq!(body["error"]["details"]["message"], "Unauthorized");
    }

    #[tokio::test]
    async fn products_endpoint_maps_non_json_upstream_to_500() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/777/products"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let app = test_app(upstream_config(&server));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/products")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "invalid_upstream_response");
        assert!(body["error"]["details"]["raw"]
            .as_str()
            .is_some_and(|raw| raw.contains("oops")));
    }

    #[tokio::test]
    async fn auth_callback_exchanges_code_end_to_end() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/apps/authorize/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&serde_json::json!({
                "access_token": "tok-999",
                "token_type": "bearer",
                "scope": "read_products",
                "user_id": 777
            })))
            .mount(&server)
            .await;

        let app = test_app(upstream_config(&server));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/auth/callback?code=abc123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["access_token"], "tok-999");
        assert_eq!(body["data"]["user_id"], 777);
        assert_eq!(body["data"]["scope"], "read_products");
    }

    #[tokio::test]
    async fn auth_callback_maps_upstream_rejection_to_500() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/apps/authorize/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                &serde_json::json!({"error": "invalid_grant"}),
            ))
            .mount(&server)
            .await;

        let app = test_app(upstream_config(&server));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/auth/callback?code=expired")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "token_exchange_failed");
        assert_eq!(body["error"]["details"]["error"], "invalid_grant");
    }

    #[test]
    fn map_upstream_error_passes_status_through() {
        let err = NuvemshopError::UpstreamStatus {
            status: 422,
            details: serde_json::json!({"message": "bad per_page"}),
        };
        let api_err = map_upstream_error("req-1".to_owned(), &err);
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn map_upstream_error_unknown_status_becomes_bad_gateway() {
        let err = NuvemshopError::UpstreamStatus {
            status: 99,
            details: serde_json::Value::Null,
        };
        let api_err = map_upstream_error("req-1".to_owned(), &err);
        assert_eq!(api_err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
