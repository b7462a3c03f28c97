//! HTTP client for the Nuvemshop REST API.
//!
//! Wraps `reqwest` with the platform's auth conventions and typed error
//! handling. Two endpoints are covered: the per-store product listing and
//! the OAuth authorization-code exchange.
//!
//! Note the platform's legacy header: catalog reads authenticate with
//! `Authentication: bearer <token>`, not the standard `Authorization`
//! header. This is how the live API behaves, not a typo.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::NuvemshopError;
use crate::types::{RawProduct, TokenGrant};

const DEFAULT_API_BASE_URL: &str = "https://api.nuvemshop.com.br/v1";
const DEFAULT_TOKEN_URL: &str = "https://www.nuvemshop.com.br/apps/authorize/token";

/// Maximum bytes of a non-JSON upstream body echoed into diagnostics.
const BODY_SNIPPET_MAX: usize = 1000;

/// Store-scoped credentials for catalog reads.
#[derive(Debug, Clone)]
pub struct StoreCredentials {
    /// Numeric store ID, used as a path segment.
    pub store_id: String,
    pub access_token: String,
}

/// App-scoped credentials for the OAuth code exchange.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Client for the Nuvemshop REST API.
///
/// Holds the HTTP client and base URLs only; credentials are supplied per
/// call, so one client serves any store. Use [`NuvemshopClient::new`] for
/// production or [`NuvemshopClient::with_base_urls`] to point at a mock
/// server in tests.
pub struct NuvemshopClient {
    client: Client,
    api_base: Url,
    token_url: Url,
}

impl NuvemshopClient {
    /// Creates a new client pointed at the production Nuvemshop API.
    ///
    /// # Errors
    ///
    /// Returns [`NuvemshopError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, NuvemshopError> {
        Self::with_base_urls(
            timeout_secs,
            user_agent,
            DEFAULT_API_BASE_URL,
            DEFAULT_TOKEN_URL,
        )
    }

    /// Creates a new client with custom API and token URLs (for testing
    /// with wiremock, or for the platform's regional domains).
    ///
    /// # Errors
    ///
    /// Returns [`NuvemshopError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`NuvemshopError::InvalidBaseUrl`] if
    /// either URL does not parse.
    pub fn with_base_urls(
        timeout_secs: u64,
        user_agent: &str,
        api_base_url: &str,
        token_url: &str,
    ) -> Result<Self, NuvemshopError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join appends the store segment rather than replacing the last
        // path segment.
        let normalised = format!("{}/", api_base_url.trim_end_matches('/'));
        let api_base = Url::parse(&normalised).map_err(|e| NuvemshopError::InvalidBaseUrl {
            url: api_base_url.to_owned(),
            reason: e.to_string(),
        })?;
        let token_url = Url::parse(token_url).map_err(|e| NuvemshopError::InvalidBaseUrl {
            url: token_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_base,
            token_url,
        })
    }

    /// Fetches one page of the store's product catalog.
    ///
    /// `page` and `per_page` are forwarded as given (trimmed); the upstream
    /// API does its own validation and reports bad values in its error
    /// payload, which this method relays.
    ///
    /// A 2xx response whose body is JSON but not an array yields an empty
    /// list, as observed when a store has no products at all.
    ///
    /// # Errors
    ///
    /// - [`NuvemshopError::UpstreamStatus`] — non-2xx status; carries the
    ///   parsed upstream error payload.
    /// - [`NuvemshopError::Deserialize`] — body is not valid JSON, or an
    ///   array that does not match the expected record shape.
    /// - [`NuvemshopError::Http`] — network or TLS failure.
    pub async fn list_products(
        &self,
        store: &StoreCredentials,
        page: &str,
        per_page: &str,
    ) -> Result<Vec<RawProduct>, NuvemshopError> {
        let url = self.products_url(&store.store_id, page, per_page)?;

        let response = self
            .client
            .get(url)
            .header(
                "Authentication",
                format!("bearer {}", store.access_token.trim()),
            )
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Parse before the status check: error responses carry a JSON
        // payload worth relaying, and a non-JSON body is its own failure
        // mode regardless of status.
        let data = parse_json(&body, || {
            format!("products page {page} for store {}", store.store_id)
        })?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                store_id = %store.store_id,
                "product listing rejected by upstream"
            );
            return Err(NuvemshopError::UpstreamStatus {
                status: status.as_u16(),
                details: data,
            });
        }

        if !data.is_array() {
            return Ok(Vec::new());
        }

        serde_json::from_value(data).map_err(|e| NuvemshopError::Deserialize {
            context: format!("products page {page} for store {}", store.store_id),
            snippet: snippet(&body),
            source: e,
        })
    }

    /// Exchanges an OAuth authorization code for an access token.
    ///
    /// Posts the standard `authorization_code` grant as a form body to the
    /// token endpoint.
    ///
    /// # Errors
    ///
    /// - [`NuvemshopError::UpstreamStatus`] — non-2xx status; carries the
    ///   parsed upstream error payload.
    /// - [`NuvemshopError::Deserialize`] — body is not valid JSON or not a
    ///   grant object.
    /// - [`NuvemshopError::Http`] — network or TLS failure.
    pub async fn exchange_code(
        &self,
        app: &AppCredentials,
        code: &str,
    ) -> Result<TokenGrant, NuvemshopError> {
        let params = [
            ("client_id", app.client_id.as_str()),
            ("client_secret", app.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", app.redirect_uri.as_str()),
        ];

        let response = self
            .client
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let data = parse_json(&body, || "token exchange".to_owned())?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "token exchange rejected by upstream");
            return Err(NuvemshopError::UpstreamStatus {
                status: status.as_u16(),
                details: data,
            });
        }

        serde_json::from_value(data).map_err(|e| NuvemshopError::Deserialize {
            context: "token exchange".to_owned(),
            snippet: snippet(&body),
            source: e,
        })
    }

    /// Builds the product listing URL for the given store and page window.
    ///
    /// The query values are appended with `Url`'s own percent-encoding, so
    /// whatever the caller forwards cannot break out of the query string.
    fn products_url(
        &self,
        store_id: &str,
        page: &str,
        per_page: &str,
    ) -> Result<Url, NuvemshopError> {
        let segment = store_id.trim().trim_matches('/');
        let mut url = self
            .api_base
            .join(&format!("{segment}/products"))
            .map_err(|e| NuvemshopError::InvalidBaseUrl {
                url: format!("{}{segment}/products", self.api_base),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("page", page.trim())
            .append_pair("per_page", per_page.trim());
        Ok(url)
    }
}

fn parse_json(
    body: &str,
    context: impl FnOnce() -> String,
) -> Result<serde_json::Value, NuvemshopError> {
    serde_json::from_str(body).map_err(|e| NuvemshopError::Deserialize {
        context: context(),
        snippet: snippet(body),
        source: e,
    })
}

/// Truncates a body to [`BODY_SNIPPET_MAX`] bytes on a char boundary.
fn snippet(body: &str) -> String {
    if body.len() <= BODY_SNIPPET_MAX {
        return body.to_owned();
    }
    let mut end = BODY_SNIPPET_MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_owned()
}
