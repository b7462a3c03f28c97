use std::net::SocketAddr;

/// Runtime configuration for the vitrine services.
///
/// Upstream credentials are optional at startup: the server boots with
/// whatever subset is configured and reports missing credentials per
/// request, matching how the platform's own app deployments behave when
/// half-provisioned.
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Base URL of the Nuvemshop REST API, e.g. `https://api.nuvemshop.com.br/v1`.
    pub api_base_url: String,
    /// Full URL of the OAuth token endpoint.
    pub token_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Numeric store ID used in catalog request paths.
    pub store_id: Option<String>,
    /// Store-scoped access token for catalog reads.
    pub access_token: Option<String>,
    /// OAuth client ID of the registered app.
    pub app_id: Option<String>,
    /// OAuth client secret of the registered app.
    pub client_secret: Option<String>,
    /// Redirect URI registered for the OAuth flow.
    pub redirect_uri: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field("token_url", &self.token_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("store_id", &self.store_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("app_id", &self.app_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}
