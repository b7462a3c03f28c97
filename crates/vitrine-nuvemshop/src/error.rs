use thiserror::Error;

#[derive(Debug, Error)]
pub enum NuvemshopError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid (non-JSON) upstream response for {context}: {source}")]
    Deserialize {
        context: String,
        /// Leading bytes of the offending body, for diagnostics.
        snippet: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("upstream returned HTTP {status}")]
    UpstreamStatus {
        status: u16,
        /// Parsed upstream error payload, relayed to the caller.
        details: serde_json::Value,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
