use thiserror::Error;

/// Errors raised while talking to the trends upstream.
///
/// Only [`TrendsError::RateLimited`] is transient; every other variant ends
/// the fetch on the attempt that produced it.
#[derive(Debug, Error)]
pub enum TrendsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered HTTP 429.
    #[error("rate limited by trends upstream at {url}")]
    RateLimited { url: String },

    /// Any other non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The explore response did not contain a widget the fetch depends on.
    #[error("explore response has no {0} widget")]
    MissingWidget(&'static str),

    /// The body parsed but its contents break the result invariants.
    #[error("malformed trends response: {0}")]
    Malformed(String),

    #[error("invalid upstream URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl TrendsError {
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TrendsError::RateLimited { .. })
    }
}
