use thiserror::Error;

/// Failures surfaced by the TheSportsDB fetch client.
///
/// Domain services never let these escape: they log and degrade to an
/// empty result instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-2xx status.
    #[error("provider returned HTTP {status} for {endpoint}")]
    Provider { status: u16, endpoint: String },

    /// Transport-level failure (DNS, connect, timeout, reset).
    #[error("network error fetching {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body was not the JSON shape we asked for.
    #[error("malformed response from {endpoint}: {message}")]
    Malformed { endpoint: String, message: String },

    #[error("invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    pub fn provider(status: u16, endpoint: impl Into<String>) -> Self {
        FetchError::Provider {
            status,
            endpoint: endpoint.into(),
        }
    }

    pub fn malformed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError::Malformed {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// HTTP status reported by the provider, if this was a provider error.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}
