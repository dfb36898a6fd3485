use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

use super::cache::CacheOptions;
use crate::error::FetchError;

/// Source of raw upstream JSON that the league services build on.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Fetch one endpoint (path + query, relative to the keyed base URL).
    async fn fetch_json(&self, endpoint: &str, options: &CacheOptions)
        -> Result<Value, FetchError>;

    /// Drop cached responses carrying `tag`. Returns the number removed.
    async fn invalidate_tag(&self, _tag: &str) -> usize {
        0
    }

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Fetch one endpoint and decode it into `T`, honoring the caching hints.
pub async fn fetch_resource<T: DeserializeOwned>(
    provider: &dyn ResourceProvider,
    endpoint: &str,
    options: &CacheOptions,
) -> Result<T, FetchError> {
    let body = provider.fetch_json(endpoint, options).await?;
    serde_json::from_value(body).map_err(|e| {
        error!("Error decoding {} from {}: {}", endpoint, provider.name(), e);
        FetchError::malformed(endpoint, e.to_string())
    })
}
