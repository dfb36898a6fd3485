use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use super::cache::{CacheOptions, ResponseCache};
use super::provider::ResourceProvider;
use crate::config::ProviderConfig;
use crate::error::FetchError;

/// HTTP client for the TheSportsDB v1 JSON API.
/// Docs: <https://www.thesportsdb.com/api.php>
#[derive(Clone)]
pub struct SportsDbClient {
    http: Client,
    base_url: String,
    api_key: String,
    cache: ResponseCache,
}

/// `path?k=v&...` with form-encoded values.
pub fn endpoint(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{}?{}", path, query)
}

impl SportsDbClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(SportsDbClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            cache: ResponseCache::with_capacity(config.cache_max_entries),
        })
    }

    /// `{base}/{key}/{endpoint}`
    pub fn build_url(&self, endpoint: &str) -> Result<Url, FetchError> {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            self.api_key,
            endpoint.trim_start_matches('/')
        );
        Ok(Url::parse(&url)?)
    }

    async fn fetch_value(
        &self,
        endpoint: &str,
        options: &CacheOptions,
    ) -> Result<Value, FetchError> {
        let url = self.build_url(endpoint)?;
        if let Some(hit) = self.cache.get(url.as_str(), options).await {
            return Ok(hit);
        }

        // The URL embeds the API key, so only the endpoint is logged
        debug!("Fetching {}", endpoint);
        let resp = self.http.get(url.clone()).send().await.map_err(|source| {
            error!("Error fetching {}: {}", endpoint, source);
            FetchError::Network {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            error!("Error fetching {}: HTTP {}", endpoint, status);
            return Err(FetchError::provider(status.as_u16(), endpoint));
        }

        let body: Value = resp.json().await.map_err(|e| {
            error!("Error parsing {}: {}", endpoint, e);
            FetchError::malformed(endpoint, e.to_string())
        })?;

        if is_empty_envelope(&body) {
            debug!("Not caching empty response for {}", endpoint);
        } else {
            self.cache.put(url.as_str(), &body, options).await;
        }
        Ok(body)
    }
}

/// "Nothing matched" answers such as `{"teams": null}` or `{"player": []}`.
/// Unknown ids produce these, so they are never stored.
fn is_empty_envelope(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(fields) => fields.values().all(|v| match v {
            Value::Null => true,
            Value::Array(rows) => rows.is_empty(),
            _ => false,
        }),
        _ => false,
    }
}

#[async_trait]
impl ResourceProvider for SportsDbClient {
    async fn fetch_json(
        &self,
        endpoint: &str,
        options: &CacheOptions,
    ) -> Result<Value, FetchError> {
        self.fetch_value(endpoint, options).await
    }

    async fn invalidate_tag(&self, tag: &str) -> usize {
        let removed = self.cache.invalidate_tag(tag).await;
        debug!(
            "Invalidated {} cached response(s) tagged '{}', {} left",
            removed,
            tag,
            self.cache.len().await
        );
        removed
    }

    fn name(&self) -> &str {
        "TheSportsDB"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sportsdb::normalize::Envelope;
    use crate::sportsdb::provider::fetch_resource;
    use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn config(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            base_url: base_url.to_string(),
            api_key: "3".to_string(),
            timeout: Duration::from_secs(2),
            cache_max_entries: 64,
        }
    }

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn counting_teams_router(hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/3/search_all_teams.php",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "teams": [{ "idTeam": "1", "strTeam": "Hawks" }] }))
                }),
            )
            .with_state(hits)
    }

    #[test]
    fn test_endpoint_encodes_query() {
        assert_eq!(
            endpoint("search_all_teams.php", &[("l", "NBA")]),
            "search_all_teams.php?l=NBA"
        );
        assert_eq!(
            endpoint("search_all_leagues.php", &[("s", "Ice Hockey")]),
            "search_all_leagues.php?s=Ice+Hockey"
        );
        assert_eq!(endpoint("livescore.php", &[]), "livescore.php");
    }

    #[test]
    fn test_build_url_joins_base_key_and_endpoint() {
        let base = "https://www.thesportsdb.com/api/v1/json/";
        let client = SportsDbClient::new(&config(base)).unwrap();
        let url = client.build_url("lookupteam.php?id=134860").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.thesportsdb.com/api/v1/json/3/lookupteam.php?id=134860"
        );
    }

    #[tokio::test]
    async fn test_fetch_resource_decodes_body() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_upstream(counting_teams_router(hits.clone())).await;
        let client = SportsDbClient::new(&config(&base)).unwrap();

        let body: Envelope = fetch_resource(
            &client,
            "search_all_teams.php?l=NBA",
            &CacheOptions::no_store(),
        )
        .await
        .unwrap();
        assert_eq!(body.teams()[0]["strTeam"], "Hawks");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_resource_shape_mismatch_is_malformed() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_upstream(counting_teams_router(hits)).await;
        let client = SportsDbClient::new(&config(&base)).unwrap();

        let err = fetch_resource::<Vec<String>>(
            &client,
            "search_all_teams.php?l=NBA",
            &CacheOptions::no_store(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_cached() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/3/lookupteam.php",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "teams": null }))
                }),
            )
            .with_state(hits.clone());
        let base = spawn_upstream(router).await;
        let client = SportsDbClient::new(&config(&base)).unwrap();
        let opts = CacheOptions::force_cache();

        for i in 0..200 {
            let ep = format!("lookupteam.php?id=bogus{}", i);
            let body = client.fetch_json(&ep, &opts).await.unwrap();
            assert!(body["teams"].is_null());
        }
        assert_eq!(client.cache.len().await, 0);
        assert_eq!(hits.load(Ordering::SeqCst), 200);
    }

    #[tokio::test]
    async fn test_distinct_urls_stay_within_capacity() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_upstream(counting_teams_router(hits)).await;
        let mut small = config(&base);
        small.cache_max_entries = 8;
        let client = SportsDbClient::new(&small).unwrap();
        let opts = CacheOptions::force_cache();

        for i in 0..50 {
            let ep = format!("search_all_teams.php?l=League{}", i);
            client.fetch_json(&ep, &opts).await.unwrap();
        }
        assert_eq!(client.cache.len().await, 8);
    }

    #[test]
    fn test_empty_envelope_detection() {
        assert!(is_empty_envelope(&json!({ "teams": null })));
        assert!(is_empty_envelope(&json!({ "player": [] })));
        assert!(is_empty_envelope(&json!(null)));
        assert!(!is_empty_envelope(&json!({ "teams": [{}] })));
        assert!(!is_empty_envelope(&json!({ "teams": null, "message": "x" })));
    }

    #[tokio::test]
    async fn test_cached_response_skips_upstream() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_upstream(counting_teams_router(hits.clone())).await;
        let client = SportsDbClient::new(&config(&base)).unwrap();
        let opts = CacheOptions::revalidate(Duration::from_secs(60)).tag("nba-teams");

        client.fetch_json("search_all_teams.php?l=NBA", &opts).await.unwrap();
        client.fetch_json("search_all_teams.php?l=NBA", &opts).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert_eq!(client.invalidate_tag("nba-teams").await, 1);
        client.fetch_json("search_all_teams.php?l=NBA", &opts).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_success_status_is_provider_error() {
        let router = Router::new().route(
            "/3/search_all_teams.php",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
        );
        let base = spawn_upstream(router).await;
        let client = SportsDbClient::new(&config(&base)).unwrap();

        let err = client
            .fetch_json("search_all_teams.php?l=NBA", &CacheOptions::force_cache())
            .await
            .unwrap_err();
        match err {
            FetchError::Provider { status, endpoint } => {
                assert_eq!(status, 503);
                assert_eq!(endpoint, "search_all_teams.php?l=NBA");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_response_is_not_cached() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/3/lookupteam.php",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    StatusCode::INTERNAL_SERVER_ERROR
                }),
            )
            .with_state(hits.clone());
        let base = spawn_upstream(router).await;
        let client = SportsDbClient::new(&config(&base)).unwrap();
        let opts = CacheOptions::force_cache();

        assert!(client.fetch_json("lookupteam.php?id=1", &opts).await.is_err());
        assert!(client.fetch_json("lookupteam.php?id=1", &opts).await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let router =
            Router::new().route("/3/lookupteam.php", get(|| async { "<html>oops</html>" }));
        let base = spawn_upstream(router).await;
        let client = SportsDbClient::new(&config(&base)).unwrap();

        let err = client
            .fetch_json("lookupteam.php?id=1", &CacheOptions::no_store())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = SportsDbClient::new(&config(&format!("http://{}", addr))).unwrap();

        let err = client
            .fetch_json("lookupteam.php?id=1", &CacheOptions::no_store())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }
}
