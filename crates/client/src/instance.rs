//! HTTP client for peer instances.
//!
//! Cache admin operations addressed to another instance are replayed
//! against that instance's own HTTP surface, naming the peer as the target
//! so that it answers for itself:
//!
//! - `GET  {base}/healthz`
//! - `GET  {base}/admin/cache?query&limit&instance` (JSON)
//! - `POST {base}/admin/cache/delete` (form `cacheKey`, `type`, `instance`)

use std::sync::Arc;
use std::time::Duration;

use cairn_core::{CacheBackend, CacheListRequest, CacheListResult};
use reqwest::header;
use url::Url;

use crate::ClientError;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = concat!("cairn/", env!("CARGO_PKG_VERSION"));

/// Peer client configuration.
#[derive(Debug, Clone)]
pub struct InstanceClientConfig {
    /// Request timeout (default: 5s).
    pub timeout: Duration,
    /// User-agent string (default: cairn/<version>).
    pub user_agent: String,
}

impl Default for InstanceClientConfig {
    fn default() -> Self {
        Self { timeout: DEFAULT_TIMEOUT, user_agent: DEFAULT_USER_AGENT.to_string() }
    }
}

/// Client for peer instances.
#[derive(Debug, Clone)]
pub struct InstanceClient {
    http: reqwest::Client,
}

/// Join `path` under `base`, treating `base` as a directory.
fn endpoint(base: &Url, path: &str) -> Result<Url, ClientError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path).map_err(|e| ClientError::InvalidUrl(e.to_string()))
}

impl InstanceClient {
    /// Create a new client with the given configuration.
    pub fn new(config: InstanceClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| ClientError::Network(Arc::new(e)))?;

        Ok(Self { http })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.bytes().await?;
            return Err(ClientError::remote(status.as_u16(), &body));
        }
        Ok(response)
    }

    /// Verify the peer answers its health endpoint.
    pub async fn ping(&self, base: &Url) -> Result<(), ClientError> {
        let url = endpoint(base, "healthz")?;
        tracing::debug!(%url, "pinging instance");
        Self::check(self.http.get(url).send().await?).await?;
        Ok(())
    }

    /// List cache keys on the peer `instance` at `base`.
    pub async fn list_keys(
        &self, base: &Url, instance: &str, request: &CacheListRequest, authorization: Option<&str>,
    ) -> Result<CacheListResult, ClientError> {
        let url = endpoint(base, "admin/cache")?;
        let limit = request.limit.to_string();
        let mut params = vec![("limit", limit.as_str()), ("instance", instance)];
        if let Some(query) = request.query.as_deref() {
            params.push(("query", query));
        }

        let mut builder = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .query(&params);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        tracing::debug!(instance, limit = request.limit, "forwarding cache listing");
        let response = Self::check(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Delete `key` from `backend` on the peer `instance` at `base`.
    pub async fn delete_key(
        &self, base: &Url, instance: &str, key: &str, backend: CacheBackend, authorization: Option<&str>,
    ) -> Result<(), ClientError> {
        let url = endpoint(base, "admin/cache/delete")?;
        let form = [("cacheKey", key), ("type", backend.as_str()), ("instance", instance)];

        let mut builder = self
            .http
            .post(url)
            .header(header::ACCEPT, "application/json")
            .form(&form);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        tracing::debug!(instance, key, %backend, "forwarding cache delete");
        Self::check(builder.send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Form, Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
    };
    use std::collections::HashMap;

    async fn list(
        headers: HeaderMap, Query(params): Query<HashMap<String, String>>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer peer") {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"error": {"code": "UNAUTHORIZED", "message": "unknown token"}})),
            );
        }
        let field = |name: &str| params.get(name).cloned().unwrap_or_default();
        let (query, limit, instance) = (field("query"), field("limit"), field("instance"));
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "instance": instance,
                "persistentKeys": [format!("{query}:p")],
                "memoryKeys": [limit],
            })),
        )
    }

    async fn delete(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<serde_json::Value>) {
        if form.get("type").map(String::as_str) != Some("memory") {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": {"code": "INVALID_BACKEND", "message": "bad"}})),
            );
        }
        (StatusCode::OK, Json(serde_json::json!({"success": true})))
    }

    async fn spawn_peer() -> Url {
        let app = Router::new()
            .route("/healthz", get(|| async { "ok" }))
            .route("/admin/cache", get(list))
            .route("/admin/cache/delete", post(delete));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn client() -> InstanceClient {
        InstanceClient::new(InstanceClientConfig::default()).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("http://10.0.0.2:3000/cairn").unwrap();
        assert_eq!(endpoint(&base, "healthz").unwrap().as_str(), "http://10.0.0.2:3000/cairn/healthz");

        let base = Url::parse("http://10.0.0.2:3000").unwrap();
        assert_eq!(endpoint(&base, "admin/cache").unwrap().as_str(), "http://10.0.0.2:3000/admin/cache");
    }

    #[tokio::test]
    async fn test_ping() {
        let base = spawn_peer().await;
        client().ping(&base).await.unwrap();
    }

    #[tokio::test]
    async fn test_ping_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{addr}")).unwrap();
        let err = client().ping(&base).await.unwrap_err();
        assert!(matches!(cairn_core::Error::from(err), cairn_core::Error::InstanceUnreachable(_)));
    }

    #[tokio::test]
    async fn test_list_keys_forwards_query_and_token() {
        let base = spawn_peer().await;
        let request = CacheListRequest::new(Some("user".into()), 25).unwrap();

        let result = client().list_keys(&base, "ams", &request, Some("Bearer peer")).await.unwrap();
        assert_eq!(result.persistent_keys, vec!["user:p"]);
        assert_eq!(result.memory_keys, vec!["25"]);
    }

    #[tokio::test]
    async fn test_list_keys_surfaces_remote_status() {
        let base = spawn_peer().await;
        let err = client()
            .list_keys(&base, "ams", &CacheListRequest::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Remote { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_delete_key() {
        let base = spawn_peer().await;
        let client = client();

        client.delete_key(&base, "ams", "k", CacheBackend::Memory, None).await.unwrap();
        let err = client
            .delete_key(&base, "ams", "k", CacheBackend::Persistent, None)
            .await
            .unwrap_err();
        assert!(matches!(cairn_core::Error::from(err), cairn_core::Error::InvalidBackend(_)));
    }
}
