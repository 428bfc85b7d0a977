//! `/admin/cache` routes.

use axum::{
    Form, Json,
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
};
use cairn_core::instance::InstanceInfo;
use cairn_core::{CacheListRequest, CacheListResult, Error};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{authenticate, authorization, page, wants_json};
use crate::error::ApiError;
use crate::state::AppState;

/// Query string of `GET /admin/cache`, kept raw so that validation errors are ours.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub query: Option<String>,
    pub limit: Option<String>,
    pub instance: Option<String>,
    /// Row armed for deletion on the HTML page, `<backend>:<key>`.
    pub arm: Option<String>,
}

impl ListParams {
    /// This listing without the `query` parameter.
    fn without_query(&self) -> String {
        let mut pairs = url::form_urlencoded::Serializer::new(String::new());
        if let Some(limit) = &self.limit {
            pairs.append_pair("limit", limit);
        }
        if let Some(instance) = &self.instance {
            pairs.append_pair("instance", instance);
        }
        match pairs.finish() {
            qs if qs.is_empty() => "/admin/cache".to_string(),
            qs => format!("/admin/cache?{qs}"),
        }
    }
}

/// What the listing page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachePage {
    pub instance: String,
    pub current_instance: String,
    pub instances: Vec<InstanceInfo>,
    pub query: Option<String>,
    pub limit: u32,
    #[serde(flatten)]
    pub keys: CacheListResult,
}

pub async fn list(
    State(state): State<AppState>, headers: HeaderMap, Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let principal = authenticate(&state, &headers)?;

    if params.query.as_deref().is_some_and(|q| q.trim().is_empty()) {
        return Ok(Redirect::to(&params.without_query()).into_response());
    }

    let request = CacheListRequest::parse(params.query.as_deref(), params.limit.as_deref())?;
    let instance = params.instance.as_deref().filter(|id| !id.is_empty());
    let keys = state
        .list_cache_keys(&principal, instance, &request, authorization(&headers))
        .await?;

    let current = state.directory.current().to_string();
    let view = CachePage {
        instance: instance.map_or_else(|| current.clone(), str::to_string),
        current_instance: current,
        instances: state.directory.list(),
        query: request.query,
        limit: request.limit,
        keys,
    };

    if wants_json(&headers) {
        Ok(Json(view).into_response())
    } else {
        let armed = params.arm.as_deref().and_then(page::ArmedKey::parse);
        Ok(Html(state.pages.cache_page(&view, armed.as_ref())?).into_response())
    }
}

/// Form body of `POST /admin/cache/delete`.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(rename = "cacheKey")]
    pub cache_key: Option<String>,
    #[serde(rename = "type")]
    pub backend: Option<String>,
    pub instance: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, Error> {
    value.ok_or_else(|| Error::InvalidInput(format!("{field} is required")))
}

pub async fn delete(
    State(state): State<AppState>, headers: HeaderMap, Form(form): Form<DeleteForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let principal = authenticate(&state, &headers)?;

    let key = required(form.cache_key, "cacheKey")?;
    let backend = required(form.backend, "type")?;
    let instance = required(form.instance, "instance")?;

    state
        .delete_cache_key(&principal, Some(&instance), &key, &backend, authorization(&headers))
        .await?;
    Ok(Json(json!({"success": true})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use cairn_core::cache::CacheEntry;
    use std::collections::BTreeMap;

    fn seed(state: &AppState, keys: &[&str]) {
        for key in keys {
            state.caches.memory.set(key, CacheEntry::new(json!(key), None));
        }
    }

    #[tokio::test]
    async fn test_empty_query_redirects_without_it() {
        let (app, _) = app().await;
        let response = send(&app, get("/admin/cache?query=&limit=5&instance=local", Some(ADMIN))).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(location, "/admin/cache?limit=5&instance=local");
    }

    #[tokio::test]
    async fn test_blank_query_redirects_without_it() {
        let (app, _) = app().await;
        let response = send(&app, get("/admin/cache?query=%20&limit=5", Some(ADMIN))).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(location, "/admin/cache?limit=5");
    }

    #[tokio::test]
    async fn test_list_json() {
        let (app, state) = app().await;
        seed(&state, &["user:1", "user:2", "session:9"]);
        state
            .caches
            .persistent
            .set("user:p", &CacheEntry::new(json!(1), None))
            .await
            .unwrap();

        let response = send(&app, get("/admin/cache?query=user&limit=1", Some(ADMIN))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json(response).await;
        assert_eq!(body["instance"], "local");
        assert_eq!(body["query"], "user");
        assert_eq!(body["persistentKeys"], json!(["user:p"]));
        assert_eq!(body["memoryKeys"].as_array().unwrap().len(), 1);
    }

    async fn html(app: &axum::Router, uri: &str) -> String {
        let request = Request::get(uri)
            .header(header::AUTHORIZATION, ADMIN)
            .body(Body::empty())
            .unwrap();
        let response = send(app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_list_html_escapes_keys() {
        let (app, state) = app().await;
        seed(&state, &["<script>"]);

        let html = html(&app, "/admin/cache").await;
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[tokio::test]
    async fn test_list_html_arms_one_row() {
        let (app, state) = app().await;
        seed(&state, &["user:1", "user:2"]);

        let html_page = html(&app, "/admin/cache").await;
        assert!(!html_page.contains("name=\"cacheKey\""));

        let html_page = html(&app, "/admin/cache?arm=memory%3Auser%3A2").await;
        assert!(html_page.contains("name=\"cacheKey\" value=\"user:2\""));
        assert!(!html_page.contains("name=\"cacheKey\" value=\"user:1\""));
        assert!(html_page.contains("Confirm?"));
        assert!(state.caches.memory.get("user:2").is_some());
    }

    #[tokio::test]
    async fn test_list_rejects_bad_limit() {
        let (app, _) = app().await;
        for uri in ["/admin/cache?limit=0", "/admin/cache?limit=10001", "/admin/cache?limit=ten"] {
            let response = send(&app, get(uri, Some(ADMIN))).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_list_requires_admin() {
        let (app, _) = app().await;
        let response = send(&app, get("/admin/cache", Some(USER))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_instance() {
        let (app, _) = app().await;
        let response = send(&app, get("/admin/cache?instance=syd", Some(ADMIN))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await["error"]["code"], "UNKNOWN_INSTANCE");
    }

    #[tokio::test]
    async fn test_delete_then_list() {
        let (app, state) = app().await;
        seed(&state, &["user:1"]);

        let form = [("cacheKey", "user:1"), ("type", "memory"), ("instance", "local")];
        let response = send(&app, post_form("/admin/cache/delete", Some(ADMIN), &form)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await, json!({"success": true}));
        assert!(state.caches.memory.get("user:1").is_none());

        let response = send(&app, post_form("/admin/cache/delete", Some(ADMIN), &form)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_delete_rejects_unknown_type() {
        let (app, state) = app().await;
        seed(&state, &["user:1"]);

        let form = [("cacheKey", "user:1"), ("type", "redis"), ("instance", "local")];
        let response = send(&app, post_form("/admin/cache/delete", Some(ADMIN), &form)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"]["code"], "INVALID_BACKEND");
        assert!(state.caches.memory.get("user:1").is_some());
    }

    #[tokio::test]
    async fn test_delete_requires_every_field() {
        let (app, _) = app().await;
        let form = [("cacheKey", "user:1"), ("type", "memory")];
        let response = send(&app, post_form("/admin/cache/delete", Some(ADMIN), &form)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    async fn spawn_peer(instance_id: &str) -> (String, AppState) {
        let (peer, state) = app_with(config(instance_id)).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, peer).await.unwrap() });
        (format!("http://{addr}"), state)
    }

    #[tokio::test]
    async fn test_remote_instance_answers_for_itself() {
        let (peer_url, peer_state) = spawn_peer("ams").await;
        seed(&peer_state, &["remote:1"]);

        let mut local = config("iad");
        local.instances = BTreeMap::from([("ams".to_string(), peer_url)]);
        let (app, local_state) = app_with(local).await;
        seed(&local_state, &["local:1"]);

        let response = send(&app, get("/admin/cache?instance=ams", Some(ADMIN))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["instance"], "ams");
        assert_eq!(body["memoryKeys"], json!(["remote:1"]));

        let form = [("cacheKey", "remote:1"), ("type", "memory"), ("instance", "ams")];
        let response = send(&app, post_form("/admin/cache/delete", Some(ADMIN), &form)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(peer_state.caches.memory.get("remote:1").is_none());
        assert!(local_state.caches.memory.get("local:1").is_some());
    }

    #[tokio::test]
    async fn test_unreachable_instance_is_bad_gateway() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut local = config("iad");
        local.instances = BTreeMap::from([("ams".to_string(), format!("http://{addr}"))]);
        let (app, _) = app_with(local).await;

        let response = send(&app, get("/admin/cache?instance=ams", Some(ADMIN))).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
