//! HTTP surface: cache admin pages and the note editor endpoints.

use axum::{
    Router,
    http::{HeaderMap, header},
    routing::{get, post},
};
use cairn_core::Principal;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

pub mod cache;
pub mod notes;
pub(crate) mod page;

/// Build the router for every HTTP route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/admin/cache", get(cache::list))
        .route("/admin/cache/delete", post(cache::delete))
        .route("/notes", post(notes::upsert))
        .route("/users/{owner_id}/notes", get(notes::list))
        .route("/users/{owner_id}/notes/{id}", get(notes::view))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Raw `Authorization` value, forwarded verbatim to peers.
pub(crate) fn authorization(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, header::AUTHORIZATION)
}

pub(crate) fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, ApiError> {
    Ok(state.tokens.authenticate(authorization(headers))?)
}

pub(crate) fn wants_json(headers: &HeaderMap) -> bool {
    header_str(headers, header::ACCEPT).is_some_and(|accept| accept.contains("application/json"))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;

    use axum::{
        Router,
        body::Body,
        http::{Request, Response, header},
    };
    use cairn_core::Database;
    use cairn_core::access::TokenGrant;
    use cairn_core::config::AppConfig;
    use tower::ServiceExt;

    use crate::state::AppState;

    pub const ADMIN: &str = "Bearer root-token";
    pub const USER: &str = "Bearer user-token";

    pub fn config(instance_id: &str) -> AppConfig {
        AppConfig {
            instance_id: instance_id.into(),
            tokens: BTreeMap::from([
                ("root-token".to_string(), TokenGrant { user_id: "kody".into(), admin: true }),
                ("user-token".to_string(), TokenGrant { user_id: "hannah".into(), admin: false }),
            ]),
            ..Default::default()
        }
    }

    pub async fn app_with(config: AppConfig) -> (Router, AppState) {
        let db = Database::open_in_memory().await.unwrap();
        let state = AppState::new(db, &config).unwrap();
        (super::router(state.clone()), state)
    }

    pub async fn app() -> (Router, AppState) {
        app_with(config("local")).await
    }

    pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
        app.clone().oneshot(request).await.unwrap()
    }

    pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri).header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        builder.body(Body::empty()).unwrap()
    }

    pub fn post_form(uri: &str, token: Option<&str>, form: &[(&str, &str)]) -> Request<Body> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        builder.body(Body::from(body)).unwrap()
    }

    pub async fn json(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
