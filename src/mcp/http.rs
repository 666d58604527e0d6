//! HTTP-mode route assembly.
//!
//! The route set is closed: `/sse` and `/messages/` reach the shared server
//! through the SSE bridge, everything else is static and never touches it.
//! Unrecognized paths fall through to axum's default not-found handling.

use std::sync::Arc;

use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::registry::ServerRegistry;
use super::sse;
use crate::core::types::OAuthErrorResponse;

#[derive(Clone)]
pub struct HttpState {
    pub registry: Arc<ServerRegistry>,
}

pub fn build_router(registry: Arc<ServerRegistry>) -> Router {
    let state = HttpState { registry };
    Router::new()
        .route("/sse", get(sse::sse_handshake))
        .route("/sse/", get(sse::sse_handshake))
        .route(sse::MESSAGE_ENDPOINT, post(sse::post_message))
        .route("/health", get(health_check))
        .route("/.well-known/oauth-authorization-server", get(oauth_metadata))
        .route("/oauth/authorize", get(oauth_stub).post(oauth_stub))
        .route("/oauth/token", get(oauth_stub).post(oauth_stub))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "blok-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// OAuth 2.0 Authorization Server Metadata. Static apart from the base URL,
/// which follows the Host header so deployments behind a proxy advertise the
/// endpoints clients can actually reach.
async fn oauth_metadata(headers: HeaderMap) -> Json<Value> {
    let base_url = request_base_url(&headers);
    Json(json!({
        "issuer": base_url,
        "authorization_endpoint": format!("{}/oauth/authorize", base_url),
        "token_endpoint": format!("{}/oauth/token", base_url),
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code"],
        "code_challenge_methods_supported": ["S256"],
    }))
}

/// Token issuance is not implemented. Both OAuth endpoints answer with the
/// same fixed error, whatever the method or body, pointing clients at the
/// `X-Session-Token` header instead.
async fn oauth_stub() -> (StatusCode, Json<OAuthErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(OAuthErrorResponse::unsupported_grant_type()),
    )
}

fn request_base_url(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{}://{}", scheme, host)
}
