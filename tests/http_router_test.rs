//! Router-level tests: static routes, message intake, and the SSE handshake.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use tower::ServiceExt;

use blok_mcp::auth::AuthPosture;
use blok_mcp::core::config::BlokConfig;
use blok_mcp::mcp::{build_router, ServerRegistry};

/// Registry pointing at an address nothing listens on. Postures that don't
/// log in at construction never touch the network, so this only bites when a
/// test accidentally triggers an auto-login exchange.
fn test_registry(posture: AuthPosture) -> Arc<ServerRegistry> {
    Arc::new(ServerRegistry::new(
        posture,
        BlokConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        },
    ))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let router = build_router(test_registry(AuthPosture::Unauthenticated));

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "blok-mcp");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn oauth_metadata_follows_the_host_header() {
    let router = build_router(test_registry(AuthPosture::Unauthenticated));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/.well-known/oauth-authorization-server")
                .header("host", "mcp.example.com")
                .header("x-forwarded-proto", "https")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["issuer"], "https://mcp.example.com");
    assert_eq!(
        json["authorization_endpoint"],
        "https://mcp.example.com/oauth/authorize"
    );
    assert_eq!(json["token_endpoint"], "https://mcp.example.com/oauth/token");
    assert_eq!(json["grant_types_supported"][0], "authorization_code");
}

#[tokio::test]
async fn oauth_stubs_always_return_unsupported_grant_type() {
    for (path, method, body) in [
        ("/oauth/authorize", "GET", Body::empty()),
        ("/oauth/authorize", "POST", Body::from("grant_type=code")),
        ("/oauth/token", "GET", Body::empty()),
        (
            "/oauth/token",
            "POST",
            Body::from(r#"{"grant_type":"client_credentials"}"#),
        ),
    ] {
        let router = build_router(test_registry(AuthPosture::Unauthenticated));
        let response = router
            .oneshot(
                Request::builder()
                    .uri(path)
                    .method(method)
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {path}");
        let json = body_json(response).await;
        assert_eq!(json["error"], "unsupported_grant_type", "{method} {path}");
        assert_eq!(json["error_description"], "Use X-Session-Token header");
    }
}

/// The server for this registry cannot be constructed (auto-login against a
/// dead address). A pass-through path answering 404 rather than 500 shows it
/// never tried.
#[tokio::test]
async fn unknown_paths_never_touch_the_server_instance() {
    let registry = test_registry(AuthPosture::AutoLogin {
        email: "user@example.com".into(),
        password: "secret".into(),
    });
    let router = build_router(registry);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/favicon.ico")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn message_post_without_open_session_is_an_error() {
    let router = build_router(test_registry(AuthPosture::Unauthenticated));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/messages/?session_id=3f2d9c40b8e34c55a1f0d9e6b7a21c88")
                .method("POST")
                .body(Body::from(r#"{"jsonrpc":"2.0","method":"ping","id":1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("no open SSE session"));
}

#[tokio::test]
async fn message_post_without_session_id_is_rejected() {
    let router = build_router(test_registry(AuthPosture::Unauthenticated));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/messages/")
                .method("POST")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn message_post_with_invalid_json_is_rejected() {
    let router = build_router(test_registry(AuthPosture::Unauthenticated));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/messages/?session_id=3f2d9c40b8e34c55a1f0d9e6b7a21c88")
                .method("POST")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "request body is not valid JSON");
}

#[tokio::test]
async fn sse_handshake_opens_a_stream_and_names_the_message_endpoint() {
    let router = build_router(test_registry(AuthPosture::Unauthenticated));

    let response = router
        .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );

    let mut body = response.into_body().into_data_stream();
    let first = tokio::time::timeout(Duration::from_secs(5), body.next())
        .await
        .expect("endpoint event should arrive promptly")
        .expect("stream should not be empty")
        .unwrap();
    let first = String::from_utf8(first.to_vec()).unwrap();
    assert!(first.contains("event: endpoint"), "got: {first}");
    assert!(first.contains("/messages/?session_id="), "got: {first}");
}

#[tokio::test]
async fn sse_endpoint_accepts_a_trailing_slash() {
    let router = build_router(test_registry(AuthPosture::Unauthenticated));

    let response = router
        .oneshot(Request::builder().uri("/sse/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn handshake_header_authenticates_an_unauthenticated_server() {
    let registry = test_registry(AuthPosture::Unauthenticated);
    let router = build_router(Arc::clone(&registry));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/sse")
                .header("X-Session-Token", "injected-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let server = registry.get_server().await.unwrap();
    assert!(server.session.is_authenticated());
    assert_eq!(server.session.bearer_token().as_deref(), Some("injected-token"));
}

#[tokio::test]
async fn second_injected_token_does_not_replace_the_first() {
    let registry = test_registry(AuthPosture::Unauthenticated);

    for token in ["first-token", "second-token"] {
        let router = build_router(Arc::clone(&registry));
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/sse")
                    .header("X-Session-Token", token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let server = registry.get_server().await.unwrap();
    assert_eq!(server.session.bearer_token().as_deref(), Some("first-token"));
}

#[tokio::test]
async fn handshake_never_overwrites_a_preauth_credential() {
    let registry = test_registry(AuthPosture::PreAuthToken("startup-token".into()));

    // With the header present, and again without it.
    for request in [
        Request::builder()
            .uri("/sse")
            .header("X-Session-Token", "other-token")
            .body(Body::empty())
            .unwrap(),
        Request::builder().uri("/sse").body(Body::empty()).unwrap(),
    ] {
        let router = build_router(Arc::clone(&registry));
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let server = registry.get_server().await.unwrap();
    assert!(server.session.is_authenticated());
    assert_eq!(
        server.session.bearer_token().as_deref(),
        Some("startup-token")
    );
}
