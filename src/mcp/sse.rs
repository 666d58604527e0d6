//! SSE bridge between HTTP connections and the protocol run loop.
//!
//! A GET to `/sse` opens a session: the run loop reads newline-delimited
//! JSON-RPC from an in-memory pipe fed by `POST /messages/` and writes its
//! outbound messages to a second pipe that this module streams back as
//! `message` events. The first event on the wire is `endpoint`, telling the
//! client where to POST, tagged with this session's id.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::{self, Stream, StreamExt};
use rmcp::ServiceExt;
use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, ReadHalf, SimplexStream, WriteHalf};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::http::HttpState;
use crate::core::types::ErrorResponse;

pub const SESSION_TOKEN_HEADER: &str = "x-session-token";
pub const MESSAGE_ENDPOINT: &str = "/messages/";

const PIPE_CAPACITY: usize = 64 * 1024;
/// Messages a session may queue before POSTs start waiting on delivery.
const SESSION_QUEUE_DEPTH: usize = 64;

/// Process-wide bridge from raw HTTP bodies to per-session message pipes.
/// One instance serves every SSE connection; see [`super::registry`].
pub struct SseTransport {
    message_path: &'static str,
    sessions: Mutex<HashMap<Uuid, mpsc::Sender<String>>>,
}

/// Stream ends for one SSE connection, handed out by [`SseTransport::open_session`].
pub struct SseSession {
    pub id: Uuid,
    /// Payload of the initial `endpoint` event: where this client POSTs.
    pub endpoint: String,
    /// Read/write pair the protocol run loop drives, framed exactly like the
    /// stdio transport (one JSON-RPC message per line).
    pub server_io: (ReadHalf<SimplexStream>, WriteHalf<SimplexStream>),
    /// Outbound half that becomes the `message` event stream.
    pub outbound: ReadHalf<SimplexStream>,
}

#[derive(Debug, Error)]
pub enum DeliverError {
    #[error("no open SSE session with id {0}")]
    UnknownSession(Uuid),
    #[error("SSE session {0} is closed")]
    SessionClosed(Uuid),
}

impl SseTransport {
    pub fn new(message_path: &'static str) -> Self {
        Self {
            message_path,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new session and wire up its pipes. The returned handle owns
    /// every stream end the connection needs; the transport keeps only the
    /// message sender so [`Self::deliver`] can reach the session.
    pub fn open_session(&self) -> SseSession {
        let id = Uuid::new_v4();
        let (inbound_read, mut inbound_write) = tokio::io::simplex(PIPE_CAPACITY);
        let (outbound_read, outbound_write) = tokio::io::simplex(PIPE_CAPACITY);
        let (tx, mut rx) = mpsc::channel::<String>(SESSION_QUEUE_DEPTH);

        // Feed POSTed messages into the run loop's input in arrival order.
        // Ends when the session is deregistered (sender dropped) or the run
        // loop stops reading (pipe write fails).
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if inbound_write.write_all(message.as_bytes()).await.is_err()
                    || inbound_write.write_all(b"\n").await.is_err()
                {
                    break;
                }
            }
        });

        self.lock_sessions().insert(id, tx);

        SseSession {
            id,
            endpoint: format!("{}?session_id={}", self.message_path, id.simple()),
            server_io: (inbound_read, outbound_write),
            outbound: outbound_read,
        }
    }

    /// Forward one POSTed message to its correlated session, preserving
    /// arrival order. A session whose run loop already ended counts as
    /// closed and is pruned from the map.
    pub async fn deliver(&self, session_id: Uuid, message: String) -> Result<(), DeliverError> {
        let sender = self.lock_sessions().get(&session_id).cloned();
        let Some(sender) = sender else {
            return Err(DeliverError::UnknownSession(session_id));
        };
        if sender.send(message).await.is_err() {
            self.close_session(session_id);
            return Err(DeliverError::SessionClosed(session_id));
        }
        Ok(())
    }

    /// Deregister a session. Dropping its sender stops the inbound forwarder,
    /// which closes the run loop's input pipe. Idempotent.
    pub fn close_session(&self, session_id: Uuid) {
        if self.lock_sessions().remove(&session_id).is_some() {
            debug!("SSE session {} closed", session_id);
        }
    }

    pub fn open_sessions(&self) -> usize {
        self.lock_sessions().len()
    }

    // The lock is only ever held for map operations, never across an await.
    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, mpsc::Sender<String>>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Deregisters the session when the client's event stream is dropped, so a
/// disconnect tears down that session's run loop without touching the shared
/// server.
struct SessionGuard {
    transport: Arc<SseTransport>,
    session_id: Uuid,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.transport.close_session(self.session_id);
    }
}

/// `GET /sse`: the handshake. Applies late session injection from the
/// `X-Session-Token` header, then bridges this connection into the shared
/// server's run loop.
pub async fn sse_handshake(
    State(state): State<HttpState>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, Json<ErrorResponse>)> {
    let server = state.registry.get_server().await.map_err(|e| {
        error!("failed to construct MCP server: {:#}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("failed to initialize server: {}", e),
            }),
        )
    })?;
    let transport = state.registry.get_transport();

    if let Some(token) = session_token(&headers) {
        if server.session.is_authenticated() {
            debug!("ignoring X-Session-Token: session already authenticated");
        } else if server.session.set_token(token) {
            info!("session credential injected from X-Session-Token header");
        }
    }

    let SseSession {
        id: session_id,
        endpoint,
        server_io,
        outbound,
    } = transport.open_session();
    info!("SSE session {} opened", session_id);

    // The run loop lives in its own task; the guard below ties it back to the
    // connection. Either side ending tears down the other: the run loop
    // finishing closes the outbound pipe (ending the event stream), and the
    // client disconnecting drops the guard (closing the run loop's input).
    let service = (*server).clone();
    let run_transport = Arc::clone(&transport);
    tokio::spawn(async move {
        match service.serve(server_io).await {
            Ok(running) => {
                let reason = running.waiting().await;
                debug!("SSE session {} run loop ended: {:?}", session_id, reason);
            }
            Err(e) => debug!("SSE session {} failed to initialize: {}", session_id, e),
        }
        run_transport.close_session(session_id);
    });

    let guard = SessionGuard {
        transport,
        session_id,
    };
    let endpoint_event = Event::default().event("endpoint").data(endpoint);
    let lines = BufReader::new(outbound).lines();
    let messages = stream::unfold((lines, guard), |(mut lines, guard)| async move {
        match lines.next_line().await {
            Ok(Some(line)) => Some((
                Ok(Event::default().event("message").data(line)),
                (lines, guard),
            )),
            Ok(None) | Err(_) => None,
        }
    });
    let events = stream::once(async move { Ok::<Event, Infallible>(endpoint_event) }).chain(messages);

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[derive(Debug, Deserialize)]
pub struct MessageParams {
    pub session_id: String,
}

/// `POST /messages/?session_id=<id>`: message intake. Answers `202` once the
/// body is queued for its session; a missing or closed session is a client
/// error, never a hang.
pub async fn post_message(
    State(state): State<HttpState>,
    Query(params): Query<MessageParams>,
    body: String,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let session_id = Uuid::parse_str(params.session_id.trim()).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("invalid session_id: {}", params.session_id),
            }),
        )
    })?;

    // Re-serialize compactly: the run loop's framing is one message per line,
    // and clients are free to send pretty-printed JSON.
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .and_then(|v| serde_json::to_string(&v))
        .map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "request body is not valid JSON".to_string(),
                }),
            )
        })?;

    match state.registry.get_transport().deliver(session_id, message).await {
        Ok(()) => Ok(StatusCode::ACCEPTED),
        Err(e) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
