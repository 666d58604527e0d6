//! Process-wide lifecycle for the shared server instance and SSE transport.
//!
//! HTTP mode serves every connection from one server instance and one SSE
//! transport. Both are built on first use and live until process exit; there
//! is no teardown path.

use std::sync::{Arc, OnceLock};

use tokio::sync::Mutex;
use tracing::info;

use super::service::BlokMcpService;
use super::sse::{SseTransport, MESSAGE_ENDPOINT};
use crate::auth::AuthPosture;
use crate::core::config::BlokConfig;

pub struct ServerRegistry {
    posture: AuthPosture,
    config: BlokConfig,
    server: Mutex<Option<Arc<BlokMcpService>>>,
    transport: OnceLock<Arc<SseTransport>>,
}

impl ServerRegistry {
    pub fn new(posture: AuthPosture, config: BlokConfig) -> Self {
        Self {
            posture,
            config,
            server: Mutex::new(None),
            transport: OnceLock::new(),
        }
    }

    /// The shared server instance, constructed with the startup posture on
    /// first call. Concurrent first calls serialize on the lock, so at most
    /// one instance is ever observable. A failed construction (an auto-login
    /// exchange that didn't go through, say) leaves the slot empty; the next
    /// call constructs again instead of caching the failure.
    pub async fn get_server(&self) -> anyhow::Result<Arc<BlokMcpService>> {
        let mut slot = self.server.lock().await;
        if let Some(server) = slot.as_ref() {
            return Ok(Arc::clone(server));
        }

        info!("constructing MCP server ({})", self.posture.describe());
        let server = Arc::new(BlokMcpService::new(self.posture.clone(), &self.config).await?);
        *slot = Some(Arc::clone(&server));
        Ok(server)
    }

    /// The shared SSE transport. Construction is infallible, so a plain
    /// `OnceLock` covers the concurrent-first-call case.
    pub fn get_transport(&self) -> Arc<SseTransport> {
        Arc::clone(
            self.transport
                .get_or_init(|| Arc::new(SseTransport::new(MESSAGE_ENDPOINT))),
        )
    }
}
