pub mod api;
pub mod auth;
pub mod core;
pub mod mcp;

// --- Primary core exports ---
pub use crate::core::config;
pub use crate::core::config::BlokConfig;
pub use crate::core::types;
pub use crate::core::types::*;

pub use api::client::BlokClient;
pub use auth::posture::AuthPosture;
pub use auth::session::SessionManager;
pub use mcp::registry::ServerRegistry;
pub use mcp::service::BlokMcpService;
pub use mcp::sse::SseTransport;
