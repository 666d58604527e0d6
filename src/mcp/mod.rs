pub mod handlers;
pub mod http;
pub mod registry;
pub mod service;
pub mod sse;
pub mod stdio;
pub mod tooling;

pub use http::{build_router, HttpState};
pub use registry::ServerRegistry;
pub use service::BlokMcpService;
pub use sse::SseTransport;
