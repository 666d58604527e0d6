//! stdio transport: one long-lived session bound to the process streams.

use rmcp::ServiceExt;
use tracing::info;

use super::service::BlokMcpService;
use crate::auth::AuthPosture;
use crate::core::config::BlokConfig;

/// Run the protocol over stdin/stdout until the client hangs up or the
/// process is interrupted. Logging goes to stderr; stdout carries the
/// protocol stream.
pub async fn run() -> anyhow::Result<()> {
    let config = BlokConfig::from_env();
    let posture = AuthPosture::from_config(&config);
    info!("starting stdio transport ({})", posture.describe());
    info!("Blok API URL: {}", config.api_url);

    let service = BlokMcpService::new(posture, &config).await?;
    let running = service.serve(rmcp::transport::stdio()).await?;
    info!("MCP stdio server initialized; waiting for client session");

    tokio::select! {
        reason = running.waiting() => {
            info!("MCP stdio server stopped: {:?}", reason?);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received; shutting down");
        }
    }
    Ok(())
}
