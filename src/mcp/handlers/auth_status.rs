use rmcp::model::{CallToolResult, Content, ErrorData};
use serde_json::Value;

use crate::mcp::service::BlokMcpService;

pub async fn handle(service: &BlokMcpService, _arguments: &Value) -> Result<CallToolResult, ErrorData> {
    let text = if service.session.is_authenticated() {
        format!(
            "Authenticated against {}. Tool calls will use the active session credential.",
            service.client.base_url()
        )
    } else {
        "Not authenticated. Set BLOK_MCP_ACCESS_TOKEN or BLOK_MCP_EMAIL/BLOK_MCP_PASSWORD, \
         or send an X-Session-Token header when opening the SSE connection."
            .to_string()
    };

    Ok(CallToolResult::success(vec![Content::text(text)]))
}
