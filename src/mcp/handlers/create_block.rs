use rmcp::model::{CallToolResult, Content, ErrorData};
use serde_json::Value;

use super::common::{api_error, optional_str, required_str};
use crate::mcp::service::BlokMcpService;

pub async fn handle(service: &BlokMcpService, arguments: &Value) -> Result<CallToolResult, ErrorData> {
    let page_id = required_str(arguments, "page_id")?;
    let text = required_str(arguments, "text")?;
    let kind = optional_str(arguments, "type").unwrap_or("text");

    let block = service
        .client
        .create_block(page_id, kind, text)
        .await
        .map_err(api_error)?;

    Ok(CallToolResult::success(vec![Content::text(format!(
        "Created {} block {} on page {}.",
        block.kind, block.id, block.page_id
    ))]))
}
