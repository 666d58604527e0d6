use rmcp::model::{CallToolResult, Content, ErrorData};
use serde_json::Value;

use super::common::{api_error, optional_u32, required_str};
use crate::mcp::service::BlokMcpService;

pub async fn handle(service: &BlokMcpService, arguments: &Value) -> Result<CallToolResult, ErrorData> {
    let query = required_str(arguments, "query")?;
    let limit = optional_u32(arguments, "limit");

    let results = service
        .client
        .search_blocks(query, limit)
        .await
        .map_err(api_error)?;

    let text = if results.blocks.is_empty() {
        format!("No blocks matched '{}'.\n", query)
    } else {
        let mut text = format!(
            "Found {} block(s) matching '{}'{}:\n\n",
            results.blocks.len(),
            query,
            results
                .total
                .map(|t| format!(" ({} total)", t))
                .unwrap_or_default()
        );
        for block in &results.blocks {
            let snippet: String = block.text.chars().take(200).collect();
            text.push_str(&format!(
                "- [{}] {} (page: {}, block: {})\n",
                block.kind, snippet, block.page_id, block.id
            ));
        }
        text
    };

    Ok(CallToolResult::success(vec![Content::text(text)]))
}
