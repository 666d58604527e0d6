use rmcp::model::{CallToolResult, Content, ErrorData};
use serde_json::Value;

use super::common::{api_error, required_str};
use crate::mcp::service::BlokMcpService;

pub async fn handle(service: &BlokMcpService, arguments: &Value) -> Result<CallToolResult, ErrorData> {
    let page_id = required_str(arguments, "page_id")?;

    let detail = service.client.get_page(page_id).await.map_err(api_error)?;

    let mut text = format!("# {}\n", detail.page.title);
    if let Some(updated) = &detail.page.updated_at {
        text.push_str(&format!("Updated: {}\n", updated.to_rfc3339()));
    }
    text.push('\n');

    if detail.blocks.is_empty() {
        text.push_str("(page has no blocks)\n");
    } else {
        for block in &detail.blocks {
            match block.kind.as_str() {
                "heading" => text.push_str(&format!("## {}\n", block.text)),
                "todo" => text.push_str(&format!("- [ ] {}\n", block.text)),
                "code" => text.push_str(&format!("```\n{}\n```\n", block.text)),
                _ => text.push_str(&format!("{}\n", block.text)),
            }
        }
    }

    Ok(CallToolResult::success(vec![Content::text(text)]))
}
