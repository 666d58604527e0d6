use rmcp::model::{CallToolResult, Content, ErrorData};
use serde_json::Value;

use super::common::{api_error, optional_str, optional_u32};
use crate::mcp::service::BlokMcpService;

pub async fn handle(service: &BlokMcpService, arguments: &Value) -> Result<CallToolResult, ErrorData> {
    let limit = optional_u32(arguments, "limit");
    let cursor = optional_str(arguments, "cursor");

    let listing = service
        .client
        .list_pages(limit, cursor)
        .await
        .map_err(api_error)?;

    let mut text = if listing.pages.is_empty() {
        "No pages found in this workspace.\n".to_string()
    } else {
        let mut text = format!("Found {} page(s):\n\n", listing.pages.len());
        for page in &listing.pages {
            text.push_str(&format!("- {} (id: {})", page.title, page.id));
            if let Some(updated) = &page.updated_at {
                text.push_str(&format!(", updated {}", updated.to_rfc3339()));
            }
            text.push('\n');
        }
        text
    };

    if let Some(cursor) = listing.next_cursor {
        text.push_str(&format!("\nMore pages available; pass cursor: {}\n", cursor));
    }

    Ok(CallToolResult::success(vec![Content::text(text)]))
}
