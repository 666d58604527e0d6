use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ToolCatalogEntry {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

pub fn tool_catalog() -> Vec<ToolCatalogEntry> {
    vec![
        ToolCatalogEntry {
            name: "list_pages",
            title: "List Pages",
            description: "List pages in the Blok workspace.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "limit": {"type": "integer", "minimum": 1, "maximum": 100, "default": 25},
                    "cursor": {"type": "string"}
                }
            }),
        },
        ToolCatalogEntry {
            name: "get_page",
            title: "Get Page",
            description: "Fetch one page with its block content.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "page_id": {"type": "string"}
                },
                "required": ["page_id"]
            }),
        },
        ToolCatalogEntry {
            name: "search_blocks",
            title: "Search Blocks",
            description: "Full-text search across workspace blocks.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "limit": {"type": "integer", "minimum": 1, "maximum": 50, "default": 10}
                },
                "required": ["query"]
            }),
        },
        ToolCatalogEntry {
            name: "create_block",
            title: "Create Block",
            description: "Append a block to a page.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "page_id": {"type": "string"},
                    "type": {"type": "string", "enum": ["text", "heading", "todo", "code"], "default": "text"},
                    "text": {"type": "string"}
                },
                "required": ["page_id", "text"]
            }),
        },
        ToolCatalogEntry {
            name: "auth_status",
            title: "Auth Status",
            description: "Report whether this server session holds a Blok credential.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}

pub fn schema_to_object_map(schema: &Value) -> Arc<Map<String, Value>> {
    match schema {
        Value::Object(map) => Arc::new(map.clone()),
        _ => Arc::new(Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for entry in tool_catalog() {
            assert!(seen.insert(entry.name), "duplicate tool name {}", entry.name);
        }
    }

    #[test]
    fn catalog_schemas_are_objects() {
        for entry in tool_catalog() {
            assert!(
                entry.input_schema.is_object(),
                "{} schema should be a JSON object",
                entry.name
            );
        }
    }
}
