//! The shared MCP server instance: tool dispatch plus the session it owns.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use rmcp::model::*;
use serde_json::Value;
use tracing::info;

use super::handlers;
use super::tooling::{schema_to_object_map, tool_catalog};
use crate::api::BlokClient;
use crate::auth::{AuthPosture, SessionManager};
use crate::core::config::{self, BlokConfig};

/// One instance per process in HTTP mode (see [`super::registry`]), one per
/// invocation in stdio mode. Cloning shares the underlying client and
/// session; the protocol run loop takes a clone per connection.
#[derive(Clone, Debug)]
pub struct BlokMcpService {
    pub client: Arc<BlokClient>,
    pub session: Arc<SessionManager>,
}

impl BlokMcpService {
    /// Construct a server with the resolved authentication posture applied.
    ///
    /// `AutoLogin` performs the credential exchange here, so a failure
    /// surfaces to the caller instead of haunting the first tool call.
    pub async fn new(posture: AuthPosture, config: &BlokConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config::http_timeout_secs()))
            .connect_timeout(Duration::from_secs(config::http_connect_timeout_secs()))
            .build()?;

        let session = Arc::new(SessionManager::new());
        let client = Arc::new(BlokClient::new(
            &config.api_url,
            http_client,
            Arc::clone(&session),
        )?);

        match posture {
            AuthPosture::PreAuthToken(token) => {
                session.set_token(token);
                info!("session initialized from pre-fetched access token");
            }
            AuthPosture::AutoLogin { email, password } => {
                let tokens = client.login(&email, &password).await?;
                session.set_token(tokens.access_token);
                info!("session initialized via auto-login");
            }
            AuthPosture::Unauthenticated => {
                info!("starting unauthenticated; a session token may arrive via X-Session-Token");
            }
        }

        Ok(Self { client, session })
    }
}

impl rmcp::ServerHandler for BlokMcpService {
    fn get_info(&self) -> ServerInfo {
        let server_info = Implementation::from_build_env()
            .with_title("Blok MCP")
            .with_description(
                "Read and edit Blok workspace pages and blocks over the Model Context Protocol.",
            );

        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::LATEST)
            .with_server_info(server_info)
            .with_instructions(
                "Use these tools to browse, search, and append to pages in the connected Blok workspace.",
            )
    }

    async fn list_tools(
        &self,
        _page: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = tool_catalog()
            .into_iter()
            .map(|entry| {
                Tool::new_with_raw(
                    entry.name,
                    Some(Cow::Borrowed(entry.description)),
                    schema_to_object_map(&entry.input_schema),
                )
                .with_title(entry.title.to_string())
            })
            .collect();

        Ok(ListToolsResult {
            tools,
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        info!("MCP tool call: {}", request.name);

        // Tools with an all-optional schema may arrive with no arguments object.
        let arguments = request
            .arguments
            .as_ref()
            .map(|map| Value::Object(map.clone()))
            .unwrap_or_else(|| Value::Object(Default::default()));

        match request.name.as_ref() {
            "list_pages" => handlers::list_pages::handle(self, &arguments).await,
            "get_page" => handlers::get_page::handle(self, &arguments).await,
            "search_blocks" => handlers::search_blocks::handle(self, &arguments).await,
            "create_block" => handlers::create_block::handle(self, &arguments).await,
            "auth_status" => handlers::auth_status::handle(self, &arguments).await,
            _ => Err(ErrorData::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", request.name),
                None,
            )),
        }
    }
}
