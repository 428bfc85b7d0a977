//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
//! Every call acts as the configured operator, who holds admin rights.
use crate::state::AppState;
use crate::tools::cache::{CacheDeleteParams, CacheListParams, delete_impl, list_impl};
use crate::tools::note_upsert::upsert_impl;

use cairn_core::{NoteSubmission, Principal};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for cairn.
#[derive(Clone)]
pub struct CairnServer {
    state: AppState,
    principal: Principal,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl CairnServer {
    /// Create a new server handler acting as the configured operator.
    pub fn new(state: AppState) -> Self {
        let principal = Principal::admin(&*state.operator_id);
        Self { state, principal, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "List or search cache keys on an instance. Returns up to `limit` keys from each of the persistent and memory backends."
    )]
    async fn cache_list(&self, params: Parameters<CacheListParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.state, &self.principal, params.0).await
    }

    #[tool(description = "Delete one key from the persistent or memory cache of an instance. Deleting a missing key succeeds.")]
    async fn cache_delete(&self, params: Parameters<CacheDeleteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.state, &self.principal, params.0).await
    }

    /// Create or update a note.
    ///
    /// Without an id a new note is created; with one, the operator's note of that id is updated.
    #[tool(description = "Create a note (no id) or update an existing note (id). Title and content are required.")]
    async fn note_upsert(&self, params: Parameters<NoteSubmission>) -> Result<CallToolResult, McpError> {
        upsert_impl(&self.state, &self.principal, params.0).await
    }
}

impl ServerHandler for CairnServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "cairn".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
