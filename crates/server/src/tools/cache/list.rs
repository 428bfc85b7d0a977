//! cache_list tool implementation.
//!
//! Lists or searches keys in both cache backends of an instance.

use cairn_core::cache::DEFAULT_LIST_LIMIT;
use cairn_core::{CacheListRequest, CacheListResult, Principal};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Parameters for the cache_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheListParams {
    /// Substring to filter keys by. Empty or absent lists every key.
    pub query: Option<String>,

    /// Keys returned per backend (1-10000, default 100).
    pub limit: Option<u32>,

    /// Instance to inspect (default: this instance).
    pub instance: Option<String>,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    /// Instance that answered.
    pub instance: String,

    #[serde(flatten)]
    pub keys: CacheListResult,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(
    state: &AppState, principal: &Principal, params: CacheListParams,
) -> Result<CallToolResult, McpError> {
    let request = CacheListRequest::new(params.query, params.limit.unwrap_or(DEFAULT_LIST_LIMIT))?;
    let instance = params.instance.filter(|id| !id.is_empty());

    let keys = state
        .list_cache_keys(principal, instance.as_deref(), &request, None)
        .await?;

    let output = CacheListOutput {
        instance: instance.unwrap_or_else(|| state.directory.current().to_string()),
        keys,
    };
    let json = serde_json::to_string_pretty(&output).map_err(cairn_core::Error::from)?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
