//! cache_delete tool implementation.

use cairn_core::Principal;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Parameters for the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteParams {
    /// Key to remove.
    #[serde(rename = "cacheKey")]
    pub cache_key: String,

    /// Backend holding the key: `persistent` or `memory`.
    #[serde(rename = "type")]
    pub backend: String,

    /// Instance holding the key.
    pub instance: String,
}

/// Output from the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteOutput {
    pub success: bool,
}

/// Implementation of the cache_delete tool.
///
/// Deleting a key that is not there still succeeds.
pub async fn delete_impl(
    state: &AppState, principal: &Principal, params: CacheDeleteParams,
) -> Result<CallToolResult, McpError> {
    state
        .delete_cache_key(principal, Some(&params.instance), &params.cache_key, &params.backend, None)
        .await?;

    let json = serde_json::to_string_pretty(&CacheDeleteOutput { success: true }).map_err(cairn_core::Error::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
