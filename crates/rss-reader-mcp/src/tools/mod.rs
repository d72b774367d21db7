//! MCP tool implementations.

pub mod fetch_article_content;
pub mod fetch_feed_entries;
pub mod registry;

pub use registry::ToolRegistry;

use crate::types::{McpError, McpResult};

/// Accept only absolute http(s) URLs.
pub(crate) fn validate_url(raw: &str) -> McpResult<url::Url> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| McpError::InvalidParams(format!("Invalid URL format: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(McpError::InvalidParams(format!(
            "Invalid URL format: unsupported scheme '{other}'"
        ))),
    }
}
