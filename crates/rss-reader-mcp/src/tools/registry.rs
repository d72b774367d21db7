//! Tool registration and dispatch.

use serde_json::Value;

use crate::fetch::HttpFetcher;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{fetch_article_content, fetch_feed_entries};

pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![
            fetch_feed_entries::definition(),
            fetch_article_content::definition(),
        ]
    }

    pub async fn call(
        name: &str,
        arguments: Option<Value>,
        fetcher: &HttpFetcher,
    ) -> McpResult<ToolCallResult> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            "fetch_feed_entries" => fetch_feed_entries::execute(args, fetcher).await,
            "fetch_article_content" => fetch_article_content::execute(args, fetcher).await,
            _ => Err(McpError::ToolNotFound(name.to_string())),
        }
    }
}
