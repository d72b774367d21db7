//! The `fetch_feed_entries` tool: fetch an RSS/Atom feed and list its latest entries.

use serde::Deserialize;
use serde_json::{json, Value};

use rss_reader::{parse_feed, DEFAULT_ENTRY_LIMIT};

use crate::fetch::HttpFetcher;
use crate::types::{McpError, McpResult, ToolAnnotations, ToolCallResult, ToolDefinition};

const MAX_ENTRY_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
struct FeedParams {
    url: String,
    #[serde(default)]
    limit: Option<i64>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "fetch_feed_entries".to_string(),
        description: Some("Fetch RSS feed entries from a given URL".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "format": "uri", "description": "Feed URL" },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_ENTRY_LIMIT,
                    "default": DEFAULT_ENTRY_LIMIT,
                    "description": "Maximum number of entries to return"
                }
            },
            "required": ["url"]
        }),
        annotations: Some(ToolAnnotations::read_only_web("Fetch RSS Feed Entries")),
    }
}

pub async fn execute(args: Value, fetcher: &HttpFetcher) -> McpResult<ToolCallResult> {
    let params: FeedParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;
    let url = super::validate_url(&params.url)?;

    let limit = match params.limit {
        None => DEFAULT_ENTRY_LIMIT,
        Some(n) if (1..=MAX_ENTRY_LIMIT).contains(&n) => n as usize,
        Some(n) => {
            return Err(McpError::InvalidParams(format!(
                "'limit' must be between 1 and {MAX_ENTRY_LIMIT}, got {n}"
            )));
        }
    };

    let feed = match fetch_and_parse(fetcher, url.as_str(), &params.url, limit).await {
        Ok(feed) => feed,
        Err(e) => {
            tracing::warn!("Feed fetch failed for {url}: {e}");
            return Ok(ToolCallResult::error(format!("Failed to fetch RSS feed: {e}")));
        }
    };

    tracing::info!("Fetched {} entries from {}", feed.entries.len(), params.url);
    Ok(ToolCallResult::json(&feed))
}

async fn fetch_and_parse(
    fetcher: &HttpFetcher,
    url: &str,
    source_url: &str,
    limit: usize,
) -> McpResult<rss_reader::FeedInfo> {
    let bytes = fetcher.fetch_bytes(url).await?;
    Ok(parse_feed(&bytes, source_url, limit)?)
}
