//! The `fetch_article_content` tool: fetch a page and extract its article as Markdown.

use serde::Deserialize;
use serde_json::{json, Value};

use rss_reader::extract_article;

use crate::fetch::HttpFetcher;
use crate::types::{McpError, McpResult, ToolAnnotations, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct ArticleParams {
    url: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "fetch_article_content".to_string(),
        description: Some(
            "Fetch and extract article content from a URL, formatted as Markdown".to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "format": "uri", "description": "Article URL" }
            },
            "required": ["url"]
        }),
        annotations: Some(ToolAnnotations::read_only_web("Fetch Article Content")),
    }
}

pub async fn execute(args: Value, fetcher: &HttpFetcher) -> McpResult<ToolCallResult> {
    let params: ArticleParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;
    let url = super::validate_url(&params.url)?;

    let html = match fetcher.fetch_text(url.as_str()).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Article fetch failed for {url}: {e}");
            return Ok(ToolCallResult::error(format!(
                "Failed to fetch article content: {e}"
            )));
        }
    };

    // Report the URL as the caller gave it, not the normalized form.
    let article = extract_article(&params.url, &html);
    tracing::info!("Extracted article \"{}\" from {}", article.title, params.url);

    Ok(ToolCallResult::json(&article))
}
