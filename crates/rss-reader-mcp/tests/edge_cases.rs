//! Edge case integration tests for rss-reader-mcp.
//!
//! Drives the protocol handler against a local mock web server, covering
//! the handshake, both tools, argument validation and upstream failures.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rss_reader_mcp::config::FetchConfig;
use rss_reader_mcp::fetch::HttpFetcher;
use rss_reader_mcp::protocol::ProtocolHandler;
use rss_reader_mcp::transport::StdioTransport;
use rss_reader_mcp::types::*;

// ─────────────────────── helpers ───────────────────────

fn handler_with_timeout(timeout: Duration) -> ProtocolHandler {
    let config = FetchConfig {
        timeout,
        ..FetchConfig::default()
    };
    ProtocolHandler::new(Arc::new(HttpFetcher::new(&config).unwrap()))
}

fn handler() -> ProtocolHandler {
    handler_with_timeout(Duration::from_secs(10))
}

/// Build an MCP JSON-RPC request.
fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

/// Build an initialize request.
fn init_request() -> Value {
    mcp_request(
        0,
        "initialize",
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0" }
        }),
    )
}

fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    mcp_request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

/// Send a JSON-RPC message through the handler and return the response.
async fn send(handler: &ProtocolHandler, msg: Value) -> Option<Value> {
    let parsed: JsonRpcMessage = serde_json::from_value(msg).unwrap();
    handler.handle_message(parsed).await
}

/// Send and unwrap the response.
async fn send_unwrap(handler: &ProtocolHandler, msg: Value) -> Value {
    send(handler, msg).await.expect("expected response")
}

/// Decode the JSON document carried in a successful tool result.
fn tool_payload(resp: &Value) -> Value {
    assert!(resp["result"]["isError"].is_null(), "unexpected tool error: {resp}");
    let text = resp["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

fn tool_error_text(resp: &Value) -> String {
    assert_eq!(resp["result"]["isError"], true, "expected tool error: {resp}");
    resp["result"]["content"][0]["text"].as_str().unwrap().to_string()
}

async fn serve_page(server: &MockServer, route: &str, body: &str, content_type: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", content_type)
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

const ARTICLE_HTML: &str = "<html><head><title>Test</title></head><body>\
    <nav>evil</nav><article><p>Hello <strong>world</strong></p></article>\
    </body></html>";

const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Example Feed</title>
    <link>https://example.com</link>
    <description>Things happen</description>
    <item><title>One</title><link>https://example.com/1</link><dc:creator>Ann</dc:creator></item>
    <item><title>Two</title><link>https://example.com/2</link></item>
    <item><title>Three</title><link>https://example.com/3</link></item>
  </channel>
</rss>"#;

// ═══════════════════════ handshake ═══════════════════════

#[tokio::test]
async fn test_01_initialize_and_list_tools() {
    let h = handler();

    let resp = send_unwrap(&h, init_request()).await;
    assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(resp["result"]["serverInfo"]["name"], "rss-reader-mcp");
    assert!(resp["result"]["capabilities"]["tools"].is_object());
    assert!(resp["result"]["capabilities"].get("experimental").is_none());
    assert_eq!(h.client_info().await.unwrap().name, "test-client");

    let none = send(&h, json!({"jsonrpc": "2.0", "method": "notifications/initialized"})).await;
    assert!(none.is_none());
    assert!(h.is_initialized().await);

    let resp = send_unwrap(&h, mcp_request(1, "tools/list", json!({}))).await;
    let tools = resp["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["fetch_feed_entries", "fetch_article_content"]);
    for tool in tools {
        assert_eq!(tool["annotations"]["readOnlyHint"], true);
        assert_eq!(tool["annotations"]["openWorldHint"], true);
        assert_eq!(tool["inputSchema"]["required"], json!(["url"]));
    }
    println!("TEST 01 — Initialize and list tools: PASS");
}

#[tokio::test]
async fn test_02_ping_and_shutdown() {
    let h = handler();
    let resp = send_unwrap(&h, mcp_request(3, "ping", json!({}))).await;
    assert_eq!(resp["id"], 3);
    assert_eq!(resp["result"], json!({}));

    let resp = send_unwrap(&h, mcp_request(4, "shutdown", json!({}))).await;
    assert_eq!(resp["result"], json!({}));
    println!("TEST 02 — Ping and shutdown: PASS");
}

#[tokio::test]
async fn test_03_unknown_method_and_tool() {
    let h = handler();

    let resp = send_unwrap(&h, mcp_request(5, "resources/list", json!({}))).await;
    assert_eq!(resp["error"]["code"], -32601);
    assert_eq!(resp["id"], 5);

    let resp = send_unwrap(&h, tool_call(6, "delete_everything", json!({}))).await;
    assert_eq!(resp["error"]["code"], -32803);
    println!("TEST 03 — Unknown method and tool: PASS");
}

#[tokio::test]
async fn test_04_wrong_jsonrpc_version() {
    let h = handler();
    let msg = json!({"jsonrpc": "1.0", "id": 7, "method": "ping"});
    let resp = send_unwrap(&h, msg).await;
    assert_eq!(resp["error"]["code"], -32600);
    println!("TEST 04 — Wrong jsonrpc version: PASS");
}

// ═══════════════════════ fetch_article_content ═══════════════════════

#[tokio::test]
async fn test_05_article_extraction_end_to_end() {
    let server = MockServer::start().await;
    serve_page(&server, "/post", ARTICLE_HTML, "text/html; charset=utf-8").await;
    let url = format!("{}/post", server.uri());

    let h = handler();
    let resp = send_unwrap(
        &h,
        tool_call(10, "fetch_article_content", json!({ "url": url })),
    )
    .await;

    let article = tool_payload(&resp);
    assert_eq!(article["title"], "Test");
    assert_eq!(article["url"], url);
    let content = article["content"].as_str().unwrap();
    assert!(content.contains("Hello **world**"), "content was: {content}");
    assert!(!content.contains("evil"));
    assert!(article["extractedAt"].is_string());
    println!("TEST 05 — Article extraction end-to-end: PASS");
}

#[tokio::test]
async fn test_06_article_strips_badges_and_blank_runs() {
    let html = r#"<html><head><title>Crate</title></head><body><main>
        <p><a href="https://ci.example.com"><img src="badge.svg" alt="build"></a></p>
        <p>First</p><p></p><p></p><p>Second</p>
        </main></body></html>"#;
    let server = MockServer::start().await;
    serve_page(&server, "/readme", html, "text/html").await;

    let h = handler();
    let resp = send_unwrap(
        &h,
        tool_call(
            11,
            "fetch_article_content",
            json!({ "url": format!("{}/readme", server.uri()) }),
        ),
    )
    .await;

    let content = tool_payload(&resp)["content"].as_str().unwrap().to_string();
    assert!(!content.contains("badge.svg"), "content was: {content}");
    assert!(!content.contains("\n\n\n"));
    assert!(content.contains("First"));
    assert!(content.contains("Second"));
    println!("TEST 06 — Badges and blank runs removed: PASS");
}

#[tokio::test]
async fn test_07_article_http_404_is_tool_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let h = handler();
    let resp = send_unwrap(
        &h,
        tool_call(
            12,
            "fetch_article_content",
            json!({ "url": format!("{}/missing", server.uri()) }),
        ),
    )
    .await;

    assert!(resp["error"].is_null());
    assert_eq!(
        tool_error_text(&resp),
        "Failed to fetch article content: HTTP 404 Not Found"
    );
    println!("TEST 07 — HTTP 404 surfaces as tool error: PASS");
}

#[tokio::test]
async fn test_08_article_timeout_is_tool_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ARTICLE_HTML)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let h = handler_with_timeout(Duration::from_secs(1));
    let resp = send_unwrap(
        &h,
        tool_call(
            13,
            "fetch_article_content",
            json!({ "url": format!("{}/slow", server.uri()) }),
        ),
    )
    .await;

    assert_eq!(
        tool_error_text(&resp),
        "Failed to fetch article content: Request timed out after 1s"
    );
    println!("TEST 08 — Timeout surfaces as tool error: PASS");
}

#[tokio::test]
async fn test_09_invalid_urls_rejected_before_fetch() {
    let h = handler();
    for bad in ["not a url", "/relative", "ftp://example.com/a", ""] {
        let resp = send_unwrap(&h, tool_call(14, "fetch_article_content", json!({ "url": bad })))
            .await;
        assert_eq!(resp["error"]["code"], -32602, "url {bad:?} gave {resp}");
    }

    let resp = send_unwrap(&h, tool_call(15, "fetch_article_content", json!({}))).await;
    assert_eq!(resp["error"]["code"], -32602);
    println!("TEST 09 — Invalid URLs rejected: PASS");
}

// ═══════════════════════ fetch_feed_entries ═══════════════════════

#[tokio::test]
async fn test_10_feed_entries_with_limit() {
    let server = MockServer::start().await;
    serve_page(&server, "/feed.xml", RSS_FEED, "application/rss+xml").await;
    let url = format!("{}/feed.xml", server.uri());

    let h = handler();
    let resp = send_unwrap(
        &h,
        tool_call(20, "fetch_feed_entries", json!({ "url": url, "limit": 2 })),
    )
    .await;

    let feed = tool_payload(&resp);
    assert_eq!(feed["title"], "Example Feed");
    assert_eq!(feed["description"], "Things happen");
    let entries = feed["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["title"], "One");
    assert_eq!(entries[0]["link"], "https://example.com/1");
    assert_eq!(entries[0]["creator"], "Ann");
    assert_eq!(entries[1]["title"], "Two");
    println!("TEST 10 — Feed entries honour limit: PASS");
}

#[tokio::test]
async fn test_11_feed_default_limit() {
    let items: String = (0..15)
        .map(|i| format!("<item><title>Item {i}</title><link>https://e.com/{i}</link></item>"))
        .collect();
    let body = format!("<rss version=\"2.0\"><channel><title>Many</title>{items}</channel></rss>");
    let server = MockServer::start().await;
    serve_page(&server, "/many.xml", &body, "application/rss+xml").await;

    let h = handler();
    let resp = send_unwrap(
        &h,
        tool_call(
            21,
            "fetch_feed_entries",
            json!({ "url": format!("{}/many.xml", server.uri()) }),
        ),
    )
    .await;

    let feed = tool_payload(&resp);
    assert_eq!(feed["entries"].as_array().unwrap().len(), 10);
    println!("TEST 11 — Default limit of 10: PASS");
}

#[tokio::test]
async fn test_12_feed_limit_out_of_range() {
    let h = handler();
    for limit in [0, 101, -3] {
        let resp = send_unwrap(
            &h,
            tool_call(
                22,
                "fetch_feed_entries",
                json!({ "url": "https://example.com/feed.xml", "limit": limit }),
            ),
        )
        .await;
        assert_eq!(resp["error"]["code"], -32602, "limit {limit} gave {resp}");
    }
    println!("TEST 12 — Out-of-range limit rejected: PASS");
}

#[tokio::test]
async fn test_13_non_feed_body_is_tool_error() {
    let server = MockServer::start().await;
    serve_page(&server, "/page", ARTICLE_HTML, "text/html").await;

    let h = handler();
    let resp = send_unwrap(
        &h,
        tool_call(
            23,
            "fetch_feed_entries",
            json!({ "url": format!("{}/page", server.uri()) }),
        ),
    )
    .await;

    let text = tool_error_text(&resp);
    assert!(text.starts_with("Failed to fetch RSS feed: "), "got: {text}");
    println!("TEST 13 — Non-feed body surfaces as tool error: PASS");
}

#[tokio::test]
async fn test_14_feed_http_500_is_tool_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let h = handler();
    let resp = send_unwrap(
        &h,
        tool_call(
            24,
            "fetch_feed_entries",
            json!({ "url": format!("{}/broken.xml", server.uri()) }),
        ),
    )
    .await;

    assert_eq!(
        tool_error_text(&resp),
        "Failed to fetch RSS feed: HTTP 500 Internal Server Error"
    );
    println!("TEST 14 — HTTP 500 surfaces as tool error: PASS");
}

// ═══════════════════════ stdio transport ═══════════════════════

#[tokio::test]
async fn test_15_stdio_round_trip() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"t","version":"1"}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        "\n",
        "{not json\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
    );

    let transport = StdioTransport::new(handler());
    let reader = tokio::io::BufReader::new(input.as_bytes());
    let mut output: Vec<u8> = Vec::new();
    transport.serve(reader, &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    // initialize, parse error, tools/list; the notification and blank line are silent.
    assert_eq!(lines.len(), 3, "output was: {text}");
    assert_eq!(lines[0]["id"], 1);
    assert!(lines[1]["id"].is_null());
    assert_eq!(lines[1]["error"]["code"], -32700);
    assert_eq!(lines[2]["id"], 2);
    assert_eq!(lines[2]["result"]["tools"].as_array().unwrap().len(), 2);
    println!("TEST 15 — Stdio round trip: PASS");
}
