//! RSS Reader MCP Server entry point.

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use rss_reader_mcp::config::{self, FetchConfig, TransportKind};
use rss_reader_mcp::fetch::HttpFetcher;
use rss_reader_mcp::protocol::ProtocolHandler;
use rss_reader_mcp::tools::ToolRegistry;
use rss_reader_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "rss-reader-mcp",
    about = "MCP server for reading RSS feeds and extracting article content as Markdown",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Timeout for outbound requests, in seconds.
    /// Also reads from RSS_READER_TIMEOUT_SECS env var.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// User-Agent header sent with outbound requests.
    /// Also reads from RSS_READER_USER_AGENT env var.
    #[arg(long, global = true)]
    user_agent: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio.
    Serve,

    /// Start MCP server over HTTP.
    #[cfg(feature = "sse")]
    ServeHttp {
        /// Listen host. Also reads from MCP_SERVER_HOST env var.
        #[arg(long)]
        host: Option<String>,

        /// Listen port. Also reads from PORT env var.
        #[arg(long)]
        port: Option<u16>,

        /// Bearer token for authentication.
        /// Also reads from MCP_AUTH_TOKEN env var.
        #[arg(long)]
        token: Option<String>,
    },

    /// Extract one article and print the result as JSON.
    Extract {
        /// Article URL. Fetched unless --html-file is given.
        url: String,

        /// Read the page from a local file instead of fetching it.
        #[arg(long)]
        html_file: Option<std::path::PathBuf>,
    },

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   rss-reader-mcp completions bash > ~/.local/share/bash-completion/completions/rss-reader-mcp
    ///   rss-reader-mcp completions zsh > ~/.zfunc/_rss-reader-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let fetch_config = FetchConfig::resolve(cli.timeout_secs, cli.user_agent.clone());

    match cli.command {
        Some(Commands::Serve) => serve_stdio(&fetch_config).await?,

        #[cfg(feature = "sse")]
        Some(Commands::ServeHttp { host, port, token }) => {
            let addr = config::resolve_bind_addr(host.as_deref(), port);
            serve_http(&fetch_config, &addr, config::resolve_token(token)).await?;
        }

        None => match config::resolve_transport(None) {
            TransportKind::Stdio => serve_stdio(&fetch_config).await?,
            #[cfg(feature = "sse")]
            TransportKind::HttpStream => {
                let addr = config::resolve_bind_addr(None, None);
                serve_http(&fetch_config, &addr, config::resolve_token(None)).await?;
            }
            #[cfg(not(feature = "sse"))]
            TransportKind::HttpStream => {
                tracing::warn!("Built without the sse feature; using stdio transport");
                serve_stdio(&fetch_config).await?;
            }
        },

        Some(Commands::Extract { url, html_file }) => {
            let html = match html_file {
                Some(path) => std::fs::read_to_string(&path)?,
                None => HttpFetcher::new(&fetch_config)?.fetch_text(&url).await?,
            };
            let article = rss_reader::extract_article(&url, &html);
            println!("{}", serde_json::to_string_pretty(&article)?);
        }

        Some(Commands::Info) => {
            let capabilities = rss_reader_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::list_tools();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "rss-reader-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn build_handler(fetch_config: &FetchConfig) -> anyhow::Result<ProtocolHandler> {
    let fetcher = HttpFetcher::new(fetch_config)?;
    Ok(ProtocolHandler::new(Arc::new(fetcher)))
}

async fn serve_stdio(fetch_config: &FetchConfig) -> anyhow::Result<()> {
    let handler = build_handler(fetch_config)?;
    tracing::info!("RSS Reader MCP server running on {}", TransportKind::Stdio);
    StdioTransport::new(handler).run().await?;
    Ok(())
}

#[cfg(feature = "sse")]
async fn serve_http(
    fetch_config: &FetchConfig,
    addr: &str,
    token: Option<String>,
) -> anyhow::Result<()> {
    use rss_reader_mcp::transport::SseTransport;

    let handler = build_handler(fetch_config)?;
    tracing::info!(
        "RSS Reader MCP server running on {} at http://{addr}/mcp",
        TransportKind::HttpStream
    );
    if token.is_some() {
        tracing::info!("Auth: bearer token required");
    }

    SseTransport::new(handler, token).run(addr).await?;
    Ok(())
}
