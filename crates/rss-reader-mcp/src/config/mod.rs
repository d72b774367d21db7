//! Configuration loading and resolution.
//!
//! Every setting resolves as CLI flag > environment variable > default.

use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// How the server talks to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Stdio,
    HttpStream,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(TransportKind::Stdio),
            "httpStream" | "http" => Ok(TransportKind::HttpStream),
            other => Err(format!("Unknown transport: {other}")),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Stdio => f.write_str("stdio"),
            TransportKind::HttpStream => f.write_str("httpStream"),
        }
    }
}

/// Settings for the outbound HTTP client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    /// Resolve from flags, then `RSS_READER_TIMEOUT_SECS` / `RSS_READER_USER_AGENT`.
    pub fn resolve(timeout_secs: Option<u64>, user_agent: Option<String>) -> Self {
        let timeout_secs = timeout_secs
            .or_else(|| env_parse("RSS_READER_TIMEOUT_SECS"))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let user_agent = user_agent
            .or_else(|| std::env::var("RSS_READER_USER_AGENT").ok())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        Self {
            timeout: Duration::from_secs(timeout_secs),
            user_agent,
        }
    }
}

/// Resolve the transport from a flag or `TRANSPORT`.
pub fn resolve_transport(explicit: Option<&str>) -> TransportKind {
    pick_transport(explicit, std::env::var("TRANSPORT").ok())
}

/// Resolve the HTTP bind address from flags or `MCP_SERVER_HOST` / `PORT`.
pub fn resolve_bind_addr(host: Option<&str>, port: Option<u16>) -> String {
    let host = host
        .map(str::to_string)
        .or_else(|| std::env::var("MCP_SERVER_HOST").ok())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = port
        .or_else(|| env_parse("PORT"))
        .unwrap_or(DEFAULT_PORT);
    format!("{host}:{port}")
}

/// Resolve the bearer token for the HTTP transport: flag > `MCP_AUTH_TOKEN`.
pub fn resolve_token(explicit: Option<String>) -> Option<String> {
    explicit
        .or_else(|| std::env::var("MCP_AUTH_TOKEN").ok())
        .filter(|token| !token.is_empty())
}

fn pick_transport(explicit: Option<&str>, env: Option<String>) -> TransportKind {
    let Some(raw) = explicit.map(str::to_string).or(env) else {
        return TransportKind::Stdio;
    };
    raw.parse().unwrap_or_else(|e| {
        tracing::warn!("{e}; falling back to stdio");
        TransportKind::Stdio
    })
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {key}={raw:?}");
            None
        }
    }
}
