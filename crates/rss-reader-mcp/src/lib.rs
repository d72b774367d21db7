//! RSS Reader MCP Server: feed listing and article extraction for LLM clients.

pub mod config;
pub mod fetch;
pub mod protocol;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::{FetchConfig, TransportKind};
pub use fetch::{FetchError, HttpFetcher};
pub use protocol::ProtocolHandler;
pub use transport::StdioTransport;
