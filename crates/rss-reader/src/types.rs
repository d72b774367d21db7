//! Core data types for extracted articles and parsed feeds.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Title used when a document has neither a `<title>` nor an `<h1>`.
pub const UNTITLED_ARTICLE: &str = "Untitled Article";

/// Feed title used when the channel carries none.
pub const UNTITLED_FEED: &str = "Untitled Feed";

/// Entry title used when an item carries none.
pub const UNTITLED_ENTRY: &str = "Untitled";

/// An article pulled out of a web page and rendered as Markdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub title: String,
    pub content: String,
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(serialize_with = "millis_rfc3339")]
    pub extracted_at: DateTime<Utc>,
}

/// RFC 3339 in UTC with millisecond precision, e.g. `2025-01-02T03:04:05.123Z`.
fn millis_rfc3339<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl ExtractionResult {
    /// Build a result stamped with the current time.
    pub fn new(title: String, content: String, source_url: &str) -> Self {
        Self {
            title,
            content,
            source_url: source_url.to_string(),
            extracted_at: Utc::now(),
        }
    }
}

/// Channel-level information plus the leading entries of a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedInfo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_build_date: Option<String>,
    pub entries: Vec<FeedEntry>,
}

/// A single item (RSS) or entry (Atom).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
}

/// Errors that can occur in the reader library.
#[derive(thiserror::Error, Debug)]
pub enum ReaderError {
    #[error("Feed error: {0}")]
    Feed(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Convenience result type.
pub type ReaderResult<T> = Result<T, ReaderError>;
