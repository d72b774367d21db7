//! RSS Reader: main-content extraction, Markdown rendering, and feed parsing.

pub mod extract;
pub mod feed;
pub mod locator;
pub mod render;
pub mod title;
pub mod types;

pub use extract::{extract_article, ArticleExtractor};
pub use feed::{parse_feed, DEFAULT_ENTRY_LIMIT};
pub use locator::{ContentLocator, LocateStrategy, Located};
pub use render::{normalize, MarkdownRenderer};
pub use title::extract_title;
pub use types::*;
