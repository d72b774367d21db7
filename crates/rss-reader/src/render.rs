//! HTML → Markdown rendering and post-conversion cleanup.

use std::sync::OnceLock;

use htmd::options::{BulletListMarker, CodeBlockStyle, HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use regex::Regex;

/// Converts cleaned article markup to Markdown.
///
/// Headings use `#` markers, bullets use `-`, and code blocks are fenced.
/// Everything else follows the converter's defaults.
pub struct MarkdownRenderer {
    converter: HtmlToMarkdown,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let options = Options {
            heading_style: HeadingStyle::Atx,
            bullet_list_marker: BulletListMarker::Dash,
            code_block_style: CodeBlockStyle::Fenced,
            ..Default::default()
        };

        Self {
            converter: HtmlToMarkdown::builder().options(options).build(),
        }
    }

    /// Convert an HTML fragment and normalize the output.
    pub fn render(&self, html: &str) -> String {
        let markdown = self.converter.convert(html).unwrap_or_else(|e| {
            tracing::warn!("Markdown conversion failed: {e}");
            String::new()
        });
        normalize(&markdown)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn blank_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n(?:[ \t]*\n){2,}").expect("blank-run regex is valid"))
}

fn linked_images() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[!\[.*?\]\(.*?\)\]\(.*?\)").expect("linked-image regex is valid")
    })
}

/// Clean converter output.
///
/// Runs of three or more newlines collapse to one blank line, the text is
/// trimmed, image-inside-link markup (badges, tracking pixels) is dropped,
/// and the result is trimmed again. Lines holding only spaces or tabs count
/// as blank, and a badge removed from between two blocks does not leave a
/// wider gap behind.
pub fn normalize(markdown: &str) -> String {
    let collapsed = blank_runs().replace_all(markdown, "\n\n");
    let trimmed = collapsed.trim();
    let unbadged = linked_images().replace_all(trimmed, "");
    blank_runs().replace_all(&unbadged, "\n\n").trim().to_string()
}
