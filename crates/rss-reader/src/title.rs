//! Document title extraction.

use std::sync::OnceLock;

use scraper::{Html, Selector};

use crate::types::UNTITLED_ARTICLE;

/// Title sources, in order of preference.
const TITLE_SELECTORS: &[&str] = &["title", "h1"];

/// Pick the article title: `<title>`, then the first `<h1>`, then a placeholder.
///
/// Empty or whitespace-only candidates are skipped. The result is always
/// trimmed and never empty.
pub fn extract_title(document: &Html) -> String {
    title_selectors()
        .iter()
        .find_map(|selector| {
            let text: String = document.select(selector).next()?.text().collect();
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| UNTITLED_ARTICLE.to_string())
}

fn title_selectors() -> &'static [Selector] {
    static SELECTORS: OnceLock<Vec<Selector>> = OnceLock::new();
    SELECTORS.get_or_init(|| {
        TITLE_SELECTORS
            .iter()
            .map(|raw| Selector::parse(raw).expect("static selector is valid"))
            .collect()
    })
}
