//! Article extraction pipeline: parse → locate → prune → render → normalize.

use scraper::Html;

use crate::locator::ContentLocator;
use crate::render::MarkdownRenderer;
use crate::title::extract_title;
use crate::types::ExtractionResult;

/// Runs the extraction pipeline over single documents.
pub struct ArticleExtractor {
    locator: &'static ContentLocator,
    renderer: MarkdownRenderer,
}

impl ArticleExtractor {
    pub fn new() -> Self {
        Self {
            locator: ContentLocator::shared(),
            renderer: MarkdownRenderer::new(),
        }
    }

    /// Extract the article from `html`. `url` is carried through as metadata only.
    pub fn extract(&self, url: &str, html: &str) -> ExtractionResult {
        let mut document = Html::parse_document(html);
        if !document.errors.is_empty() {
            tracing::debug!("HTML parser recovered from {} errors", document.errors.len());
        }

        let title = extract_title(&document);
        let inner_html = self.locator.isolate(&mut document);
        let content = self.renderer.render(&inner_html);

        tracing::debug!(
            "Extracted \"{title}\" from {url}: {} bytes html -> {} bytes markdown",
            inner_html.len(),
            content.len()
        );

        ExtractionResult::new(title, content, url)
    }
}

impl Default for ArticleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract an article with a freshly built [`ArticleExtractor`].
pub fn extract_article(url: &str, html: &str) -> ExtractionResult {
    ArticleExtractor::new().extract(url, html)
}
