//! Article content location: picks the element most likely to hold the article body.
//!
//! Selection is a fixed, ordered selector table with a paragraph-density
//! fallback and the document body as the last resort. Once chosen, the
//! element is pruned of navigation, chrome and other noise in place.

use std::collections::HashMap;
use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

/// Content selectors, in priority order. The first one that matches wins.
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    r#"[role="main"]"#,
    ".content",
    ".post-content",
    ".entry-content",
    ".article-content",
    "main",
    ".container",
];

/// Descendants matching any of these are removed from the selected element.
pub const NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "nav",
    "header",
    "footer",
    ".sidebar",
    ".navigation",
    ".menu",
    ".ads",
    ".advertisement",
    ".social-share",
    ".comments",
    ".related-posts",
    ".author-bio",
];

/// How the content element was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    /// Matched an entry of [`CONTENT_SELECTORS`].
    Selector(&'static str),
    /// Ancestor with the most `<p>` descendants; carries that count.
    Density { paragraphs: usize },
    /// Nothing better was found.
    Body,
}

/// The element chosen as article body, together with the rule that chose it.
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    pub element: ElementRef<'a>,
    pub strategy: LocateStrategy,
}

/// Compiled selector tables for content location and pruning.
pub struct ContentLocator {
    content: Vec<(&'static str, Selector)>,
    noise: Vec<Selector>,
    paragraph: Selector,
    body: Selector,
}

impl ContentLocator {
    /// Compile the selector tables.
    pub fn new() -> Self {
        Self {
            content: CONTENT_SELECTORS
                .iter()
                .map(|&raw| (raw, compile(raw)))
                .collect(),
            noise: NOISE_SELECTORS.iter().map(|raw| compile(raw)).collect(),
            paragraph: compile("p"),
            body: compile("body"),
        }
    }

    /// Process-wide locator; the tables are immutable once compiled.
    pub fn shared() -> &'static ContentLocator {
        static LOCATOR: OnceLock<ContentLocator> = OnceLock::new();
        LOCATOR.get_or_init(ContentLocator::new)
    }

    /// Choose the content element. Never fails: the body is the final fallback.
    pub fn locate<'a>(&self, document: &'a Html) -> Located<'a> {
        for (raw, selector) in &self.content {
            if let Some(element) = document.select(selector).next() {
                return Located {
                    element,
                    strategy: LocateStrategy::Selector(raw),
                };
            }
        }

        let body = self.body(document);

        if let Some((element, paragraphs)) = self.densest_ancestor(document, body) {
            return Located {
                element,
                strategy: LocateStrategy::Density { paragraphs },
            };
        }

        Located {
            element: body,
            strategy: LocateStrategy::Body,
        }
    }

    /// Locate the content element, strip its noise descendants in place,
    /// and return its cleaned inner markup.
    pub fn isolate(&self, document: &mut Html) -> String {
        let (root, noise): (_, Vec<_>) = {
            let located = self.locate(document);
            tracing::debug!("Content located via {:?}", located.strategy);
            let noise = self.noise_within(located.element).map(|el| el.id()).collect();
            (located.element.id(), noise)
        };

        if !noise.is_empty() {
            tracing::debug!("Pruning {} noise elements", noise.len());
        }

        for id in noise {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        document
            .tree
            .get(root)
            .and_then(ElementRef::wrap)
            .map(|element| element.inner_html())
            .unwrap_or_default()
    }

    /// Count noise descendants still present under `root`.
    pub fn noise_count(&self, root: ElementRef<'_>) -> usize {
        self.noise_within(root).count()
    }

    fn noise_within<'a>(&'a self, root: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.noise.iter().flat_map(move |selector| root.select(selector))
    }

    fn body<'a>(&self, document: &'a Html) -> ElementRef<'a> {
        document
            .select(&self.body)
            .next()
            .unwrap_or_else(|| document.root_element())
    }

    /// Tally `<p>` descendants per ancestor (stopping below the body) and
    /// return the ancestor with the strictly highest tally.
    ///
    /// Ties go to the ancestor first seen during the scan.
    fn densest_ancestor<'a>(
        &self,
        document: &'a Html,
        body: ElementRef<'a>,
    ) -> Option<(ElementRef<'a>, usize)> {
        let mut counts = HashMap::new();
        let mut seen = Vec::new();

        for paragraph in document.select(&self.paragraph) {
            let ancestors = paragraph
                .ancestors()
                .take_while(|node| node.id() != body.id())
                .filter_map(ElementRef::wrap);

            for ancestor in ancestors {
                let count = counts.entry(ancestor.id()).or_insert_with(|| {
                    seen.push(ancestor);
                    0usize
                });
                *count += 1;
            }
        }

        let mut best: Option<(ElementRef<'a>, usize)> = None;
        for element in seen {
            let count = counts.get(&element.id()).copied().unwrap_or(0);
            if count > best.map_or(0, |(_, max)| max) {
                best = Some((element, count));
            }
        }
        best
    }
}

impl Default for ContentLocator {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(raw: &str) -> Selector {
    Selector::parse(raw).expect("static selector is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(located: &Located<'_>) -> String {
        located.element.value().name().to_string()
    }

    fn id_attr<'a>(located: &Located<'a>) -> Option<&'a str> {
        located.element.value().attr("id")
    }

    #[test]
    fn test_selector_priority_prefers_article() {
        let html = Html::parse_document(
            r#"<html><body>
                <div class="content"><p>class content</p></div>
                <article><p>article content</p></article>
            </body></html>"#,
        );
        let located = ContentLocator::new().locate(&html);
        assert_eq!(tag(&located), "article");
        assert_eq!(located.strategy, LocateStrategy::Selector("article"));
    }

    #[test]
    fn test_selector_order_role_main_before_main() {
        let html = Html::parse_document(
            r#"<html><body>
                <main id="plain"><p>a</p></main>
                <div role="main" id="role"><p>b</p></div>
            </body></html>"#,
        );
        let located = ContentLocator::new().locate(&html);
        assert_eq!(id_attr(&located), Some("role"));
    }

    #[test]
    fn test_first_match_in_document_order() {
        let html = Html::parse_document(
            r#"<html><body>
                <div class="post-content" id="first"></div>
                <div class="post-content" id="second"></div>
            </body></html>"#,
        );
        let located = ContentLocator::new().locate(&html);
        assert_eq!(id_attr(&located), Some("first"));
        assert_eq!(located.strategy, LocateStrategy::Selector(".post-content"));
    }

    #[test]
    fn test_density_fallback_picks_busiest_ancestor() {
        let html = Html::parse_document(
            r#"<html><body><div id="wrap">
                <section id="five"><p>1</p><p>2</p><p>3</p><p>4</p><p>5</p></section>
                <section id="two"><p>1</p><p>2</p></section>
            </div></body></html>"#,
        );
        let located = ContentLocator::new().locate(&html);

        // #wrap sees all seven paragraphs, so it outranks both sections.
        assert_eq!(id_attr(&located), Some("wrap"));
        assert_eq!(located.strategy, LocateStrategy::Density { paragraphs: 7 });
    }

    #[test]
    fn test_density_fallback_sibling_sections() {
        let html = Html::parse_document(
            r#"<html><body>
                <section id="two"><p>1</p><p>2</p></section>
                <section id="five"><p>1</p><p>2</p><p>3</p><p>4</p><p>5</p></section>
            </body></html>"#,
        );
        let located = ContentLocator::new().locate(&html);
        assert_eq!(id_attr(&located), Some("five"));
        assert_eq!(located.strategy, LocateStrategy::Density { paragraphs: 5 });
    }

    #[test]
    fn test_density_tie_keeps_first_seen() {
        let html = Html::parse_document(
            r#"<html><body>
                <div id="a"><p>1</p><p>2</p></div>
                <div id="b"><p>1</p><p>2</p></div>
            </body></html>"#,
        );
        let located = ContentLocator::new().locate(&html);
        assert_eq!(id_attr(&located), Some("a"));
    }

    #[test]
    fn test_paragraphs_directly_in_body_fall_back_to_body() {
        let html = Html::parse_document("<html><body><p>one</p><p>two</p></body></html>");
        let located = ContentLocator::new().locate(&html);
        assert_eq!(tag(&located), "body");
        assert_eq!(located.strategy, LocateStrategy::Body);
    }

    #[test]
    fn test_total_fallback_is_body() {
        let html = Html::parse_document("<html><body><span>nothing here</span></body></html>");
        let located = ContentLocator::new().locate(&html);
        assert_eq!(tag(&located), "body");
        assert_eq!(located.strategy, LocateStrategy::Body);
    }

    #[test]
    fn test_empty_document_still_yields_body() {
        let html = Html::parse_document("");
        let located = ContentLocator::new().locate(&html);
        assert_eq!(tag(&located), "body");
    }

    #[test]
    fn test_isolate_strips_noise() {
        let mut html = Html::parse_document(
            r#"<html><body><article>
                <header>Site header</header>
                <p>Body text</p>
                <script>evil()</script>
                <div class="sidebar"><ul class="menu"><li>Home</li></ul></div>
                <div class="social-share">Share</div>
                <footer>Footer</footer>
            </article></body></html>"#,
        );
        let inner = ContentLocator::new().isolate(&mut html);

        assert!(inner.contains("Body text"));
        for gone in ["Site header", "evil", "Home", "Share", "Footer"] {
            assert!(!inner.contains(gone), "{gone} should be pruned: {inner}");
        }
    }

    #[test]
    fn test_isolate_leaves_outside_noise_alone() {
        let mut html = Html::parse_document(
            r#"<html><body><nav id="outer">Top nav</nav><article><p>Text</p></article></body></html>"#,
        );
        let locator = ContentLocator::new();
        locator.isolate(&mut html);

        let nav = Selector::parse("nav#outer").unwrap();
        assert_eq!(html.select(&nav).count(), 1);
    }

    #[test]
    fn test_pruning_is_idempotent() {
        let mut html = Html::parse_document(
            r#"<html><body><article>
                <nav>links</nav><p>Keep</p><style>p{}</style><div class="ads">buy</div>
            </article></body></html>"#,
        );
        let locator = ContentLocator::new();

        let first = locator.isolate(&mut html);
        assert_eq!(locator.noise_count(locator.locate(&html).element), 0);

        let second = locator.isolate(&mut html);
        assert_eq!(first, second);
    }
}
