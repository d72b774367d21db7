//! RSS 2.0, RSS 1.0 (RDF) and Atom feed parsing.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use scraper::Html;

use crate::types::{
    FeedEntry, FeedInfo, ReaderError, ReaderResult, UNTITLED_ENTRY, UNTITLED_FEED,
};

/// Entries returned when the caller does not ask for a specific count.
pub const DEFAULT_ENTRY_LIMIT: usize = 10;

/// Root elements that mark a document as a feed.
const FEED_ROOTS: &[&str] = &["rss", "rdf:RDF", "feed"];

/// Parse a feed document and keep its first `limit` entries.
///
/// `source_url` stands in for the channel link when the feed has none.
pub fn parse_feed(xml: &[u8], source_url: &str, limit: usize) -> ReaderResult<FeedInfo> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut is_feed = false;

    let mut channel = ChannelBuilder::default();
    let mut current: Option<EntryBuilder> = None;
    let mut entries = Vec::new();
    // Stack depth of an open `type="xhtml"` field; its child markup is text.
    let mut xhtml_depth: Option<usize> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = qualified_name(&e);
                if xhtml_depth.is_none() {
                    if stack.is_empty() && FEED_ROOTS.contains(&name.as_str()) {
                        is_feed = true;
                    }

                    match name.as_str() {
                        "item" | "entry" => current = Some(EntryBuilder::default()),
                        "link" | "category" => apply_attributes(
                            &e,
                            &name,
                            stack.last(),
                            &mut channel,
                            current.as_mut(),
                        ),
                        _ => {}
                    }

                    if attribute(&e, "type").as_deref() == Some("xhtml") {
                        xhtml_depth = Some(stack.len());
                    }
                    text.clear();
                }
                stack.push(name);
            }
            Event::Empty(e) if xhtml_depth.is_none() => {
                let name = qualified_name(&e);
                apply_attributes(&e, &name, stack.last(), &mut channel, current.as_mut());
            }
            Event::Text(e) => {
                if xhtml_depth.is_some() && !text.is_empty() {
                    text.push(' ');
                }
                match e.unescape() {
                    Ok(unescaped) => text.push_str(&unescaped),
                    Err(_) => text.push_str(&String::from_utf8_lossy(&e)),
                }
            }
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::End(_) => {
                if let Some(name) = stack.pop() {
                    let nested = xhtml_depth.is_some_and(|depth| stack.len() > depth);
                    if !nested {
                        xhtml_depth = None;
                        close_element(&name, &stack, &mut text, &mut channel, &mut current);
                        if name == "item" || name == "entry" {
                            if let Some(builder) = current.take() {
                                if entries.len() < limit {
                                    entries.push(builder.build());
                                }
                            }
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !is_feed {
        return Err(ReaderError::Feed(
            "Unrecognized feed format: expected <rss>, <rdf:RDF> or <feed> root".to_string(),
        ));
    }

    tracing::debug!("Parsed feed with {} entries (limit {limit})", entries.len());

    Ok(FeedInfo {
        title: channel.title.unwrap_or_else(|| UNTITLED_FEED.to_string()),
        description: channel.description,
        link: channel.link.unwrap_or_else(|| source_url.to_string()),
        last_build_date: channel.last_build_date,
        entries,
    })
}

/// Route the text of a just-closed element to the entry or the channel.
fn close_element(
    name: &str,
    stack: &[String],
    text: &mut String,
    channel: &mut ChannelBuilder,
    current: &mut Option<EntryBuilder>,
) {
    let parent = stack.last().map(String::as_str).unwrap_or_default();
    let value = std::mem::take(text).trim().to_string();

    if name == "item" || name == "entry" {
        return;
    }
    if let Some(entry) = current.as_mut() {
        entry.apply(name, parent, value);
    } else if parent == "channel" || parent == "feed" {
        channel.apply(name, value);
    }
}

fn qualified_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key.as_bytes())
        .map(|attr| match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).to_string(),
        })
        .filter(|value| !value.trim().is_empty())
}

/// Atom carries links and categories in attributes rather than text.
fn apply_attributes(
    e: &BytesStart<'_>,
    name: &str,
    parent: Option<&String>,
    channel: &mut ChannelBuilder,
    entry: Option<&mut EntryBuilder>,
) {
    match name {
        "link" => {
            let rel = attribute(e, "rel");
            if !matches!(rel.as_deref(), None | Some("alternate")) {
                return;
            }
            let Some(href) = attribute(e, "href") else { return };
            match entry {
                Some(entry) => {
                    entry.link.get_or_insert(href);
                }
                None if parent.is_some_and(|p| p == "feed") => {
                    channel.link.get_or_insert(href);
                }
                None => {}
            }
        }
        "category" => {
            if let (Some(entry), Some(term)) = (entry, attribute(e, "term")) {
                entry.categories.push(term);
            }
        }
        _ => {}
    }
}

#[derive(Default)]
struct ChannelBuilder {
    title: Option<String>,
    description: Option<String>,
    link: Option<String>,
    last_build_date: Option<String>,
}

impl ChannelBuilder {
    fn apply(&mut self, name: &str, value: String) {
        if value.is_empty() {
            return;
        }
        let slot = match name {
            "title" => &mut self.title,
            "description" | "subtitle" => &mut self.description,
            "link" => &mut self.link,
            "lastBuildDate" | "updated" => &mut self.last_build_date,
            _ => return,
        };
        slot.get_or_insert(value);
    }
}

#[derive(Default)]
struct EntryBuilder {
    title: Option<String>,
    link: Option<String>,
    pub_date: Option<String>,
    alt_date: Option<String>,
    creator: Option<String>,
    author: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    content: Option<String>,
    categories: Vec<String>,
    guid: Option<String>,
}

impl EntryBuilder {
    fn apply(&mut self, name: &str, parent: &str, value: String) {
        if value.is_empty() {
            return;
        }
        let slot = match (name, parent) {
            ("title", "item" | "entry") => &mut self.title,
            ("link", "item") => &mut self.link,
            ("pubDate", _) => &mut self.pub_date,
            ("published" | "updated" | "dc:date", _) => &mut self.alt_date,
            ("dc:creator", _) => &mut self.creator,
            ("author", "item") | ("name", "author") => &mut self.author,
            ("summary", _) => &mut self.summary,
            ("description", _) => &mut self.description,
            ("content:encoded" | "content", _) => &mut self.content,
            ("guid" | "id", "item" | "entry") => &mut self.guid,
            ("category", _) => {
                self.categories.push(value);
                return;
            }
            _ => return,
        };
        slot.get_or_insert(value);
    }

    fn build(self) -> FeedEntry {
        let summary = self.summary.or_else(|| {
            self.description
                .or(self.content)
                .map(|markup| plain_text(&markup))
                .filter(|snippet| !snippet.is_empty())
        });

        FeedEntry {
            title: self.title.unwrap_or_else(|| UNTITLED_ENTRY.to_string()),
            link: self.link.unwrap_or_default(),
            pub_date: self.pub_date.or(self.alt_date),
            creator: self.creator.or(self.author),
            summary,
            categories: (!self.categories.is_empty()).then_some(self.categories),
            guid: self.guid,
        }
    }
}

/// Strip markup from an HTML snippet.
fn plain_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let text: String = fragment.root_element().text().collect();
    text.trim().to_string()
}
