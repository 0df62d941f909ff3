// src/ingest/feed.rs
use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;

use quick_xml::de::{Deserializer as XmlDeserializer, EntityResolver};
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesText, Event};
use quick_xml::Reader;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;

/// Syndication dialects we understand, decided by the root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Rss,
    Rdf,
    Atom,
}

/// One item/entry as written in the feed, before any date handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// Raw publish timestamp, if the entry carries one.
    pub published: Option<String>,
}

/// All character data inside an element, nested markup included.
///
/// Atom allows `type="xhtml"` titles wrapped in a `<div>`; those flatten to
/// their text the same way plain titles do.
#[derive(Debug, Default)]
struct Text {
    value: String,
}

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TextVisitor)
    }
}

struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
    type Value = Text;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("element text")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Text, E> {
        Ok(Text { value: v.to_string() })
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Text, E> {
        Ok(Text { value: v })
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Text, E> {
        self.visit_string(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Text, E> {
        self.visit_string(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Text, E> {
        self.visit_string(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Text, E> {
        self.visit_string(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Text, E> {
        Ok(Text::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Text, A::Error> {
        let mut value = String::new();
        while let Some(key) = map.next_key::<String>()? {
            if key.starts_with('@') {
                map.next_value::<IgnoredAny>()?;
                continue;
            }
            let part: Text = map.next_value()?;
            let part = part.value.trim();
            if !value.is_empty() && !part.is_empty() {
                value.push(' ');
            }
            value.push_str(part);
        }
        Ok(Text { value })
    }
}

// Element names are matched without their namespace prefix, so `<atom:link>`
// and `<media:title>` land in the same lists as `<link>` and `<title>`.
// Every field is a list for that reason; the first non-empty value wins.

#[derive(Debug, Deserialize)]
struct Document {
    channel: Option<Channel>,
    // RSS 1.0 puts items next to the channel, not inside it
    #[serde(default)]
    item: Vec<RssItem>,
    #[serde(default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default)]
    item: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: Vec<Text>,
    #[serde(default)]
    link: Vec<Text>,
    #[serde(rename = "pubDate", default)]
    pub_date: Vec<Text>,
    #[serde(rename = "date", alias = "dc:date", default)]
    dc_date: Vec<Text>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    title: Vec<Text>,
    #[serde(default)]
    link: Vec<AtomLink>,
    #[serde(default)]
    published: Vec<Text>,
    #[serde(default)]
    updated: Vec<Text>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Resolves the HTML named entities feeds routinely carry (`&eacute;`,
/// `&copy;`, ...) which plain XML leaves undefined.
struct HtmlEntities;

impl EntityResolver for HtmlEntities {
    type Error = Infallible;

    fn capture(&mut self, _doctype: BytesText) -> Result<(), Self::Error> {
        Ok(())
    }

    fn resolve(&self, entity: &str) -> Option<&str> {
        resolve_html5_entity(entity)
    }
}

/// Decode a fetched body using the encoding named in its XML declaration
/// (or BOM). Undeclared or unreadable bodies fall back to lossy UTF-8.
pub fn decode_feed(bytes: &[u8]) -> Cow<'_, str> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    loop {
        // the declaration, if any, precedes the root element
        match reader.read_event_into(&mut buf) {
            Ok(Event::Decl(_) | Event::Start(_) | Event::Empty(_) | Event::Eof) | Err(_) => break,
            Ok(_) => buf.clear(),
        }
    }
    reader
        .decoder()
        .decode(bytes)
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes))
}

/// Parse an RSS 2.0, RSS 1.0 (RDF) or Atom document into entries, in document order.
pub fn parse_feed(body: &str) -> Result<Vec<FeedEntry>, String> {
    let xml = scrub_html_entities_for_xml(body.trim_start_matches('\u{feff}'));
    let kind = root_kind(&xml)?;
    let mut deserializer = XmlDeserializer::from_str_with_resolver(&xml, HtmlEntities);
    let doc = Document::deserialize(&mut deserializer).map_err(|e| format!("parsing {kind:?} feed: {e}"))?;

    let entries = match kind {
        FeedKind::Rss => doc
            .channel
            .map(|c| c.item)
            .unwrap_or_default()
            .into_iter()
            .map(FeedEntry::from)
            .collect(),
        FeedKind::Rdf => doc.item.into_iter().map(FeedEntry::from).collect(),
        FeedKind::Atom => doc.entry.into_iter().map(FeedEntry::from).collect(),
    };
    Ok(entries)
}

fn root_kind(xml: &str) -> Result<FeedKind, String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return match e.local_name().as_ref() {
                    b"rss" => Ok(FeedKind::Rss),
                    b"RDF" => Ok(FeedKind::Rdf),
                    b"feed" => Ok(FeedKind::Atom),
                    other => Err(format!(
                        "not a feed: root element <{}>",
                        String::from_utf8_lossy(other)
                    )),
                };
            }
            Ok(Event::Eof) => return Err("not a feed: no root element".into()),
            Err(e) => return Err(format!("invalid xml: {e}")),
            _ => {}
        }
    }
}

fn first_text(values: Vec<Text>) -> Option<String> {
    values
        .into_iter()
        .map(|t| t.value.trim().to_string())
        .find(|s| !s.is_empty())
}

impl From<RssItem> for FeedEntry {
    fn from(it: RssItem) -> Self {
        Self {
            title: first_text(it.title).unwrap_or_default(),
            link: first_text(it.link).unwrap_or_default(),
            published: first_text(it.pub_date).or_else(|| first_text(it.dc_date)),
        }
    }
}

impl From<AtomEntry> for FeedEntry {
    fn from(e: AtomEntry) -> Self {
        let link = e
            .link
            .iter()
            .filter(|l| !l.href.trim().is_empty())
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| e.link.iter().find(|l| !l.href.trim().is_empty()))
            .map(|l| l.href.trim().to_string())
            .unwrap_or_default();
        Self {
            title: first_text(e.title).unwrap_or_default(),
            link,
            published: first_text(e.published).or_else(|| first_text(e.updated)),
        }
    }
}

/// Typographic entities are flattened to ASCII before parsing; any other
/// HTML entity is resolved during deserialization.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
