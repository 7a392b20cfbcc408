// src/ingest/parser.rs
//! Event-based RSS item extraction.
//!
//! Every `<item>` element counts, wherever it sits (RSS 2.0 puts them under
//! `<channel>`, RSS 1.0 next to it). Inside an item the first `title`,
//! `description` and `link` descendants win; their value is all nested
//! text and CDATA concatenated, untrimmed. Only an empty link becomes
//! [`UNKNOWN_LINK`]; whitespace-only link text is kept as is.
//!
//! A handful of HTML entities are rewritten before parsing because plain XML
//! rejects them. CDATA sections are copied verbatim, so `&nbsp;` inside
//! CDATA stays literal.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::ingest::types::{Entry, FeedError, UNKNOWN_LINK};

#[derive(Clone, Copy)]
enum Field {
    Title,
    Description,
    Link,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"description" => Some(Field::Description),
            b"link" => Some(Field::Link),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Slot {
    value: Option<String>,
    // depth of the element currently feeding `value`
    open_at: Option<usize>,
}

struct ItemBuilder {
    depth: usize,
    slots: [Slot; 3],
}

impl ItemBuilder {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            slots: Default::default(),
        }
    }

    fn slot(&mut self, f: Field) -> &mut Slot {
        &mut self.slots[f as usize]
    }

    fn open(&mut self, f: Field, depth: usize) {
        let slot = self.slot(f);
        if slot.value.is_none() {
            slot.value = Some(String::new());
            slot.open_at = Some(depth);
        }
    }

    /// `<link/>` and friends: the element exists but has no text.
    fn touch(&mut self, f: Field) {
        let slot = self.slot(f);
        if slot.value.is_none() {
            slot.value = Some(String::new());
        }
    }

    fn close(&mut self, depth: usize) {
        for slot in self.slots.iter_mut() {
            if slot.open_at == Some(depth) {
                slot.open_at = None;
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        for slot in self.slots.iter_mut() {
            if slot.open_at.is_some() {
                if let Some(v) = slot.value.as_mut() {
                    v.push_str(text);
                }
            }
        }
    }

    fn finish(self) -> Entry {
        let [title, description, link] = self.slots;
        let link = link
            .value
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| UNKNOWN_LINK.to_string());
        Entry {
            title: title.value.unwrap_or_default(),
            description: description.value.unwrap_or_default(),
            link,
        }
    }
}

/// Parse a feed payload into its entries.
///
/// Any well-formedness problem fails the whole payload; callers treat that
/// as a feed with zero entries. A document without items is `Ok(vec![])`.
pub fn parse_entries(xml: &str) -> Result<Vec<Entry>, FeedError> {
    let cleaned = scrub_html_entities_for_xml(xml);
    let mut reader = Reader::from_str(&cleaned);

    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut current: Option<ItemBuilder> = None;

    loop {
        let ev = reader
            .read_event()
            .map_err(|e| parse_error(&reader, e))?;
        match ev {
            Event::Start(e) => {
                depth += 1;
                let name = e.name();
                match current.as_mut() {
                    None if name.as_ref() == b"item" => current = Some(ItemBuilder::new(depth)),
                    Some(item) => {
                        if let Some(f) = Field::from_name(name.as_ref()) {
                            item.open(f, depth);
                        }
                    }
                    None => {}
                }
            }
            Event::Empty(e) => {
                let name = e.name();
                match current.as_mut() {
                    None if name.as_ref() == b"item" => {
                        out.push(ItemBuilder::new(depth + 1).finish());
                    }
                    Some(item) => {
                        if let Some(f) = Field::from_name(name.as_ref()) {
                            item.touch(f);
                        }
                    }
                    None => {}
                }
            }
            Event::End(_) => {
                if let Some(mut item) = current.take() {
                    if item.depth == depth {
                        out.push(item.finish());
                    } else {
                        item.close(depth);
                        current = Some(item);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) => {
                if let Some(item) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| parse_error(&reader, e))?;
                    item.push_text(&text);
                }
            }
            Event::CData(c) => {
                if let Some(item) = current.as_mut() {
                    let raw = c.into_inner();
                    item.push_text(&String::from_utf8_lossy(&raw));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(FeedError::Parse(format!(
            "document ended with {depth} unclosed element(s)"
        )));
    }
    Ok(out)
}

fn parse_error<E: std::fmt::Display>(reader: &Reader<&[u8]>, e: E) -> FeedError {
    FeedError::Parse(format!("{e} (at byte {})", reader.buffer_position()))
}

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// HTML entities that feeds routinely leak into XML text. CDATA is skipped.
fn scrub_html_entities_for_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find(CDATA_OPEN) {
        out.push_str(&scrub_entities(&rest[..open]));
        let body = &rest[open..];
        match body[CDATA_OPEN.len()..].find(CDATA_CLOSE) {
            Some(close) => {
                let end = CDATA_OPEN.len() + close + CDATA_CLOSE.len();
                out.push_str(&body[..end]);
                rest = &body[end..];
            }
            None => {
                // unterminated; the reader reports it
                out.push_str(body);
                return out;
            }
        }
    }
    out.push_str(&scrub_entities(rest));
    out
}

fn scrub_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_description_link() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Feed title is not an item</title>
  <item>
    <title>Breaking: war escalates</title>
    <description>more conflict reported</description>
    <link>http://x/1</link>
  </item>
</channel></rss>"#;
        let entries = parse_entries(xml).unwrap();
        assert_eq!(
            entries,
            vec![Entry {
                title: "Breaking: war escalates".into(),
                description: "more conflict reported".into(),
                link: "http://x/1".into(),
            }]
        );
    }

    #[test]
    fn missing_fields_default() {
        let xml = "<rss><channel><item><description>d</description></item><item/></channel></rss>";
        let entries = parse_entries(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "");
        assert_eq!(entries[0].description, "d");
        assert_eq!(entries[0].link, UNKNOWN_LINK);
        assert_eq!(entries[1].link, UNKNOWN_LINK);
    }

    #[test]
    fn empty_link_element_gets_sentinel() {
        let xml = r#"<rss><channel><item><title>t</title><link href="http://a"/></item></channel></rss>"#;
        let entries = parse_entries(xml).unwrap();
        assert_eq!(entries[0].link, UNKNOWN_LINK);
    }

    #[test]
    fn cdata_and_entities_are_decoded() {
        let xml = "<rss><channel><item><title><![CDATA[War <b>now</b>]]></title>\
                   <description>Tom &amp; Jerry&nbsp;fight</description></item></channel></rss>";
        let entries = parse_entries(xml).unwrap();
        assert_eq!(entries[0].title, "War <b>now</b>");
        assert_eq!(entries[0].description, "Tom & Jerry fight");
    }

    #[test]
    fn first_descendant_wins() {
        let xml = "<rss><channel><item><title>first</title><title>second</title>\
                   <link>  http://x/1\n</link><link>http://x/2</link></item></channel></rss>";
        let entries = parse_entries(xml).unwrap();
        assert_eq!(entries[0].title, "first");
        assert_eq!(entries[0].link, "  http://x/1\n");
    }

    #[test]
    fn whitespace_link_is_kept() {
        let xml = "<rss><channel><item><title>t</title><link> </link></item></channel></rss>";
        let entries = parse_entries(xml).unwrap();
        assert_eq!(entries[0].link, " ");
    }

    #[test]
    fn cdata_keeps_entity_text_literal() {
        let xml = "<rss><channel><item><title><![CDATA[a&nbsp;b]]>&nbsp;c</title>\
                   <description>x&nbsp;<![CDATA[&mdash;]]></description></item></channel></rss>";
        let entries = parse_entries(xml).unwrap();
        assert_eq!(entries[0].title, "a&nbsp;b c");
        assert_eq!(entries[0].description, "x &mdash;");
    }

    #[test]
    fn unterminated_cdata_fails() {
        assert!(parse_entries("<rss><item><title><![CDATA[war&nbsp;</title></item></rss>").is_err());
    }

    #[test]
    fn malformed_documents_fail() {
        assert!(parse_entries("<rss><channel><item><title>x</channel></rss>").is_err());
        assert!(parse_entries("<rss><channel><item><title>x</title></item>").is_err());
    }

    #[test]
    fn non_feed_text_has_no_entries() {
        assert!(parse_entries("").unwrap().is_empty());
        assert!(parse_entries("<rss><channel/></rss>").unwrap().is_empty());
    }
}
