//! Streaming tokenizer built on quick-xml.

use std::borrow::Cow;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::event::{Attribute, XmlEvent};
use crate::config::EVENT_BUFFER_CAPACITY;
use crate::error::Result;

/// Pull-based reader turning raw XML into [`XmlEvent`]s.
///
/// Text is delivered untrimmed. Comments, processing instructions, the XML
/// declaration and doctypes are dropped; DTDs are never resolved.
///
/// End tags are not checked against start tags here: a mismatched close is
/// passed on so the extractor can report it and recover at the next record.
/// After the first tokenizer error the reader is exhausted.
pub struct EventReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> EventReader<R> {
    /// Create a reader over a buffered byte source.
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        config.trim_text(false);
        config.expand_empty_elements = true;
        config.check_end_names = false;
        Self {
            reader,
            buf: Vec::with_capacity(EVENT_BUFFER_CAPACITY),
            done: false,
        }
    }

    /// Byte offset of the tokenizer in the input.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.reader.buffer_position()
    }

    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(ref e) => return Ok(Some(open_event(e))),
                Event::End(ref e) => {
                    return Ok(Some(XmlEvent::Close {
                        name: local_name(e.local_name().as_ref()),
                    }));
                }
                Event::Text(ref e) => {
                    let text = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(err) => {
                            tracing::debug!(error = %err, "Could not unescape text, keeping it raw");
                            String::from_utf8_lossy(e.as_ref()).into_owned()
                        }
                    };
                    if !text.is_empty() {
                        return Ok(Some(XmlEvent::Text(text)));
                    }
                }
                Event::CData(ref e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    if !text.is_empty() {
                        return Ok(Some(XmlEvent::Text(text)));
                    }
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                tracing::debug!(offset = EventReader::position(self), error = %err, "XML tokenizer stopped");
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

fn local_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn open_event(e: &BytesStart<'_>) -> XmlEvent {
    let attributes = e
        .attributes()
        .flatten()
        .map(|attr| {
            let raw = String::from_utf8_lossy(&attr.value);
            let value = quick_xml::escape::unescape(&raw)
                .map(Cow::into_owned)
                .unwrap_or_else(|_| raw.to_string());
            Attribute::new(local_name(attr.key.local_name().as_ref()), value)
        })
        .collect();

    XmlEvent::Open {
        name: local_name(e.local_name().as_ref()),
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn events(xml: &str) -> Vec<XmlEvent> {
        EventReader::new(xml.as_bytes())
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_reader_basic_events() {
        assert_eq!(
            events("<p>Hello <b>world</b></p>"),
            vec![
                XmlEvent::open("p"),
                XmlEvent::text("Hello "),
                XmlEvent::open("b"),
                XmlEvent::text("world"),
                XmlEvent::close("b"),
                XmlEvent::close("p"),
            ]
        );
    }

    #[test]
    fn test_reader_self_closing_element() {
        assert_eq!(
            events("<p>a<br/>b</p>"),
            vec![
                XmlEvent::open("p"),
                XmlEvent::text("a"),
                XmlEvent::open("br"),
                XmlEvent::close("br"),
                XmlEvent::text("b"),
                XmlEvent::close("p"),
            ]
        );
    }

    #[test]
    fn test_reader_local_names_and_attributes() {
        let xml = r#"<x:article xmlns:x="urn:x"><article-id pub-id-type="pmid" x:note="a&amp;b">1</article-id></x:article>"#;
        let evs = events(xml);
        assert_eq!(
            evs[1],
            XmlEvent::open_with("article-id", [("pub-id-type", "pmid"), ("note", "a&b")])
        );
        assert_eq!(evs.last(), Some(&XmlEvent::close("article")));
    }

    #[test]
    fn test_reader_unescapes_text_and_keeps_cdata() {
        assert_eq!(
            events("<t>a &lt; b<![CDATA[ <raw> ]]></t>"),
            vec![
                XmlEvent::open("t"),
                XmlEvent::text("a < b"),
                XmlEvent::text(" <raw> "),
                XmlEvent::close("t"),
            ]
        );
    }

    #[test]
    fn test_reader_skips_prolog_and_comments() {
        let xml = "<?xml version=\"1.0\"?>\n<!DOCTYPE article SYSTEM \"x.dtd\"><a><!-- note -->x</a>";
        assert_eq!(
            events(xml),
            vec![
                XmlEvent::text("\n"),
                XmlEvent::open("a"),
                XmlEvent::text("x"),
                XmlEvent::close("a"),
            ]
        );
    }

    #[test]
    fn test_reader_passes_mismatched_close_through() {
        assert_eq!(
            events("<a></b>"),
            vec![XmlEvent::open("a"), XmlEvent::close("b")]
        );
    }

    #[test]
    fn test_reader_stops_after_error() {
        let mut reader = EventReader::new("<a><b".as_bytes());
        assert_eq!(reader.next().unwrap().unwrap(), XmlEvent::open("a"));
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_reader_position_tracks_consumed_bytes() {
        let xml = "<a>text</a>";
        let mut reader = EventReader::new(xml.as_bytes());
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.next().unwrap().unwrap(), XmlEvent::open("a"));
        assert_eq!(reader.position(), 3);
        reader.by_ref().for_each(drop);
        assert_eq!(reader.position(), xml.len() as u64);
    }
}
