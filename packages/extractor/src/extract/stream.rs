//! Lazy record iteration over an event source.

use std::io::BufRead;
use std::sync::Arc;

use super::engine::SectionExtractor;
use crate::error::{ExtractorError, Result};
use crate::policy::FormatPolicy;
use crate::types::DocumentRecord;
use crate::xml::{EventReader, XmlEvent};

/// Iterator of records extracted from a stream of events.
///
/// Yields `Ok(record)` for each finished record. A structural error is
/// yielded as a single `Err`; multi-record streams then continue with the
/// next record, single-record streams end. Tokenizer errors always end the
/// stream.
pub struct RecordStream<I> {
    events: I,
    extractor: SectionExtractor,
    done: bool,
}

impl<I> RecordStream<I>
where
    I: Iterator<Item = Result<XmlEvent>>,
{
    /// Extract records from `events` using `policy`.
    pub fn new(policy: Arc<FormatPolicy>, events: I) -> Self {
        Self {
            events,
            extractor: SectionExtractor::new(policy),
            done: false,
        }
    }

    /// The underlying extractor.
    #[must_use]
    pub fn extractor(&self) -> &SectionExtractor {
        &self.extractor
    }
}

impl<I> Iterator for RecordStream<I>
where
    I: Iterator<Item = Result<XmlEvent>>,
{
    type Item = Result<DocumentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.events.next() {
                Some(Ok(event)) => match self.extractor.handle(event) {
                    Ok(Some(record)) => return Some(Ok(record)),
                    Ok(None) => {}
                    Err(err) => {
                        if !self.extractor.policy().is_multi_record() {
                            self.done = true;
                        }
                        return Some(Err(err.into()));
                    }
                },
                Some(Err(err)) => {
                    self.done = true;
                    self.extractor.reset();
                    return Some(Err(err));
                }
                None => {
                    self.done = true;
                    return self.extractor.finish().map_err(ExtractorError::from).transpose();
                }
            }
        }
    }
}

/// Extract records from a buffered byte source.
pub fn extract_reader<R: BufRead>(
    policy: Arc<FormatPolicy>,
    source: R,
) -> RecordStream<EventReader<R>> {
    RecordStream::new(policy, EventReader::new(source))
}

/// Extract records from an in-memory document.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use litmine_extractor::extract::extract_str;
/// use litmine_extractor::policy::pubmed;
///
/// let xml = "<PubmedArticleSet>\
///     <MedlineCitation><PMID>1</PMID><Article><ArticleTitle>One</ArticleTitle></Article></MedlineCitation>\
///     <MedlineCitation><PMID>2</PMID><Article><ArticleTitle>Two</ArticleTitle></Article></MedlineCitation>\
///     </PubmedArticleSet>";
///
/// let records: Vec<_> = extract_str(Arc::new(pubmed()), xml)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].id, "2");
/// assert_eq!(records[1].text("Title").as_deref(), Some("Two"));
/// ```
pub fn extract_str(policy: Arc<FormatPolicy>, xml: &str) -> RecordStream<EventReader<&[u8]>> {
    extract_reader(policy, xml.as_bytes())
}

/// Extract records from already tokenized events.
pub fn extract_events(
    policy: Arc<FormatPolicy>,
    events: impl IntoIterator<Item = XmlEvent>,
) -> RecordStream<impl Iterator<Item = Result<XmlEvent>>> {
    RecordStream::new(policy, events.into_iter().map(Ok))
}
