//! Event-driven section extraction.

use std::sync::Arc;

use super::accumulator::TextAccumulator;
use super::record::RecordAssembler;
use super::state::{ExtractionState, FrameRole, Mode};
use crate::error::StructuralError;
use crate::policy::{ElementRole, FormatPolicy};
use crate::types::DocumentRecord;
use crate::xml::{Attribute, XmlEvent};

/// Streaming extractor driven one [`XmlEvent`] at a time.
///
/// The extractor keeps only the current element stack and the text of the
/// record being built, so memory does not grow with the input. Feed events
/// with [`handle`](Self::handle) and call [`finish`](Self::finish) at the end
/// of the stream; both return a record whenever one is complete.
///
/// For each opening element the first applicable rule wins:
///
/// 1. inside a skipped subtree: ignored (only nesting is tracked);
/// 2. block start: the in-progress record is emitted and a new one begins;
/// 3. identifier element, if this record has no id yet: text is captured;
/// 4. skip, split, split tag, section, markup or transparent, as the policy
///    says.
#[derive(Debug)]
pub struct SectionExtractor {
    policy: Arc<FormatPolicy>,
    state: ExtractionState,
    accumulator: TextAccumulator,
    assembler: RecordAssembler,
    records: usize,
}

impl SectionExtractor {
    /// Create an extractor for one stream.
    #[must_use]
    pub fn new(policy: Arc<FormatPolicy>) -> Self {
        Self {
            policy,
            state: ExtractionState::new(),
            accumulator: TextAccumulator::new(),
            assembler: RecordAssembler::new(),
            records: 0,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &FormatPolicy {
        &self.policy
    }

    /// Element stack and mode flags.
    #[must_use]
    pub fn state(&self) -> &ExtractionState {
        &self.state
    }

    /// Open section buffers.
    #[must_use]
    pub fn accumulator(&self) -> &TextAccumulator {
        &self.accumulator
    }

    /// Number of records emitted so far.
    #[must_use]
    pub fn records_emitted(&self) -> usize {
        self.records
    }

    /// Process one event.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError`] for a close event that does not match the
    /// innermost open element. The record in progress is discarded and
    /// extraction resumes at the next block start.
    pub fn handle(&mut self, event: XmlEvent) -> Result<Option<DocumentRecord>, StructuralError> {
        match event {
            XmlEvent::Open { name, attributes } => Ok(self.open(name, &attributes)),
            XmlEvent::Close { name } => self.close(&name),
            XmlEvent::Text(text) => {
                self.text(&text);
                Ok(None)
            }
        }
    }

    /// Signal the end of the stream.
    ///
    /// Returns the last record, if it has any content, and resets the
    /// extractor.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError::UnclosedElements`] if elements are still
    /// open; the record in progress is discarded.
    pub fn finish(&mut self) -> Result<Option<DocumentRecord>, StructuralError> {
        let recovering = self.state.is_recovering();
        let open = self.state.open_elements();
        let result = if recovering {
            Ok(None)
        } else if !open.is_empty() {
            Err(StructuralError::UnclosedElements { open })
        } else {
            Ok(self.end_record())
        };
        self.reset();
        result
    }

    /// Drop all state, ready for a new stream.
    pub fn reset(&mut self) {
        self.state = ExtractionState::new();
        self.accumulator.clear();
        self.assembler.clear();
    }

    fn open(&mut self, name: String, attributes: &[Attribute]) -> Option<DocumentRecord> {
        if self.state.skip_depth() > 0 {
            self.state.push(name, FrameRole::Skipped);
            return None;
        }

        let mut finished = None;
        if self.policy.is_block_start(&name) {
            finished = self.end_record();
            self.state.set_recovering(false);
        }

        let role = match self.state.mode() {
            Mode::Accumulating => self.begin_element(&name, attributes),
            Mode::Recovering if self.policy.should_skip(&name) => FrameRole::Skipped,
            Mode::Recovering | Mode::CapturingId | Mode::Skipping => FrameRole::Transparent,
        };
        self.state.push(name, role);
        finished
    }

    /// Apply the opening effect of an element and return its frame role.
    fn begin_element(&mut self, name: &str, attributes: &[Attribute]) -> FrameRole {
        if !self.assembler.has_id() && self.policy.matches_doc_id(name, attributes) {
            return FrameRole::DocId;
        }

        match self.policy.role(name, self.accumulator.current_kind()) {
            ElementRole::Skip => FrameRole::Skipped,
            ElementRole::Split => {
                if let Some(segment) = self.accumulator.split(&self.policy) {
                    self.assembler.add_segment(segment);
                }
                FrameRole::Split
            }
            ElementRole::SplitTag => {
                self.accumulator.push_str(" ");
                FrameRole::SplitTag
            }
            ElementRole::Section(spec) => {
                self.accumulator.open_section(spec);
                self.assembler.touch(spec);
                FrameRole::Section
            }
            ElementRole::Markup(markup) => {
                self.accumulator.push_str(markup.open_token());
                FrameRole::Markup(markup.close_token().map(str::to_string))
            }
            ElementRole::Transparent => FrameRole::Transparent,
        }
    }

    fn close(&mut self, name: &str) -> Result<Option<DocumentRecord>, StructuralError> {
        let frame = match self.state.pop(name) {
            Ok(frame) => frame,
            // One error per broken record
            Err(_) if self.state.is_recovering() => {
                self.state.unwind_to(name);
                return Ok(None);
            }
            Err(err) => {
                self.recover(name, &err);
                return Err(err);
            }
        };

        match &frame.role {
            FrameRole::DocId => {
                let raw = self.state.take_id();
                self.assembler.set_id(self.policy.format_doc_id(raw.trim()));
            }
            FrameRole::Split => {
                if let Some(segment) = self.accumulator.split(&self.policy) {
                    self.assembler.add_segment(segment);
                }
            }
            FrameRole::SplitTag => self.accumulator.push_str(" "),
            FrameRole::Section => {
                if let Some(segment) = self.accumulator.close_section(&self.policy) {
                    self.assembler.add_segment(segment);
                }
            }
            FrameRole::Markup(Some(token)) => self.accumulator.push_str(token),
            FrameRole::Markup(None) | FrameRole::Transparent | FrameRole::Skipped => {}
        }

        let in_skipped = frame.role == FrameRole::Skipped;
        if !in_skipped && !self.state.is_recovering() && self.policy.is_block_end(name) {
            return Ok(self.end_record());
        }
        Ok(None)
    }

    fn text(&mut self, text: &str) {
        match self.state.mode() {
            Mode::Accumulating => self.accumulator.push_str(text),
            Mode::CapturingId => self.state.push_id_text(text),
            Mode::Skipping | Mode::Recovering => {}
        }
    }

    /// Emit the record in progress, if it has any content.
    fn end_record(&mut self) -> Option<DocumentRecord> {
        for segment in self.accumulator.drain(&self.policy) {
            self.assembler.add_segment(segment);
        }
        self.state.detach_record();

        if self.assembler.is_empty() {
            self.assembler.clear();
            return None;
        }
        let record = self.assembler.take();
        self.records += 1;
        tracing::debug!(
            id = %record.id,
            sections = record.sections.len(),
            policy = self.policy.name(),
            "Record complete"
        );
        Some(record)
    }

    fn recover(&mut self, name: &str, err: &StructuralError) {
        tracing::debug!(
            error = %err,
            open = ?self.state.open_elements(),
            "Discarding record after structural error"
        );
        self.state.unwind_to(name);
        self.accumulator.clear();
        self.assembler.clear();
        self.state.detach_record();
        self.state.set_recovering(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{plos, pubmed};
    use pretty_assertions::assert_eq;

    fn feed(extractor: &mut SectionExtractor, events: Vec<XmlEvent>) -> Vec<DocumentRecord> {
        let mut records = Vec::new();
        for event in events {
            if let Some(record) = extractor.handle(event).unwrap() {
                records.push(record);
            }
        }
        records.extend(extractor.finish().unwrap());
        records
    }

    fn body_policy() -> Arc<FormatPolicy> {
        Arc::new(
            FormatPolicy::builder("test", "id")
                .section("p", "Body")
                .skip(["table"])
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_skipped_subtree_contributes_nothing() {
        let mut extractor = SectionExtractor::new(body_policy());
        let events = vec![
            XmlEvent::open("body"),
            XmlEvent::open("p"),
            XmlEvent::text("Keep "),
            XmlEvent::open("table"),
            XmlEvent::open("tr"),
            XmlEvent::text("Drop"),
            XmlEvent::close("tr"),
            XmlEvent::close("table"),
            XmlEvent::text(" this"),
        ];
        for event in events {
            assert!(extractor.handle(event).unwrap().is_none());
        }
        assert_eq!(extractor.accumulator().current_text(), Some("Keep  this"));
        assert_eq!(extractor.state().skip_depth(), 0);

        let records = feed(
            &mut extractor,
            vec![XmlEvent::close("p"), XmlEvent::close("body")],
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("Body").as_deref(), Some("Keep this"));
        assert_eq!(records[0].id, "");
    }

    #[test]
    fn test_split_elements_make_segments() {
        let mut extractor = SectionExtractor::new(Arc::new(plos()));
        let records = feed(
            &mut extractor,
            vec![
                XmlEvent::open("ref-list"),
                XmlEvent::text("\n"),
                XmlEvent::open("ref"),
                XmlEvent::text("A"),
                XmlEvent::close("ref"),
                XmlEvent::text("\n"),
                XmlEvent::open("ref"),
                XmlEvent::text("B"),
                XmlEvent::close("ref"),
                XmlEvent::close("ref-list"),
            ],
        );
        assert_eq!(records[0].segments("References"), ["A", "B"]);
    }

    #[test]
    fn test_split_tags_separate_names() {
        let mut extractor = SectionExtractor::new(Arc::new(plos()));
        let records = feed(
            &mut extractor,
            vec![
                XmlEvent::open("ref-list"),
                XmlEvent::open("surname"),
                XmlEvent::text("A"),
                XmlEvent::close("surname"),
                XmlEvent::open("surname"),
                XmlEvent::text("B"),
                XmlEvent::close("surname"),
                XmlEvent::close("ref-list"),
            ],
        );
        assert_eq!(records[0].text("References").as_deref(), Some("A B"));
    }

    #[test]
    fn test_markup_tokens() {
        let mut extractor = SectionExtractor::new(Arc::new(plos()));
        let records = feed(
            &mut extractor,
            vec![
                XmlEvent::open("abstract"),
                XmlEvent::text("a "),
                XmlEvent::open("bold"),
                XmlEvent::text("x"),
                XmlEvent::close("bold"),
                XmlEvent::open("br"),
                XmlEvent::close("br"),
                XmlEvent::open("italic"),
                XmlEvent::text("y"),
                XmlEvent::close("italic"),
                XmlEvent::close("abstract"),
            ],
        );
        assert_eq!(records[0].text("Abstract").as_deref(), Some("a **x** _y_"));
    }

    #[test]
    fn test_doc_id_requires_attribute_value() {
        let mut extractor = SectionExtractor::new(Arc::new(plos()));
        let records = feed(
            &mut extractor,
            vec![
                XmlEvent::open("article"),
                XmlEvent::open_with("article-id", [("pub-id-type", "doi")]),
                XmlEvent::text("10.1371/journal.pone.0001"),
                XmlEvent::close("article-id"),
                XmlEvent::open_with("article-id", [("pub-id-type", "pmid")]),
                XmlEvent::text(" 18183289 "),
                XmlEvent::close("article-id"),
                XmlEvent::close("article"),
            ],
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "18183289");
    }

    #[test]
    fn test_doc_id_without_match_is_empty() {
        let mut extractor = SectionExtractor::new(Arc::new(plos()));
        let records = feed(
            &mut extractor,
            vec![
                XmlEvent::open("article"),
                XmlEvent::open_with("article-id", [("pub-id-type", "doi")]),
                XmlEvent::text("10.1371/x"),
                XmlEvent::close("article-id"),
                XmlEvent::open("abstract"),
                XmlEvent::text("Text"),
                XmlEvent::close("abstract"),
                XmlEvent::close("article"),
            ],
        );
        assert_eq!(records[0].id, "");
        assert_eq!(records[0].text("Abstract").as_deref(), Some("Text"));
    }

    #[test]
    fn test_first_doc_id_wins() {
        let mut extractor = SectionExtractor::new(Arc::new(pubmed()));
        let records = feed(
            &mut extractor,
            vec![
                XmlEvent::open("MedlineCitation"),
                XmlEvent::open("PMID"),
                XmlEvent::text("111"),
                XmlEvent::close("PMID"),
                XmlEvent::open("CommentsCorrections"),
                XmlEvent::open("PMID"),
                XmlEvent::text("999"),
                XmlEvent::close("PMID"),
                XmlEvent::close("CommentsCorrections"),
                XmlEvent::close("MedlineCitation"),
            ],
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "111");
    }

    #[test]
    fn test_doc_id_inside_skipped_subtree_ignored() {
        let policy = Arc::new(
            FormatPolicy::builder("test", "id")
                .skip(["front-stub"])
                .build()
                .unwrap(),
        );
        let mut extractor = SectionExtractor::new(policy);
        let records = feed(
            &mut extractor,
            vec![
                XmlEvent::open("doc"),
                XmlEvent::open("front-stub"),
                XmlEvent::open("id"),
                XmlEvent::text("skipped"),
                XmlEvent::close("id"),
                XmlEvent::close("front-stub"),
                XmlEvent::open("id"),
                XmlEvent::text("kept"),
                XmlEvent::close("id"),
                XmlEvent::close("doc"),
            ],
        );
        assert_eq!(records[0].id, "kept");
    }

    #[test]
    fn test_block_boundaries_make_independent_records() {
        let mut extractor = SectionExtractor::new(Arc::new(pubmed()));
        let mut events = vec![XmlEvent::open("MedlineCitationSet")];
        for (id, title) in [("1", "First"), ("2", "Second")] {
            events.extend([
                XmlEvent::open("MedlineCitation"),
                XmlEvent::open("PMID"),
                XmlEvent::text(id),
                XmlEvent::close("PMID"),
                XmlEvent::open("ArticleTitle"),
                XmlEvent::text(title),
                XmlEvent::close("ArticleTitle"),
                XmlEvent::close("MedlineCitation"),
            ]);
        }
        events.push(XmlEvent::close("MedlineCitationSet"));

        let records = feed(&mut extractor, events);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "1");
        assert_eq!(records[0].text("Title").as_deref(), Some("First"));
        assert_eq!(records[1].id, "2");
        assert_eq!(records[1].text("Title").as_deref(), Some("Second"));
        assert_eq!(extractor.records_emitted(), 2);
    }

    #[test]
    fn test_text_section_inside_data_section_stays_in_reference() {
        let mut extractor = SectionExtractor::new(Arc::new(plos()));
        let records = feed(
            &mut extractor,
            vec![
                XmlEvent::open("article"),
                XmlEvent::open("article-title"),
                XmlEvent::text("Main title"),
                XmlEvent::close("article-title"),
                XmlEvent::open("ref-list"),
                XmlEvent::open("ref"),
                XmlEvent::open("article-title"),
                XmlEvent::text("Cited work"),
                XmlEvent::close("article-title"),
                XmlEvent::close("ref"),
                XmlEvent::close("ref-list"),
                XmlEvent::close("article"),
            ],
        );
        assert_eq!(records[0].text("Title").as_deref(), Some("Main title"));
        assert_eq!(records[0].text("References").as_deref(), Some("Cited work"));
    }

    #[test]
    fn test_labels_in_first_open_order() {
        let mut extractor = SectionExtractor::new(Arc::new(plos()));
        let records = feed(
            &mut extractor,
            vec![
                XmlEvent::open("journal-meta"),
                XmlEvent::open("journal-title"),
                XmlEvent::text("PLoS ONE"),
                XmlEvent::close("journal-title"),
                XmlEvent::text("1932-6203"),
                XmlEvent::close("journal-meta"),
            ],
        );
        assert_eq!(
            records[0].labels().collect::<Vec<_>>(),
            vec!["Metadata", "Journal"]
        );
        assert_eq!(records[0].text("Metadata").as_deref(), Some("1932-6203"));
    }

    #[test]
    fn test_text_outside_sections_discarded() {
        let mut extractor = SectionExtractor::new(Arc::new(plos()));
        let records = feed(
            &mut extractor,
            vec![
                XmlEvent::open("article"),
                XmlEvent::text("stray"),
                XmlEvent::close("article"),
            ],
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_unmatched_close_is_structural_error() {
        let mut extractor = SectionExtractor::new(body_policy());
        let err = extractor.handle(XmlEvent::close("p")).unwrap_err();
        assert_eq!(err, StructuralError::UnmatchedClose { name: "p".to_string() });
        assert_eq!(extractor.state().mode(), Mode::Recovering);
    }

    #[test]
    fn test_mismatched_close_discards_record() {
        let mut extractor = SectionExtractor::new(body_policy());
        extractor.handle(XmlEvent::open("doc")).unwrap();
        extractor.handle(XmlEvent::open("p")).unwrap();
        extractor.handle(XmlEvent::text("lost")).unwrap();
        let err = extractor.handle(XmlEvent::close("doc")).unwrap_err();
        assert!(matches!(err, StructuralError::MismatchedClose { .. }));
        assert_eq!(extractor.state().depth(), 0);
        assert_eq!(extractor.finish(), Ok(None));
    }

    #[test]
    fn test_finish_with_open_elements() {
        let mut extractor = SectionExtractor::new(body_policy());
        extractor.handle(XmlEvent::open("doc")).unwrap();
        extractor.handle(XmlEvent::open("p")).unwrap();
        extractor.handle(XmlEvent::text("partial")).unwrap();
        assert_eq!(
            extractor.finish(),
            Err(StructuralError::UnclosedElements {
                open: vec!["doc".to_string(), "p".to_string()],
            })
        );
        assert_eq!(extractor.state().depth(), 0);
    }

    #[test]
    fn test_recovery_resumes_at_next_block() {
        let mut extractor = SectionExtractor::new(Arc::new(pubmed()));
        let events = vec![
            XmlEvent::open("MedlineCitation"),
            XmlEvent::open("PMID"),
            XmlEvent::text("1"),
            XmlEvent::close("PMID"),
            XmlEvent::open("Article"),
            XmlEvent::open("ArticleTitle"),
            XmlEvent::text("Broken"),
            XmlEvent::close("Article"),
        ];
        let mut results = Vec::new();
        for event in events {
            results.push(extractor.handle(event));
        }
        assert!(results.last().is_some_and(Result::is_err));

        // Tail of the broken block, then a healthy one.
        let records = feed(
            &mut extractor,
            vec![
                XmlEvent::text("ignored"),
                XmlEvent::close("MedlineCitation"),
                XmlEvent::open("MedlineCitation"),
                XmlEvent::open("PMID"),
                XmlEvent::text("2"),
                XmlEvent::close("PMID"),
                XmlEvent::open("ArticleTitle"),
                XmlEvent::text("Healthy"),
                XmlEvent::close("ArticleTitle"),
                XmlEvent::close("MedlineCitation"),
            ],
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "2");
        assert_eq!(records[0].text("Title").as_deref(), Some("Healthy"));
    }

    #[test]
    fn test_broken_record_reports_one_error() {
        let mut extractor = SectionExtractor::new(Arc::new(pubmed()));
        let events = vec![
            XmlEvent::open("Set"),
            XmlEvent::open("MedlineCitation"),
            XmlEvent::open("PMID"),
            XmlEvent::text("1"),
            XmlEvent::close("PMID"),
            XmlEvent::open("Article"),
            // Misspelled close names no open element
            XmlEvent::close("Artcle"),
            XmlEvent::close("MedlineCitation"),
            XmlEvent::open("MedlineCitation"),
            XmlEvent::open("PMID"),
            XmlEvent::text("2"),
            XmlEvent::close("PMID"),
            XmlEvent::close("MedlineCitation"),
            XmlEvent::close("Set"),
        ];

        let mut errors = Vec::new();
        let mut records = Vec::new();
        for event in events {
            match extractor.handle(event) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err) => errors.push(err),
            }
        }
        assert_eq!(extractor.state().depth(), 0);
        assert_eq!(extractor.finish(), Ok(None));

        assert_eq!(
            errors,
            vec![StructuralError::MismatchedClose {
                name: "Artcle".to_string(),
                expected: "Article".to_string(),
            }]
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "2");
    }
}
