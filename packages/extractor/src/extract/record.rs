//! Assembly of finished segments into a [`DocumentRecord`].

use super::accumulator::Segment;
use crate::policy::SectionSpec;
use crate::types::{DocumentRecord, Section};

/// Collects the id and section segments of the record being extracted.
#[derive(Debug, Clone, Default)]
pub struct RecordAssembler {
    id: Option<String>,
    sections: Vec<Section>,
}

impl RecordAssembler {
    /// Create an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a section label at the point its element opens.
    ///
    /// Labels keep the order in which they were first opened, even when an
    /// inner section finishes its text first.
    pub fn touch(&mut self, spec: &SectionSpec) {
        if self.position(&spec.label).is_none() {
            self.sections.push(Section::new(spec.label.clone(), spec.kind));
        }
    }

    /// Append a finished segment to its section.
    pub fn add_segment(&mut self, segment: Segment) {
        let index = match self.position(&segment.label) {
            Some(index) => index,
            None => {
                self.sections
                    .push(Section::new(segment.label.clone(), segment.kind));
                self.sections.len() - 1
            }
        };
        self.sections[index].segments.push(segment.text);
    }

    /// Record the document id. Only the first id is kept.
    pub fn set_id(&mut self, id: String) {
        if self.id.is_none() {
            self.id = Some(id);
        }
    }

    /// Whether an identifier element has already been captured.
    #[must_use]
    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// Whether the record has neither an id nor any segment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.as_deref().is_none_or(str::is_empty)
            && self.sections.iter().all(|s| s.segments.is_empty())
    }

    /// Finish the record, dropping sections that never received text.
    ///
    /// The assembler is reset for the next record.
    pub fn take(&mut self) -> DocumentRecord {
        let id = self.id.take().unwrap_or_default();
        let sections = std::mem::take(&mut self.sections)
            .into_iter()
            .filter(|s| !s.segments.is_empty())
            .collect();
        DocumentRecord::new(id, sections)
    }

    /// Discard everything collected so far.
    pub fn clear(&mut self) {
        self.id = None;
        self.sections.clear();
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::SectionKind;
    use pretty_assertions::assert_eq;

    fn segment(label: &str, text: &str) -> Segment {
        Segment {
            label: label.to_string(),
            kind: SectionKind::Text,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_first_id_wins() {
        let mut assembler = RecordAssembler::new();
        assert!(!assembler.has_id());
        assembler.set_id("1".to_string());
        assembler.set_id("2".to_string());
        assert_eq!(assembler.take().id, "1");
    }

    #[test]
    fn test_labels_keep_open_order() {
        let mut assembler = RecordAssembler::new();
        assembler.touch(&SectionSpec::new("Metadata", SectionKind::Data));
        assembler.touch(&SectionSpec::new("Journal", SectionKind::Data));
        assembler.add_segment(segment("Journal", "PLoS ONE"));
        assembler.add_segment(segment("Metadata", "1932-6203"));

        let record = assembler.take();
        assert_eq!(record.labels().collect::<Vec<_>>(), vec!["Metadata", "Journal"]);
        assert_eq!(record.sections[1].kind, SectionKind::Data);
    }

    #[test]
    fn test_segments_append_in_order() {
        let mut assembler = RecordAssembler::new();
        assembler.add_segment(segment("Body", "one"));
        assembler.add_segment(segment("Body", "two"));
        assert_eq!(assembler.take().segments("Body"), ["one", "two"]);
    }

    #[test]
    fn test_untouched_sections_dropped() {
        let mut assembler = RecordAssembler::new();
        assembler.touch(&SectionSpec::new("Abstract", SectionKind::Text));
        assert!(assembler.is_empty());
        let record = assembler.take();
        assert!(record.sections.is_empty());
    }

    #[test]
    fn test_take_resets() {
        let mut assembler = RecordAssembler::new();
        assembler.set_id("7".to_string());
        assembler.add_segment(segment("Title", "T"));
        assert!(!assembler.is_empty());
        let _ = assembler.take();
        assert!(assembler.is_empty());
        assert!(!assembler.has_id());
    }

    #[test]
    fn test_empty_id_counts_as_captured() {
        let mut assembler = RecordAssembler::new();
        assembler.set_id(String::new());
        assert!(assembler.has_id());
        assert!(assembler.is_empty());
    }
}
