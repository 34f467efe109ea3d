//! Core data types produced by extraction.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::config::SEGMENT_SEPARATOR;
use crate::policy::SectionKind;

/// Text collected under one logical section label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Output label, e.g. "Body".
    pub label: String,

    /// Kind of text held by the section.
    pub kind: SectionKind,

    /// Cleaned, non-blank segments in document order.
    pub segments: Vec<String>,
}

impl Section {
    /// Create an empty section.
    #[must_use]
    pub fn new(label: impl Into<String>, kind: SectionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            segments: Vec::new(),
        }
    }

    /// All segments joined by a blank line.
    #[must_use]
    pub fn text(&self) -> String {
        self.segments.join(SEGMENT_SEPARATOR)
    }
}

/// The extraction result for one document.
///
/// Serializes as `{"id": ..., "sections": {label: text, ...}}` with labels in
/// first-appearance order and each section's segments joined by a blank
/// line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Normalized identifier, empty if the document had none.
    pub id: String,

    /// Sections in order of first appearance; none of them is empty.
    pub sections: Vec<Section>,
}

impl DocumentRecord {
    /// Create a record.
    #[must_use]
    pub fn new(id: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            id: id.into(),
            sections,
        }
    }

    /// Look up a section by label.
    #[must_use]
    pub fn section(&self, label: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.label == label)
    }

    /// Segments of a section, empty if the label is absent.
    #[must_use]
    pub fn segments(&self, label: &str) -> &[String] {
        self.section(label)
            .map(|s| s.segments.as_slice())
            .unwrap_or(&[])
    }

    /// Joined text of a section.
    #[must_use]
    pub fn text(&self, label: &str) -> Option<String> {
        self.section(label).map(Section::text)
    }

    /// Section labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.label.as_str())
    }

    /// A record with neither an id nor any section text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.sections.is_empty()
    }
}

/// Map of label to joined text, preserving section order.
struct SectionMap<'a>(&'a [Section]);

impl Serialize for SectionMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for section in self.0 {
            map.serialize_entry(&section.label, &section.text())?;
        }
        map.end()
    }
}

impl Serialize for DocumentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("DocumentRecord", 2)?;
        record.serialize_field("id", &self.id)?;
        record.serialize_field("sections", &SectionMap(&self.sections))?;
        record.end()
    }
}
