//! Per-section text buffers.

use crate::policy::{FormatPolicy, SectionKind, SectionSpec};

/// A finished piece of section text, already cleaned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub label: String,
    pub kind: SectionKind,
    pub text: String,
}

#[derive(Debug, Clone)]
struct OpenSection {
    spec: SectionSpec,
    buffer: String,
}

/// Buffers for the logical sections currently open, innermost last.
///
/// Text always goes to the innermost section. Text arriving while no section
/// is open is discarded.
#[derive(Debug, Clone, Default)]
pub struct TextAccumulator {
    open: Vec<OpenSection>,
}

impl TextAccumulator {
    /// Create an accumulator with no open section.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start collecting text for a section.
    pub fn open_section(&mut self, spec: &SectionSpec) {
        self.open.push(OpenSection {
            spec: spec.clone(),
            buffer: String::new(),
        });
    }

    /// Append raw text (or a markup token) to the innermost section.
    pub fn push_str(&mut self, text: &str) {
        if let Some(section) = self.open.last_mut() {
            section.buffer.push_str(text);
        }
    }

    /// Finish the innermost section's current segment and keep the section open.
    ///
    /// Returns `None` when no section is open or the segment is blank.
    pub fn split(&mut self, policy: &FormatPolicy) -> Option<Segment> {
        let section = self.open.last_mut()?;
        let raw = std::mem::take(&mut section.buffer);
        finish_segment(policy, &section.spec, &raw)
    }

    /// Close the innermost section, returning its last segment.
    pub fn close_section(&mut self, policy: &FormatPolicy) -> Option<Segment> {
        let section = self.open.pop()?;
        finish_segment(policy, &section.spec, &section.buffer)
    }

    /// Close every open section, innermost first.
    pub fn drain(&mut self, policy: &FormatPolicy) -> Vec<Segment> {
        let mut segments = Vec::new();
        while let Some(section) = self.open.pop() {
            segments.extend(finish_segment(policy, &section.spec, &section.buffer));
        }
        segments
    }

    /// Drop all open sections and their text.
    pub fn clear(&mut self) {
        self.open.clear();
    }

    /// Kind of the innermost open section.
    #[must_use]
    pub fn current_kind(&self) -> Option<SectionKind> {
        self.open.last().map(|s| s.spec.kind)
    }

    /// Raw, uncleaned text of the innermost section's current segment.
    #[must_use]
    pub fn current_text(&self) -> Option<&str> {
        self.open.last().map(|s| s.buffer.as_str())
    }

    /// Number of open sections.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }
}

/// Clean and trim raw segment text; blank segments are dropped.
fn finish_segment(policy: &FormatPolicy, spec: &SectionSpec, raw: &str) -> Option<Segment> {
    let cleaned = policy.cleanup(raw);
    let text = cleaned.trim();
    if text.is_empty() {
        return None;
    }
    Some(Segment {
        label: spec.label.clone(),
        kind: spec.kind,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> FormatPolicy {
        FormatPolicy::builder("test", "id").build().unwrap()
    }

    fn body() -> SectionSpec {
        SectionSpec::new("Body", SectionKind::Text)
    }

    #[test]
    fn test_text_without_section_is_discarded() {
        let mut acc = TextAccumulator::new();
        acc.push_str("lost");
        assert_eq!(acc.current_text(), None);
        assert!(acc.split(&policy()).is_none());
    }

    #[test]
    fn test_split_and_close() {
        let policy = policy();
        let mut acc = TextAccumulator::new();
        acc.open_section(&body());
        acc.push_str("  First   part ");
        let first = acc.split(&policy).unwrap();
        assert_eq!(first.text, "First part");
        assert_eq!(first.label, "Body");
        acc.push_str("Second");
        assert_eq!(acc.close_section(&policy).unwrap().text, "Second");
        assert_eq!(acc.depth(), 0);
    }

    #[test]
    fn test_blank_segments_dropped() {
        let policy = policy();
        let mut acc = TextAccumulator::new();
        acc.open_section(&body());
        acc.push_str(" \n\t ");
        assert!(acc.split(&policy).is_none());
        assert!(acc.close_section(&policy).is_none());
    }

    #[test]
    fn test_text_goes_to_innermost_section() {
        let policy = policy();
        let mut acc = TextAccumulator::new();
        acc.open_section(&SectionSpec::new("Metadata", SectionKind::Data));
        acc.push_str("outer ");
        acc.open_section(&SectionSpec::new("Journal", SectionKind::Data));
        acc.push_str("PLoS ONE");
        assert_eq!(acc.current_kind(), Some(SectionKind::Data));

        let inner = acc.close_section(&policy).unwrap();
        assert_eq!((inner.label.as_str(), inner.text.as_str()), ("Journal", "PLoS ONE"));
        acc.push_str("tail");
        let outer = acc.close_section(&policy).unwrap();
        assert_eq!((outer.label.as_str(), outer.text.as_str()), ("Metadata", "outer tail"));
    }

    #[test]
    fn test_drain_closes_innermost_first() {
        let policy = policy();
        let mut acc = TextAccumulator::new();
        acc.open_section(&body());
        acc.push_str("a");
        acc.open_section(&SectionSpec::new("Abstract", SectionKind::Text));
        acc.push_str("b");
        let labels: Vec<_> = acc.drain(&policy).into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["Abstract", "Body"]);
        assert_eq!(acc.depth(), 0);
    }
}
