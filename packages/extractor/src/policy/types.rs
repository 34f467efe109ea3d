//! Types describing how a format policy treats individual elements.

use serde::{Deserialize, Serialize};

/// What kind of text a logical section holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Prose meant for downstream NLP (title, abstract, body).
    #[default]
    Text,

    /// Bibliographic or metadata fields (journal, year, references).
    Data,
}

impl SectionKind {
    /// Get the string value used in policy files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Data => "data",
        }
    }
}

/// Target of a section-owning element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpec {
    /// Output label, e.g. "Abstract".
    pub label: String,

    /// Kind of text collected under the label.
    pub kind: SectionKind,
}

impl SectionSpec {
    /// Create a new section spec.
    #[must_use]
    pub fn new(label: impl Into<String>, kind: SectionKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }
}

/// Inline markup emitted for a formatting element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    /// Token appended on open and again on close (`**bold**`).
    Wrap(String),

    /// Token appended once on open (line breaks).
    Insert(String),
}

impl Markup {
    /// Token appended when the element opens.
    #[must_use]
    pub fn open_token(&self) -> &str {
        match self {
            Self::Wrap(token) | Self::Insert(token) => token,
        }
    }

    /// Token appended when the element closes, if any.
    #[must_use]
    pub fn close_token(&self) -> Option<&str> {
        match self {
            Self::Wrap(token) => Some(token),
            Self::Insert(_) => None,
        }
    }
}

/// Role an element plays for text accumulation.
///
/// Document identifiers and block boundaries are decided separately by the
/// extractor because they depend on record state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole<'p> {
    /// Element and subtree contribute no text.
    Skip,
    /// Open and close start a new segment.
    Split,
    /// Open and close insert a separator.
    SplitTag,
    /// Opens a logical section.
    Section(&'p SectionSpec),
    /// Inline formatting.
    Markup(&'p Markup),
    /// No effect; text flows to the enclosing section.
    Transparent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_tokens() {
        let bold = Markup::Wrap("**".to_string());
        assert_eq!(bold.open_token(), "**");
        assert_eq!(bold.close_token(), Some("**"));

        let br = Markup::Insert(" ".to_string());
        assert_eq!(br.open_token(), " ");
        assert_eq!(br.close_token(), None);
    }

    #[test]
    fn test_section_kind_serde() {
        assert_eq!(serde_json::to_string(&SectionKind::Data).unwrap(), "\"data\"");
        let kind: SectionKind = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(kind, SectionKind::Text);
        assert_eq!(SectionKind::Data.as_str(), "data");
    }
}
