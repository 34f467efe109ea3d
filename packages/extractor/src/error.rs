//! Error types for the extractor.
//!
//! Uses the dual-error pattern: `ExtractorError` for library consumers,
//! with `StructuralError` and `PolicyError` carrying the details of the two
//! failure classes the engine itself can produce.

use thiserror::Error;

/// Main error type for the extractor library.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// The element open/close sequence is malformed.
    #[error("Malformed XML structure: {0}")]
    Structural(#[from] StructuralError),

    /// The XML tokenizer rejected the input.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// A format policy could not be built.
    #[error("Invalid format policy: {0}")]
    Policy(#[from] PolicyError),

    /// No built-in policy with this name.
    #[error("Unknown format: '{0}'. Expected one of: {known}", known = crate::config::BUILTIN_FORMATS.join(", "))]
    UnknownFormat(String),

    /// A command-line input could not be used.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExtractorError {
    /// Whether extraction can continue with the next record of the same stream.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Structural(_))
    }
}

/// A malformed element sequence.
///
/// Only the record being built when the error occurs is lost.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// A close event arrived while no element was open.
    #[error("unexpected </{name}> with no open element")]
    UnmatchedClose { name: String },

    /// A close event does not match the innermost open element.
    #[error("unexpected </{name}>, expected </{expected}>")]
    MismatchedClose { name: String, expected: String },

    /// The stream ended with elements still open.
    #[error("input ended inside <{}>", .open.join("> <"))]
    UnclosedElements { open: Vec<String> },
}

/// A format policy that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The identifier element name is empty.
    #[error("document identifier element must not be empty")]
    MissingDocIdElement,

    /// An element name was empty.
    #[error("empty element name in {0}")]
    EmptyElementName(&'static str),

    /// An element is both skipped and mapped to a section.
    #[error("element <{0}> is both skipped and mapped to a section")]
    SkippedSection(String),

    /// A policy file names a transform that does not exist.
    #[error("unknown {kind} transform '{name}'")]
    UnknownTransform { kind: &'static str, name: String },

    /// An identifier attribute name was given without a value to match.
    #[error("doc_id.attribute_name '{0}' requires doc_id.attribute_value")]
    AttributeNameWithoutValue(String),

    /// A markup entry sets neither or both of `wrap` and `insert`.
    #[error("markup for <{0}> must set exactly one of 'wrap' or 'insert'")]
    InvalidMarkup(String),
}

/// Result type alias for extractor operations.
pub type Result<T> = std::result::Result<T, ExtractorError>;
