//! litmine extractor - streaming section extraction for biomedical XML.
//!
//! This crate turns PLOS/JATS full-text articles and PubMed/MEDLINE citation
//! sets into [`DocumentRecord`]s: a document id plus cleaned text grouped
//! under logical section labels ("Title", "Abstract", "Body", ...). Input is
//! processed as a stream of parse events, so large files and multi-record
//! PubMed baselines never need to fit in memory.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use litmine_extractor::{extract_str, policy};
//!
//! let xml = r#"<article>
//!   <front><article-meta>
//!     <article-id pub-id-type="pmid">18183289</article-id>
//!     <abstract><p>Mice were <italic>not</italic> harmed (<xref>3</xref>).</p></abstract>
//!   </article-meta></front>
//! </article>"#;
//!
//! let record = extract_str(Arc::new(policy::plos()), xml).next().unwrap().unwrap();
//! assert_eq!(record.id, "18183289");
//! assert_eq!(record.text("Abstract").as_deref(), Some("Mice were _not_ harmed."));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants and validation
//! - [`types`]: Output data types ([`DocumentRecord`], [`Section`])
//! - [`error`]: Error types and Result alias
//! - [`xml`]: quick-xml based event reader
//! - [`text`]: Cleanup and identifier transforms
//! - [`policy`]: Format policies, built-in and from YAML files
//! - [`extract`]: The streaming extractor and record iterator
//! - [`discovery`]: Input file discovery and gzip handling
//! - [`output`]: JSON Lines and YAML writers
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod output;
pub mod policy;
pub mod text;
pub mod types;
pub mod xml;

// Re-export main functions
pub use extract::{extract_reader, extract_str, RecordStream, SectionExtractor};

// Re-export commonly used items
pub use error::{ExtractorError, PolicyError, Result, StructuralError};
pub use policy::{FormatPolicy, SectionKind};
pub use types::{DocumentRecord, Section};
