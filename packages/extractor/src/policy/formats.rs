//! Built-in format policies for PLOS/JATS articles and PubMed citations.

use std::sync::Arc;

use super::core::{FormatPolicy, PolicyBuilder};
use crate::error::{ExtractorError, Result};
use crate::text;

/// Inline formatting shared by both formats.
fn with_markup(builder: PolicyBuilder) -> PolicyBuilder {
    builder
        .wrap(["bold", "b", "strong"], "**")
        .wrap(["italic", "i", "em", "underline", "u"], "_")
        .insert(["br", "hr"], " ")
}

/// Policy for PLOS full-text articles (JATS, one article per file).
///
/// The record id is the `<article-id>` whose attribute value is `pmid`.
#[must_use]
#[allow(clippy::expect_used)] // Static policy that is guaranteed to be valid
pub fn plos() -> FormatPolicy {
    let builder = FormatPolicy::builder("plos", "article-id")
        .doc_id_attribute_value("pmid")
        .format_doc_id(text::replace_slashes)
        .cleanup(text::cleanup)
        // Prose
        .section("article-title", "Title")
        .section("abstract", "Abstract")
        .section("body", "Body")
        // Bibliographic data
        .data_section("ref-list", "References")
        .data_section("pub-id", "PubId")
        .data_section("pub-date", "Metadata")
        .data_section("journal-meta", "Metadata")
        .data_section("year", "JournalYear")
        .data_section("journal-title", "Journal");

    // Skip tags - subtrees that never contribute text
    //   - title, label, caption: headings and figure/table captions
    //   - xref: citation markers like [12]; cleanup repairs the punctuation
    //     they leave behind
    //   - table-wrap, table: tabular data
    //   - object-id, ext-link: identifiers and URLs
    let builder = builder
        .skip([
            "title",
            "xref",
            "table-wrap",
            "table",
            "object-id",
            "label",
            "caption",
            "ext-link",
        ])
        // `ref` splits so every reference becomes its own segment
        .split_elements(["p", "div", "li", "ref"])
        // Keep "Smith J" from collapsing into "SmithJ"
        .split_tags(["surname"]);

    with_markup(builder)
        .build()
        .expect("built-in PLOS policy is valid")
}

/// Policy for PubMed/MEDLINE citation sets (many records per file).
///
/// Each `<MedlineCitation>` is one record; its first `<PMID>` is the id.
#[must_use]
#[allow(clippy::expect_used)] // Static policy that is guaranteed to be valid
pub fn pubmed() -> FormatPolicy {
    let builder = FormatPolicy::builder("pubmed", "PMID")
        .format_doc_id(text::identity)
        .cleanup(text::cleanup)
        .section("ArticleTitle", "Title")
        .section("AbstractText", "Abstract")
        .block_element("MedlineCitation");

    with_markup(builder)
        .build()
        .expect("built-in PubMed policy is valid")
}

/// Look up a built-in policy by name (case-insensitive).
///
/// # Errors
///
/// Returns [`ExtractorError::UnknownFormat`] for names other than those in
/// [`BUILTIN_FORMATS`](crate::config::BUILTIN_FORMATS).
pub fn builtin(name: &str) -> Result<Arc<FormatPolicy>> {
    match name.to_ascii_lowercase().as_str() {
        "plos" => Ok(Arc::new(plos())),
        "pubmed" => Ok(Arc::new(pubmed())),
        _ => Err(ExtractorError::UnknownFormat(name.to_string())),
    }
}

/// All built-in policies, in [`BUILTIN_FORMATS`](crate::config::BUILTIN_FORMATS) order.
#[must_use]
pub fn all_builtin() -> Vec<FormatPolicy> {
    vec![plos(), pubmed()]
}
