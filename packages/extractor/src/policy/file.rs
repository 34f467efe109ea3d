//! YAML policy files.
//!
//! A policy file describes a format the same way the built-in policies do,
//! with transforms referenced by name:
//!
//! ```yaml
//! name: plos
//! doc_id:
//!   element: article-id
//!   attribute_value: pmid
//!   format: replace_slashes
//! cleanup: standard
//! sections:
//!   abstract: { label: Abstract }
//!   journal-title: { label: Journal, kind: data }
//! skip: [xref]
//! split_elements: [p]
//! markup:
//!   bold: { wrap: "**" }
//!   br: { insert: " " }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::core::FormatPolicy;
use super::types::{Markup, SectionKind};
use crate::error::{PolicyError, Result};
use crate::text;

/// Serialized form of a [`FormatPolicy`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyFile {
    pub name: String,
    pub doc_id: DocIdEntry,
    #[serde(default = "default_cleanup")]
    pub cleanup: String,
    #[serde(default)]
    pub sections: BTreeMap<String, SectionEntry>,
    #[serde(default)]
    pub skip: Vec<String>,
    #[serde(default)]
    pub split_elements: Vec<String>,
    #[serde(default)]
    pub split_tags: Vec<String>,
    #[serde(default)]
    pub markup: BTreeMap<String, MarkupEntry>,
    /// Element that starts and ends a record in multi-record streams.
    #[serde(default)]
    pub block: Option<String>,
}

/// Identifier rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocIdEntry {
    pub element: String,
    /// Required attribute value.
    #[serde(default)]
    pub attribute_value: Option<String>,
    /// Restricts `attribute_value` to the attribute with this name.
    #[serde(default)]
    pub attribute_name: Option<String>,
    #[serde(default = "default_doc_id_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionEntry {
    pub label: String,
    #[serde(default)]
    pub kind: SectionKind,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkupEntry {
    #[serde(default)]
    pub wrap: Option<String>,
    #[serde(default)]
    pub insert: Option<String>,
}

fn default_cleanup() -> String {
    "standard".to_string()
}

fn default_doc_id_format() -> String {
    "identity".to_string()
}

impl PolicyFile {
    /// Build the policy this file describes.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] for unknown transform names, ambiguous markup
    /// entries or anything [`PolicyBuilder::build`](super::PolicyBuilder::build)
    /// rejects.
    pub fn into_policy(self) -> std::result::Result<FormatPolicy, PolicyError> {
        let cleanup =
            text::named_cleanup(&self.cleanup).ok_or_else(|| PolicyError::UnknownTransform {
                kind: "cleanup",
                name: self.cleanup.clone(),
            })?;
        let format = text::named_doc_id_format(&self.doc_id.format).ok_or_else(|| {
            PolicyError::UnknownTransform {
                kind: "doc_id format",
                name: self.doc_id.format.clone(),
            }
        })?;

        let mut builder = FormatPolicy::builder(self.name, self.doc_id.element)
            .format_doc_id(format)
            .cleanup(cleanup)
            .skip(self.skip)
            .split_elements(self.split_elements)
            .split_tags(self.split_tags);

        builder = match (self.doc_id.attribute_name, self.doc_id.attribute_value) {
            (Some(name), Some(value)) => builder.doc_id_attribute_named(name, value),
            (None, Some(value)) => builder.doc_id_attribute_value(value),
            (Some(name), None) => return Err(PolicyError::AttributeNameWithoutValue(name)),
            (None, None) => builder,
        };

        for (element, entry) in self.sections {
            builder = builder.section_of_kind(element, entry.label, entry.kind);
        }

        for (element, entry) in self.markup {
            let markup = match (entry.wrap, entry.insert) {
                (Some(token), None) => Markup::Wrap(token),
                (None, Some(token)) => Markup::Insert(token),
                _ => return Err(PolicyError::InvalidMarkup(element)),
            };
            builder = builder.markup(element, markup);
        }

        if let Some(block) = self.block {
            builder = builder.block_element(block);
        }

        builder.build()
    }
}

/// Parse a policy from YAML text.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or describes an invalid policy.
pub fn from_yaml_str(yaml: &str) -> Result<FormatPolicy> {
    let file: PolicyFile = serde_yaml_ng::from_str(yaml)?;
    tracing::debug!(name = %file.name, sections = file.sections.len(), "Loaded policy file");
    Ok(file.into_policy()?)
}

/// Read and parse a policy file from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid policy.
pub fn load_policy_file(path: &Path) -> Result<FormatPolicy> {
    let yaml = std::fs::read_to_string(path)?;
    from_yaml_str(&yaml)
}
