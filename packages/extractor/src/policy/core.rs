//! Format policy: the per-format description of how elements are treated.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::types::{ElementRole, Markup, SectionKind, SectionSpec};
use crate::error::PolicyError;
use crate::text;
use crate::xml::Attribute;

/// Transform applied to raw text (cleanup) or to a raw identifier.
pub type TextTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Predicate over an element name.
pub type ElementPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Predicate over the attributes of an identifier candidate.
pub type AttributePredicate = Arc<dyn Fn(&[Attribute]) -> bool + Send + Sync>;

/// Immutable description of one XML dialect.
///
/// A policy maps element names to roles (section, skip, split, markup) and
/// carries the identifier rules and cleanup function for its format. It is
/// built once with [`FormatPolicy::builder`] and then shared read-only by any
/// number of extractions, including across threads.
///
/// # Example
///
/// ```
/// use litmine_extractor::policy::{ElementRole, FormatPolicy};
///
/// let policy = FormatPolicy::builder("minimal", "id")
///     .section("abstract", "Abstract")
///     .skip(["xref"])
///     .split_elements(["p"])
///     .build()
///     .unwrap();
///
/// assert!(matches!(policy.role("abstract", None), ElementRole::Section(_)));
/// assert_eq!(policy.role("xref", None), ElementRole::Skip);
/// assert_eq!(policy.role("sec", None), ElementRole::Transparent);
/// ```
pub struct FormatPolicy {
    name: String,
    sections: HashMap<String, SectionSpec>,
    skip: HashSet<String>,
    split_elements: HashSet<String>,
    split_tags: HashSet<String>,
    markup: HashMap<String, Markup>,
    doc_id_element: String,
    doc_id_attribute: Option<AttributePredicate>,
    format_doc_id: TextTransform,
    cleanup: TextTransform,
    block_start: Option<ElementPredicate>,
    block_end: Option<ElementPredicate>,
}

impl FormatPolicy {
    /// Start building a policy whose identifier lives in `doc_id_element`.
    #[must_use]
    pub fn builder(name: impl Into<String>, doc_id_element: impl Into<String>) -> PolicyBuilder {
        PolicyBuilder::new(name, doc_id_element)
    }

    /// Policy name, e.g. `"plos"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the element holding the document identifier.
    #[must_use]
    pub fn doc_id_element(&self) -> &str {
        &self.doc_id_element
    }

    /// Whether an opening element is an identifier candidate.
    ///
    /// The name must equal the identifier element and, if the policy has an
    /// attribute check, the attributes must satisfy it.
    #[must_use]
    pub fn matches_doc_id(&self, name: &str, attributes: &[Attribute]) -> bool {
        name == self.doc_id_element
            && self
                .doc_id_attribute
                .as_ref()
                .is_none_or(|check| check(attributes))
    }

    /// Role of an element for text accumulation.
    ///
    /// Precedence is skip, split, split tag, section, markup. A [`SectionKind::Text`]
    /// section opened while the innermost open section is a
    /// [`SectionKind::Data`] section is transparent, so cited-work titles stay
    /// inside their reference.
    #[must_use]
    pub fn role(&self, name: &str, enclosing: Option<SectionKind>) -> ElementRole<'_> {
        if self.skip.contains(name) {
            return ElementRole::Skip;
        }
        if self.split_elements.contains(name) {
            return ElementRole::Split;
        }
        if self.split_tags.contains(name) {
            return ElementRole::SplitTag;
        }
        if let Some(spec) = self.sections.get(name) {
            if spec.kind == SectionKind::Text && enclosing == Some(SectionKind::Data) {
                return ElementRole::Transparent;
            }
            return ElementRole::Section(spec);
        }
        if let Some(markup) = self.markup.get(name) {
            return ElementRole::Markup(markup);
        }
        ElementRole::Transparent
    }

    /// Whether an opening element starts a new record.
    #[must_use]
    pub fn is_block_start(&self, name: &str) -> bool {
        self.block_start.as_ref().is_some_and(|start| start(name))
    }

    /// Whether a closing element ends the current record.
    #[must_use]
    pub fn is_block_end(&self, name: &str) -> bool {
        self.block_end.as_ref().is_some_and(|end| end(name))
    }

    /// Whether the format packs several records into one stream.
    #[must_use]
    pub fn is_multi_record(&self) -> bool {
        self.block_start.is_some()
    }

    /// Normalize a raw identifier.
    #[must_use]
    pub fn format_doc_id(&self, raw: &str) -> String {
        (self.format_doc_id)(raw)
    }

    /// Clean up the raw text of a segment.
    #[must_use]
    pub fn cleanup(&self, text: &str) -> String {
        (self.cleanup)(text)
    }

    /// Distinct section labels with their kinds, sorted by label.
    #[must_use]
    pub fn section_labels(&self) -> Vec<(&str, SectionKind)> {
        let labels: BTreeSet<(&str, SectionKind)> = self
            .sections
            .values()
            .map(|spec| (spec.label.as_str(), spec.kind))
            .collect();
        labels.into_iter().collect()
    }

    /// Section spec for an element, if it owns one.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&SectionSpec> {
        self.sections.get(name)
    }

    /// Check if an element subtree is skipped.
    #[must_use]
    pub fn should_skip(&self, name: &str) -> bool {
        self.skip.contains(name)
    }
}

impl fmt::Debug for FormatPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatPolicy")
            .field("name", &self.name)
            .field("doc_id_element", &self.doc_id_element)
            .field("sections", &self.sections.len())
            .field("skip", &self.skip.len())
            .field("split_elements", &self.split_elements.len())
            .field("split_tags", &self.split_tags.len())
            .field("markup", &self.markup.len())
            .field("multi_record", &self.is_multi_record())
            .finish_non_exhaustive()
    }
}

/// Builder for [`FormatPolicy`].
///
/// Defaults: identity identifier format, standard [`text::cleanup`], no
/// attribute check and a single record per stream.
pub struct PolicyBuilder {
    name: String,
    sections: HashMap<String, SectionSpec>,
    skip: HashSet<String>,
    split_elements: HashSet<String>,
    split_tags: HashSet<String>,
    markup: HashMap<String, Markup>,
    doc_id_element: String,
    doc_id_attribute: Option<AttributePredicate>,
    format_doc_id: TextTransform,
    cleanup: TextTransform,
    block_start: Option<ElementPredicate>,
    block_end: Option<ElementPredicate>,
}

impl PolicyBuilder {
    fn new(name: impl Into<String>, doc_id_element: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: HashMap::new(),
            skip: HashSet::new(),
            split_elements: HashSet::new(),
            split_tags: HashSet::new(),
            markup: HashMap::new(),
            doc_id_element: doc_id_element.into(),
            doc_id_attribute: None,
            format_doc_id: Arc::new(text::identity),
            cleanup: Arc::new(text::cleanup),
            block_start: None,
            block_end: None,
        }
    }

    /// Map an element to a prose section.
    #[must_use]
    pub fn section(self, element: impl Into<String>, label: impl Into<String>) -> Self {
        self.section_of_kind(element, label, SectionKind::Text)
    }

    /// Map an element to a metadata section.
    #[must_use]
    pub fn data_section(self, element: impl Into<String>, label: impl Into<String>) -> Self {
        self.section_of_kind(element, label, SectionKind::Data)
    }

    /// Map an element to a section of the given kind.
    #[must_use]
    pub fn section_of_kind(
        mut self,
        element: impl Into<String>,
        label: impl Into<String>,
        kind: SectionKind,
    ) -> Self {
        self.sections
            .insert(element.into(), SectionSpec::new(label, kind));
        self
    }

    /// Elements whose whole subtree is ignored.
    #[must_use]
    pub fn skip(mut self, elements: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.skip.extend(elements.into_iter().map(Into::into));
        self
    }

    /// Elements whose open and close start a new segment.
    #[must_use]
    pub fn split_elements(mut self, elements: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.split_elements
            .extend(elements.into_iter().map(Into::into));
        self
    }

    /// Elements whose open and close insert a space.
    #[must_use]
    pub fn split_tags(mut self, elements: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.split_tags.extend(elements.into_iter().map(Into::into));
        self
    }

    /// Inline markup for an element.
    #[must_use]
    pub fn markup(mut self, element: impl Into<String>, markup: Markup) -> Self {
        self.markup.insert(element.into(), markup);
        self
    }

    /// Surround the text of each element with `token`.
    #[must_use]
    pub fn wrap(self, elements: impl IntoIterator<Item = impl Into<String>>, token: &str) -> Self {
        elements.into_iter().fold(self, |builder, element| {
            builder.markup(element, Markup::Wrap(token.to_string()))
        })
    }

    /// Insert `token` where each element opens.
    #[must_use]
    pub fn insert(self, elements: impl IntoIterator<Item = impl Into<String>>, token: &str) -> Self {
        elements.into_iter().fold(self, |builder, element| {
            builder.markup(element, Markup::Insert(token.to_string()))
        })
    }

    /// Only accept identifier elements carrying an attribute with this value.
    #[must_use]
    pub fn doc_id_attribute_value(self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.doc_id_attribute(move |attributes: &[Attribute]| {
            attributes.iter().any(|attr| attr.value == value)
        })
    }

    /// Only accept identifier elements whose attribute `name` equals `value`.
    #[must_use]
    pub fn doc_id_attribute_named(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.doc_id_attribute(move |attributes: &[Attribute]| {
            attributes
                .iter()
                .any(|attr| attr.name == name && attr.value == value)
        })
    }

    /// Custom attribute check for identifier elements.
    #[must_use]
    pub fn doc_id_attribute(
        mut self,
        check: impl Fn(&[Attribute]) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.doc_id_attribute = Some(Arc::new(check));
        self
    }

    /// Normalization applied to the trimmed identifier text.
    #[must_use]
    pub fn format_doc_id(mut self, format: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.format_doc_id = Arc::new(format);
        self
    }

    /// Cleanup applied to every finished segment.
    #[must_use]
    pub fn cleanup(mut self, cleanup: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.cleanup = Arc::new(cleanup);
        self
    }

    /// Use one element as the record container of a multi-record stream.
    #[must_use]
    pub fn block_element(self, element: impl Into<String>) -> Self {
        let start = element.into();
        let end = start.clone();
        self.block_start(move |name| name == start)
            .block_end(move |name| name == end)
    }

    /// Custom predicate for the element that starts a record.
    #[must_use]
    pub fn block_start(mut self, start: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.block_start = Some(Arc::new(start));
        self
    }

    /// Custom predicate for the element that ends a record.
    #[must_use]
    pub fn block_end(mut self, end: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.block_end = Some(Arc::new(end));
        self
    }

    /// Validate and build the policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if the identifier element or any mapped element
    /// name is empty, or if an element is both skipped and a section.
    pub fn build(self) -> Result<FormatPolicy, PolicyError> {
        if self.doc_id_element.trim().is_empty() {
            return Err(PolicyError::MissingDocIdElement);
        }

        let named_sets: [(&'static str, &HashSet<String>); 3] = [
            ("skip", &self.skip),
            ("split_elements", &self.split_elements),
            ("split_tags", &self.split_tags),
        ];
        for (what, set) in named_sets {
            if set.iter().any(|name| name.is_empty()) {
                return Err(PolicyError::EmptyElementName(what));
            }
        }
        if self.sections.keys().any(String::is_empty) {
            return Err(PolicyError::EmptyElementName("sections"));
        }
        if self.markup.keys().any(String::is_empty) {
            return Err(PolicyError::EmptyElementName("markup"));
        }

        let mut conflicts: Vec<&String> = self
            .sections
            .keys()
            .filter(|name| self.skip.contains(*name))
            .collect();
        conflicts.sort();
        if let Some(name) = conflicts.first() {
            return Err(PolicyError::SkippedSection((*name).clone()));
        }

        Ok(FormatPolicy {
            name: self.name,
            sections: self.sections,
            skip: self.skip,
            split_elements: self.split_elements,
            split_tags: self.split_tags,
            markup: self.markup,
            doc_id_element: self.doc_id_element,
            doc_id_attribute: self.doc_id_attribute,
            format_doc_id: self.format_doc_id,
            cleanup: self.cleanup,
            block_start: self.block_start,
            block_end: self.block_end,
        })
    }
}
