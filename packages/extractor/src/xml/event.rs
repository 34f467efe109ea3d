//! Parse events consumed by the extraction engine.

/// A single attribute of an opening element, local name only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name without namespace prefix.
    pub name: String,

    /// Unescaped attribute value.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One event of a tokenized XML document.
///
/// Element names are local names (`article-id`, not `jats:article-id`).
/// Self-closing elements appear as an `Open` immediately followed by a
/// `Close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// An element was opened.
    Open {
        name: String,
        attributes: Vec<Attribute>,
    },

    /// An element was closed.
    Close { name: String },

    /// Character data, verbatim (whitespace included).
    Text(String),
}

impl XmlEvent {
    /// Opening event without attributes.
    #[must_use]
    pub fn open(name: impl Into<String>) -> Self {
        Self::Open {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Opening event with attributes given as `(name, value)` pairs.
    #[must_use]
    pub fn open_with<N, V>(name: impl Into<String>, attributes: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self::Open {
            name: name.into(),
            attributes: attributes
                .into_iter()
                .map(|(n, v)| Attribute::new(n, v))
                .collect(),
        }
    }

    /// Closing event.
    #[must_use]
    pub fn close(name: impl Into<String>) -> Self {
        Self::Close { name: name.into() }
    }

    /// Text event.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}
