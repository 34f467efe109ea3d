//! Format policies: per-dialect element tables and transforms.
//!
//! A [`FormatPolicy`] is the only place format knowledge lives; the
//! extractor itself never branches on the format. Policies come from the
//! built-in constructors in [`formats`] or from YAML files via [`file`].

mod core;
pub mod file;
pub mod formats;
mod types;

pub use core::{AttributePredicate, ElementPredicate, FormatPolicy, PolicyBuilder, TextTransform};
pub use file::{from_yaml_str, load_policy_file, PolicyFile};
pub use formats::{builtin, plos, pubmed};
pub use types::{ElementRole, Markup, SectionKind, SectionSpec};
