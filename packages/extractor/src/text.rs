//! Text cleanup and identifier formatting transforms.
//!
//! These are the function values that built-in format policies plug into
//! their `cleanup` and `format_doc_id` slots. Policy files refer to them by
//! name (see [`named_cleanup`] and [`named_doc_id_format`]).

use regex::Regex;
use std::sync::LazyLock;

/// Runs of two or more whitespace characters.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

/// Whitespace followed by leftover brackets, commas or dashes before a period.
///
/// Removing `<xref>` citation markers leaves text like `"shown ( , - )."`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DANGLING_BEFORE_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[\s(),\-–]*\.").expect("valid regex"));

/// Whitespace before a comma.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SPACE_BEFORE_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+,").expect("valid regex"));

/// Normalize extracted section text.
///
/// Applied once per closed segment:
/// 1. collapse runs of whitespace into a single space,
/// 2. repair punctuation left dangling before a period,
/// 3. drop whitespace before a comma.
///
/// The transform is idempotent and accepts any input, including `""`.
///
/// # Examples
/// ```
/// use litmine_extractor::text::cleanup;
///
/// assert_eq!(cleanup("a    b"), "a b");
/// assert_eq!(cleanup("as shown ( , - ) ."), "as shown.");
/// assert_eq!(cleanup("cells , mice"), "cells, mice");
/// ```
pub fn cleanup(text: &str) -> String {
    let out = WHITESPACE_RUN.replace_all(text, " ");
    let out = DANGLING_BEFORE_PERIOD.replace_all(&out, ".");
    SPACE_BEFORE_COMMA.replace_all(&out, ",").into_owned()
}

/// Cleanup that leaves text untouched.
pub fn no_cleanup(text: &str) -> String {
    text.to_string()
}

/// Identifier format for DOI-like ids: `/` becomes `.`.
///
/// # Examples
/// ```
/// use litmine_extractor::text::replace_slashes;
///
/// assert_eq!(replace_slashes("10.1371/journal.pone"), "10.1371.journal.pone");
/// ```
pub fn replace_slashes(id: &str) -> String {
    id.replace('/', ".")
}

/// Identifier format that keeps the id as-is.
pub fn identity(id: &str) -> String {
    id.to_string()
}

/// Signature shared by cleanup and identifier transforms.
pub type TransformFn = fn(&str) -> String;

/// Look up a cleanup transform by its policy-file name.
pub fn named_cleanup(name: &str) -> Option<TransformFn> {
    match name {
        "standard" => Some(cleanup),
        "none" => Some(no_cleanup),
        _ => None,
    }
}

/// Look up an identifier transform by its policy-file name.
pub fn named_doc_id_format(name: &str) -> Option<TransformFn> {
    match name {
        "identity" => Some(identity),
        "replace_slashes" => Some(replace_slashes),
        _ => None,
    }
}
