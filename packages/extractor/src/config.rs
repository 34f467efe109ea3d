//! Configuration constants and validation functions for the extractor.

use std::path::Path;

use crate::error::{ExtractorError, Result};

/// Names of the built-in format policies.
pub const BUILTIN_FORMATS: &[&str] = &["plos", "pubmed"];

/// Format used when neither `--format` nor `--policy` is given.
pub const DEFAULT_FORMAT: &str = "plos";

/// File suffixes accepted when walking input directories.
///
/// `.nxml` is the PubMed Central / PLOS full-text convention, `.xml.gz`
/// the PubMed baseline distribution format.
pub const INPUT_SUFFIXES: &[&str] = &[".xml", ".nxml", ".xml.gz", ".nxml.gz"];

/// Buffer size for reading input files.
pub const READ_BUFFER_CAPACITY: usize = 1024 * 1024;

/// Initial capacity of the quick-xml event buffer.
pub const EVENT_BUFFER_CAPACITY: usize = 4096;

/// Separator placed between the segments of a section when it is
/// rendered as a single string.
pub const SEGMENT_SEPARATOR: &str = "\n\n";

/// Validate a built-in format name.
///
/// # Examples
/// ```
/// use litmine_extractor::config::validate_format;
///
/// assert!(validate_format("plos").is_ok());
/// assert!(validate_format("PubMed").is_ok());
/// assert!(validate_format("jats").is_err());
/// ```
pub fn validate_format(name: &str) -> Result<()> {
    let lower = name.to_ascii_lowercase();
    if BUILTIN_FORMATS.contains(&lower.as_str()) {
        Ok(())
    } else {
        Err(ExtractorError::UnknownFormat(name.to_string()))
    }
}

/// Check whether a file name has one of the accepted input suffixes.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use litmine_extractor::config::is_input_file;
///
/// assert!(is_input_file(Path::new("pubmed24n0001.xml.gz")));
/// assert!(is_input_file(Path::new("journal.pone.0001.nxml")));
/// assert!(!is_input_file(Path::new("README.md")));
/// ```
pub fn is_input_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_ascii_lowercase();
    INPUT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Check whether a file is gzip-compressed, judging by its name.
pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// Validate the worker count for parallel extraction.
pub fn validate_jobs(jobs: usize) -> Result<()> {
    if jobs == 0 {
        return Err(ExtractorError::InvalidInput(
            "--jobs must be at least 1".to_string(),
        ));
    }
    Ok(())
}
