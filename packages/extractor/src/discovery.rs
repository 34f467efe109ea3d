//! Input file discovery and opening.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::read::GzDecoder;
use walkdir::WalkDir;

use crate::config::{is_gzip, is_input_file, READ_BUFFER_CAPACITY};
use crate::error::{ExtractorError, Result};
use crate::extract::{extract_reader, RecordStream};
use crate::policy::FormatPolicy;
use crate::xml::EventReader;

/// Buffered input, decompressed if needed.
pub type InputReader = Box<dyn BufRead + Send>;

/// Expand command-line paths into the list of files to process.
///
/// Files are taken as given. Directories are walked recursively and
/// contribute every file with an accepted suffix, sorted by path so runs are
/// reproducible.
///
/// # Errors
///
/// Returns [`ExtractorError::InvalidInput`] if a path does not exist.
pub fn discover_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_input_file(e.path()))
                .map(walkdir::DirEntry::into_path)
                .collect();
            found.sort();
            tracing::debug!(dir = %path.display(), files = found.len(), "Scanned directory");
            files.extend(found);
        } else {
            return Err(ExtractorError::InvalidInput(format!(
                "input path not found: {}",
                path.display()
            )));
        }
    }

    Ok(files)
}

/// Open a file for reading, decompressing `.gz` files on the fly.
///
/// # Errors
///
/// Returns an IO error if the file cannot be opened.
pub fn open_input(path: &Path) -> Result<InputReader> {
    let file = File::open(path)?;
    if is_gzip(path) {
        let decoder = GzDecoder::new(file);
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_CAPACITY, decoder)))
    } else {
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_CAPACITY, file)))
    }
}

/// Stream the records of one input file.
///
/// # Errors
///
/// Returns an IO error if the file cannot be opened.
pub fn extract_file(
    policy: Arc<FormatPolicy>,
    path: &Path,
) -> Result<RecordStream<EventReader<InputReader>>> {
    Ok(extract_reader(policy, open_input(path)?))
}
