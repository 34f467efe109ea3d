//! Record serialization: JSON Lines or a YAML document stream.

use std::io::Write;

use clap::ValueEnum;

use crate::error::Result;
use crate::types::DocumentRecord;

/// Serialization format for extracted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// One YAML document per record, separated by `---`.
    Yaml,
}

/// Render one record, including its trailing newline.
///
/// # Errors
///
/// Returns a serialization error from `serde_json` or `serde_yaml_ng`.
pub fn render_record(record: &DocumentRecord, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut line = serde_json::to_string(record)?;
            line.push('\n');
            Ok(line)
        }
        OutputFormat::Yaml => {
            let body = serde_yaml_ng::to_string(record)?;
            Ok(format!("---\n{body}"))
        }
    }
}

/// Writes records to a sink in a fixed format.
pub struct RecordWriter<W: Write> {
    sink: W,
    format: OutputFormat,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W, format: OutputFormat) -> Self {
        Self {
            sink,
            format,
            written: 0,
        }
    }

    /// Serialize and write one record.
    ///
    /// # Errors
    ///
    /// Returns a serialization or IO error.
    pub fn write(&mut self, record: &DocumentRecord) -> Result<()> {
        let rendered = render_record(record, self.format)?;
        self.write_rendered(&rendered)
    }

    /// Write a record already produced by [`render_record`].
    ///
    /// # Errors
    ///
    /// Returns an IO error.
    pub fn write_rendered(&mut self, rendered: &str) -> Result<()> {
        self.sink.write_all(rendered.as_bytes())?;
        self.written += 1;
        Ok(())
    }

    /// Flush records written so far.
    ///
    /// # Errors
    ///
    /// Returns an IO error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    /// Number of records written.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and return the sink.
    ///
    /// # Errors
    ///
    /// Returns an IO error if flushing fails.
    pub fn finish(mut self) -> Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}
