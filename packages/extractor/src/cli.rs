//! Command-line interface for the extractor.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::config::{validate_format, validate_jobs, DEFAULT_FORMAT};
use crate::discovery::{discover_inputs, extract_file};
use crate::error::{ExtractorError, Result};
use crate::output::{render_record, OutputFormat, RecordWriter};
use crate::policy::{self, FormatPolicy};

/// litmine extractor - pull logical sections out of PLOS/JATS and PubMed XML.
#[derive(Parser)]
#[command(name = "litmine-extractor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract records from XML files or directories.
    Extract {
        /// Input files or directories (.xml, .nxml, optionally .gz)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Built-in format (plos, pubmed)
        #[arg(short, long, conflicts_with = "policy")]
        format: Option<String>,

        /// YAML policy file to use instead of a built-in format
        #[arg(short, long)]
        policy: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,

        /// Write records to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Number of files processed in parallel (default: one per CPU)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Continue with the next file when a file cannot be read or parsed
        #[arg(long)]
        keep_going: bool,
    },

    /// List the built-in formats and their sections.
    Formats,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            paths,
            format,
            policy,
            output,
            out,
            jobs,
            keep_going,
        } => {
            let options = ExtractOptions {
                format,
                policy,
                output,
                out,
                jobs,
                keep_going,
            };
            extract_command(&paths, &options)
        }
        Commands::Formats => formats_command(),
    }
}

/// Options of the extract command.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub format: Option<String>,
    pub policy: Option<PathBuf>,
    pub output: OutputFormat,
    pub out: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub keep_going: bool,
}

/// Totals reported after an extract run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: usize,
    pub records: usize,
    pub skipped_records: usize,
    pub failed_files: usize,
}

/// Result of extracting one file.
struct FileOutcome {
    path: PathBuf,
    rendered: Vec<String>,
    skipped: usize,
    fatal: Option<ExtractorError>,
}

/// Resolve the policy from `--policy` or `--format`.
///
/// # Errors
///
/// Returns an error for unknown formats or unusable policy files.
pub fn resolve_policy(format: Option<&str>, policy_file: Option<&Path>) -> Result<Arc<FormatPolicy>> {
    if let Some(path) = policy_file {
        return Ok(Arc::new(policy::load_policy_file(path)?));
    }
    let name = format.unwrap_or(DEFAULT_FORMAT);
    validate_format(name)?;
    policy::builtin(name)
}

/// Execute the extract command.
fn extract_command(paths: &[PathBuf], options: &ExtractOptions) -> Result<()> {
    let summary = match &options.out {
        Some(path) => {
            let sink = BufWriter::new(File::create(path)?);
            let summary = extract_to(paths, options, sink)?;
            eprintln!(
                "{} {}",
                style("Saved to:").green().bold(),
                path.display()
            );
            summary
        }
        None => extract_to(paths, options, BufWriter::new(std::io::stdout().lock()))?,
    };

    eprintln!(
        "{} {} records from {} files",
        style("Extracted").bold(),
        style(summary.records).green(),
        summary.files
    );
    if summary.skipped_records > 0 {
        eprintln!(
            "  Skipped records: {}",
            style(summary.skipped_records).yellow().bold()
        );
    }
    if summary.failed_files > 0 {
        eprintln!(
            "  Failed files: {}",
            style(summary.failed_files).red().bold()
        );
    }

    Ok(())
}

/// Extract all inputs and write the records to `sink`, in input order.
///
/// Files are extracted in batches of one file per worker; a batch is
/// written and flushed before the next batch starts.
///
/// # Errors
///
/// Returns the first fatal per-file error unless `keep_going` is set, and
/// any error resolving the policy, walking the inputs or writing output.
pub fn extract_to<W: Write>(
    paths: &[PathBuf],
    options: &ExtractOptions,
    sink: W,
) -> Result<RunSummary> {
    // Validate everything before touching the inputs
    if let Some(jobs) = options.jobs {
        validate_jobs(jobs)?;
    }
    let policy = resolve_policy(options.format.as_deref(), options.policy.as_deref())?;
    let files = discover_inputs(paths)?;

    tracing::debug!(
        policy = policy.name(),
        files = files.len(),
        "Starting extraction"
    );

    let pb = progress_bar(files.len());

    let pool = build_pool(options.jobs)?;
    let batch_size = pool
        .as_ref()
        .map_or_else(rayon::current_num_threads, rayon::ThreadPool::current_num_threads)
        .max(1);

    let mut writer = RecordWriter::new(sink, options.output);
    let mut summary = RunSummary {
        files: files.len(),
        ..RunSummary::default()
    };

    // Each batch is written before the next one starts
    for batch in files.chunks(batch_size) {
        let extract_batch = || {
            batch
                .par_iter()
                .map(|path| {
                    let outcome = process_file(&policy, path, options.output);
                    pb.inc(1);
                    outcome
                })
                .collect::<Vec<_>>()
        };
        let outcomes = match &pool {
            Some(pool) => pool.install(extract_batch),
            None => extract_batch(),
        };

        for outcome in outcomes {
            for rendered in &outcome.rendered {
                writer.write_rendered(rendered)?;
            }
            summary.skipped_records += outcome.skipped;

            if let Some(err) = outcome.fatal {
                if !options.keep_going {
                    pb.finish_and_clear();
                    writer.finish()?;
                    return Err(err);
                }
                tracing::warn!(path = %outcome.path.display(), error = %err, "Failed to process file");
                summary.failed_files += 1;
            }
        }
        writer.flush()?;
    }
    pb.finish_and_clear();

    summary.records = writer.written();
    writer.finish()?;
    Ok(summary)
}

/// Progress bar for multi-file runs; hidden for a single file.
fn progress_bar(files: usize) -> ProgressBar {
    if files <= 1 {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(files as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30}] {pos}/{len} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Extracting...");
    pb
}

/// Dedicated worker pool when a worker count is given.
fn build_pool(jobs: Option<usize>) -> Result<Option<rayon::ThreadPool>> {
    jobs.map(|jobs| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| ExtractorError::InvalidInput(format!("cannot start workers: {e}")))
    })
    .transpose()
}

fn process_file(policy: &Arc<FormatPolicy>, path: &Path, format: OutputFormat) -> FileOutcome {
    let mut outcome = FileOutcome {
        path: path.to_path_buf(),
        rendered: Vec::new(),
        skipped: 0,
        fatal: None,
    };

    let stream = match extract_file(Arc::clone(policy), path) {
        Ok(stream) => stream,
        Err(e) => {
            outcome.fatal = Some(e);
            return outcome;
        }
    };

    for result in stream {
        match result.and_then(|record| render_record(&record, format)) {
            Ok(rendered) => outcome.rendered.push(rendered),
            Err(err) if err.is_recoverable() => {
                tracing::warn!(path = %path.display(), error = %err, "Skipped malformed record");
                outcome.skipped += 1;
            }
            Err(err) => {
                outcome.fatal = Some(err);
                break;
            }
        }
    }

    tracing::debug!(
        path = %path.display(),
        records = outcome.rendered.len(),
        skipped = outcome.skipped,
        "Processed file"
    );
    outcome
}

/// Execute the formats command.
fn formats_command() -> Result<()> {
    for policy in policy::formats::all_builtin() {
        let layout = if policy.is_multi_record() {
            "many records per file"
        } else {
            "one record per file"
        };
        println!(
            "{} ({layout}, id from <{}>)",
            style(policy.name()).cyan().bold(),
            policy.doc_id_element()
        );
        for (label, kind) in policy.section_labels() {
            println!("  {label} [{}]", kind.as_str());
        }
    }
    Ok(())
}
