//! @dose
//! purpose: This module implements the doc aggregator. It enumerates candidate files, runs
//!     the static extractor and the metadata reader for each one, merges the two results
//!     and writes the JSON array to the output file in one atomic step.
//!
//! when-editing:
//!     - !Output order is candidate order; collect after par_iter, never push from workers
//!     - !`file` is assigned here and must survive any key coming from either source
//!     - Per-file failures are logged and recorded in FileOutcome, never propagated
//!
//! invariants:
//!     - A missing input directory or an empty candidate set writes nothing
//!     - The output file is either fully replaced or left untouched
//!     - Two runs over unchanged inputs produce byte-identical output
//!
//! do-not:
//!     - Never write the output with fs::write; readers must not see a truncated file
//!     - Never let a single file's failure abort the batch
//!
//! gotchas:
//!     - A file whose static extraction failed and has no metadata still yields {file}
//!       unless drop_failed is set
//!     - The temp file is created next to the output so the final rename stays on one filesystem
//!     - The replacement keeps an existing output's mode; a new output gets 0644 on unix
//!
//! flows:
//!     - Generate: check dir -> collect candidates -> per file (extract || read) -> merge
//!       -> serialize -> temp file -> persist

use crate::annotation::{AnnotationRecord, AnnotationRegistry, LoadError, MetadataReader, ModuleId};
use crate::candidates::{collect_candidates, Candidate, CandidateFilter};
use crate::cli::GenerateArgs;
use crate::config::{normalize_extensions, Config};
use crate::parser::{
    extract_component, AnalyzerFactory, ComponentResolver, ExtractionError, FindExportedComponent,
};
use crate::types::{ComponentDoc, ComponentDocRecord};
use anyhow::{bail, Context};
use rayon::prelude::*;
use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Input directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("No candidate files with extension(s) {extensions} in {}", path.display())]
    NoCandidateFiles { path: PathBuf, extensions: String },
    #[error("Failed to serialize documentation: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Resolved settings for one generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub input_dir: PathBuf,
    pub output: PathBuf,
    pub extensions: Vec<String>,
    pub exclude: Vec<String>,
    pub recursive: bool,
    pub drop_failed: bool,
    pub allow_empty: bool,
}

impl GenerateOptions {
    /// Options with the default policies
    pub fn new(input_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self::from_config(input_dir, output, &Config::default())
    }

    pub fn from_config(
        input_dir: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        config: &Config,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output: output.into(),
            extensions: config.extensions.clone(),
            exclude: config.exclude.clone(),
            recursive: config.recursive,
            drop_failed: config.drop_failed,
            allow_empty: config.allow_empty,
        }
    }

    /// Config values overridden by command-line flags
    pub fn from_args(args: &GenerateArgs, config: &Config) -> Self {
        let mut opts = Self::from_config(&args.input_dir, &args.output, config);
        if !args.extensions.is_empty() {
            opts.extensions = normalize_extensions(&args.extensions);
        }
        opts.exclude.extend(args.exclude.iter().cloned());
        opts.recursive |= args.recursive;
        opts.drop_failed |= args.drop_failed;
        opts.allow_empty |= args.allow_empty;
        opts
    }
}

/// How much documentation a file produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Static extraction succeeded and the metadata read did not fail
    Complete,
    /// One source produced documentation, the other failed
    Partial,
    /// Static extraction failed and no metadata was found
    Failed,
}

/// Results of both sources for one candidate file
#[derive(Debug)]
pub struct FileOutcome {
    pub file: String,
    pub static_result: Result<ComponentDoc, ExtractionError>,
    pub runtime_result: Result<Option<AnnotationRecord>, LoadError>,
}

impl FileOutcome {
    pub fn status(&self) -> FileStatus {
        match (&self.static_result, &self.runtime_result) {
            (Ok(_), Ok(_)) => FileStatus::Complete,
            (Err(_), Ok(None)) | (Err(_), Err(_)) => FileStatus::Failed,
            _ => FileStatus::Partial,
        }
    }

    /// Merge both sources into the output record
    pub fn into_record(self) -> ComponentDocRecord {
        let static_fields = self.static_result.ok().map(ComponentDoc::into_fields);
        let runtime_fields = self
            .runtime_result
            .ok()
            .flatten()
            .map(AnnotationRecord::into_fields);
        ComponentDocRecord::merge(self.file, static_fields, runtime_fields)
    }
}

/// Summary of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub output: PathBuf,
    /// Number of records in the output array
    pub written: usize,
    pub complete: usize,
    pub partial: usize,
    pub failed: usize,
    /// Failed files left out of the output
    pub dropped: usize,
}

/// Document every candidate of `opts.input_dir` and write the array to `opts.output`
pub fn generate(
    opts: &GenerateOptions,
    reader: &dyn MetadataReader,
) -> Result<GenerateReport, GenerateError> {
    if !opts.input_dir.is_dir() {
        return Err(GenerateError::DirectoryNotFound(opts.input_dir.clone()));
    }

    let factory = AnalyzerFactory::new();
    for ext in &opts.extensions {
        if !factory.supports_extension(ext) {
            warn!(
                "Extension '{}' has no analyzer (supported: {})",
                ext,
                factory.supported_extensions().join(", ")
            );
        }
    }

    let filter = CandidateFilter::new(&opts.extensions, &opts.exclude, opts.recursive);
    let candidates = collect_candidates(&opts.input_dir, &filter);
    if candidates.is_empty() && !opts.allow_empty {
        return Err(GenerateError::NoCandidateFiles {
            path: opts.input_dir.clone(),
            extensions: filter.extensions().join(", "),
        });
    }

    info!(
        "Documenting {} files from {}",
        candidates.len(),
        opts.input_dir.display()
    );

    let resolver = FindExportedComponent;
    let outcomes: Vec<FileOutcome> = candidates
        .par_iter()
        .map(|candidate| process_file(candidate, &opts.input_dir, &factory, &resolver, reader))
        .collect();

    let mut report = GenerateReport {
        output: opts.output.clone(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome.status() {
            FileStatus::Complete => report.complete += 1,
            FileStatus::Partial => report.partial += 1,
            FileStatus::Failed => {
                report.failed += 1;
                if opts.drop_failed {
                    debug!(file = %outcome.file, "dropping undocumented file");
                    report.dropped += 1;
                    continue;
                }
            }
        }
        records.push(outcome.into_record());
    }

    write_json_atomic(&opts.output, &records)?;
    report.written = records.len();

    info!(
        "Wrote {} records (complete: {}, partial: {}, failed: {}, dropped: {})",
        report.written, report.complete, report.partial, report.failed, report.dropped
    );
    Ok(report)
}

/// Run both sources for one file concurrently and log their failures
fn process_file(
    candidate: &Candidate,
    root: &Path,
    factory: &AnalyzerFactory,
    resolver: &dyn ComponentResolver,
    reader: &dyn MetadataReader,
) -> FileOutcome {
    debug!(file = %candidate.relative, "processing");

    let (static_result, runtime_result) = rayon::join(
        || extract_component(&candidate.path, factory, resolver),
        || ModuleId::from_path(root, &candidate.path).and_then(|module| reader.read(&module)),
    );

    if let Err(e) = &static_result {
        warn!(file = %candidate.relative, "Static extraction failed: {}", e);
    }
    if let Err(e) = &runtime_result {
        warn!(file = %candidate.relative, "Metadata read failed: {}", e);
    }

    FileOutcome {
        file: candidate.relative.clone(),
        static_result,
        runtime_result,
    }
}

/// Serialize `records` with two-space indentation and replace `output` atomically
fn write_json_atomic(output: &Path, records: &[ComponentDocRecord]) -> Result<(), GenerateError> {
    let content = serde_json::to_string_pretty(records)?;

    let write_error = |source: io::Error| GenerateError::Write {
        path: output.to_path_buf(),
        source,
    };

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Dropping the temp file on any early return removes it
    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(content.as_bytes()).map_err(write_error)?;
    if let Some(permissions) = output_permissions(output) {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(write_error)?;
    }
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(output).map_err(|e| write_error(e.error))?;

    Ok(())
}

/// Mode for the replacement file: the existing output's, else a world-readable default.
/// Temp files are created owner-only.
fn output_permissions(output: &Path) -> Option<Permissions> {
    match fs::metadata(output) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_output_permissions(),
    }
}

#[cfg(unix)]
fn default_output_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_output_permissions() -> Option<Permissions> {
    None
}

/// CLI entry: load config and annotations, generate, and report on stdout
pub fn run_generate(args: &GenerateArgs) -> anyhow::Result<GenerateReport> {
    let config = match &args.config {
        Some(path) => {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            Config::load_file(path)
        }
        None => Config::load(&args.input_dir),
    };

    let registry = match args.annotations.as_ref().or(config.annotations.as_ref()) {
        Some(manifest) => AnnotationRegistry::from_manifest(manifest)?,
        None => AnnotationRegistry::new(),
    };
    debug!("Loaded {} annotation records", registry.len());

    let opts = GenerateOptions::from_args(args, &config);
    let report = generate(&opts, &registry).with_context(|| {
        format!(
            "Failed to generate documentation from {}",
            opts.input_dir.display()
        )
    })?;

    println!("Documentation generated at {}", report.output.display());
    Ok(report)
}
