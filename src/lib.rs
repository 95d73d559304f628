//! tsdoctor: maintenance tools for TypeScript codebases over SQL migrations
//!
//! Two independent batch tools share this crate: a schema-to-types generator
//! that derives a typed data-access interface from a directory of migration
//! files, and a diagnostic-driven patcher that rewrites source lines
//! implicated by known classes of type-checker diagnostics.

pub mod error;
pub mod model;
pub mod parser;
pub mod patcher;
pub mod typegen;

mod util;

use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

pub use error::TsDoctorError;
pub use patcher::{DiagnosticsSource, FixCounts};

/// Options for generating the types artifact
#[derive(Debug, Clone)]
pub struct GenTypesOptions {
    /// Directory holding the ordered schema documents
    pub migrations_dir: PathBuf,
    /// Path of the generated declaration file, overwritten wholesale
    pub output_path: PathBuf,
    /// Enable verbose output
    pub verbose: bool,
}

/// Counts reported by a generator run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypesSummary {
    pub documents: usize,
    pub tables: usize,
    pub enums: usize,
}

/// Generate the typed-interface artifact from a migrations directory.
pub fn generate_types(options: &GenTypesOptions) -> Result<TypesSummary> {
    let files = parser::discover_migrations(&options.migrations_dir)?;

    if options.verbose {
        println!(
            "Found {} migration files in {}",
            files.len(),
            options.migrations_dir.display()
        );
    }

    let documents = parser::parse_migration_files(&files)?;
    if options.verbose {
        for document in &documents {
            println!(
                "  {}: {} statements",
                document.path.display(),
                document.statements.len()
            );
        }
    }

    let model = model::build_model(&documents);
    typegen::write_types(&model, &options.output_path)?;

    if options.verbose {
        println!("Wrote {}", options.output_path.display());
    }

    Ok(TypesSummary {
        documents: documents.len(),
        tables: model.table_count(),
        enums: model.enum_count(),
    })
}

/// Options for a patcher run
#[derive(Debug, Clone)]
pub struct FixOptions {
    /// Directory the type checker runs in; relative diagnostic paths resolve
    /// against it
    pub project_dir: PathBuf,
    /// Where the diagnostic stream comes from
    pub source: DiagnosticsSource,
    /// Only patch files whose diagnostic path starts with this prefix
    pub scope: Option<PathBuf>,
    /// Module specifier for the helper-type import
    pub import_from: String,
    /// Re-run the type checker afterwards and report the remaining count
    pub recheck: bool,
    /// Enable verbose output
    pub verbose: bool,
}

/// Counts reported by a patcher run
#[derive(Debug, Clone, Default)]
pub struct FixSummary {
    /// Files actually rewritten
    pub files_patched: usize,
    /// Files skipped because they could not be read or written
    pub files_skipped: usize,
    /// Diagnostics dropped up front as unsupported categories
    pub unsupported: usize,
    /// Per-category rewrite counts, summed over all files
    pub counts: FixCounts,
    /// Diagnostic count after patching, when `recheck` was requested
    pub remaining_errors: Option<usize>,
}

/// Apply targeted rewrites for a batch of type-checker diagnostics.
pub fn fix_diagnostics(options: &FixOptions) -> Result<FixSummary> {
    let text = patcher::load_diagnostics(&options.source, &options.project_dir)?;

    let mut summary = FixSummary::default();
    let records: Vec<_> = patcher::parse_diagnostics(&text)
        .into_iter()
        .filter(|record| {
            if patcher::is_supported_code(&record.code) {
                true
            } else {
                summary.unsupported += 1;
                false
            }
        })
        .filter(|record| match &options.scope {
            Some(prefix) => record.file.starts_with(prefix),
            None => true,
        })
        .collect();

    if options.verbose {
        println!("{} diagnostics in scope", records.len());
    }

    for (file, file_records) in patcher::group_by_file(records) {
        let path = if file.is_absolute() {
            file.clone()
        } else {
            options.project_dir.join(&file)
        };

        match patcher::patch_file(&path, &file_records, &options.import_from) {
            Ok(outcome) => {
                if outcome.changed {
                    println!("  {}: {} rewrite(s)", file.display(), outcome.counts.rewrites());
                    summary.files_patched += 1;
                } else if options.verbose {
                    println!("  {}: nothing to do", file.display());
                }
                summary.counts.absorb(outcome.counts);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file");
                summary.files_skipped += 1;
            }
        }
    }

    if options.recheck {
        let text = patcher::run_type_checker(&options.project_dir)?;
        summary.remaining_errors = Some(patcher::parse_diagnostics(&text).len());
    }

    Ok(summary)
}
