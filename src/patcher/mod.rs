//! Diagnostic-driven source patching
//!
//! Consumes a type-checker diagnostic stream, groups records by file, and
//! applies the minimal line-level rewrite for each supported category. Only
//! the rewritten files are persisted; the diagnostics themselves are
//! ephemeral. The patcher never validates its own output semantically —
//! re-running the type checker is the caller's correctness signal.

mod checker;
mod diagnostics;
mod rewrite;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::TsDoctorError;
use crate::util::read_file_with_encoding_fallback;

pub use checker::run_type_checker;
pub use diagnostics::{is_supported_code, parse_diagnostics, unknown_identifier, DiagnosticRecord};
pub use rewrite::{classify, patch_lines, FixAction, FixCounts};

/// Where the patcher gets its diagnostic stream from.
#[derive(Debug, Clone)]
pub enum DiagnosticsSource {
    /// A saved diagnostic file
    File(PathBuf),
    /// Standard input (`--diagnostics -`)
    Stdin,
    /// Invoke the type checker and capture its combined output
    TypeChecker,
}

/// Load the raw diagnostic text from the configured source.
pub fn load_diagnostics(source: &DiagnosticsSource, project_dir: &Path) -> Result<String> {
    match source {
        DiagnosticsSource::File(path) => {
            Ok(read_file_with_encoding_fallback(path).map_err(|e| {
                TsDoctorError::DiagnosticsReadError {
                    path: path.clone(),
                    source: e,
                }
            })?)
        }
        DiagnosticsSource::Stdin => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).map_err(|e| {
                TsDoctorError::DiagnosticsReadError {
                    path: PathBuf::from("-"),
                    source: e,
                }
            })?;
            Ok(text)
        }
        DiagnosticsSource::TypeChecker => run_type_checker(project_dir),
    }
}

/// Group records by file, preserving record order within each file.
pub fn group_by_file(records: Vec<DiagnosticRecord>) -> BTreeMap<PathBuf, Vec<DiagnosticRecord>> {
    let mut groups: BTreeMap<PathBuf, Vec<DiagnosticRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.file.clone()).or_default().push(record);
    }
    groups
}

/// Result of patching one file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub counts: FixCounts,
    /// Whether the file was rewritten on disk
    pub changed: bool,
}

/// Patch one file in place.
///
/// Reads the file once, applies every classified rewrite to the in-memory
/// buffer, and writes back only when at least one rewrite was applied.
pub fn patch_file(
    path: &Path,
    records: &[DiagnosticRecord],
    import_from: &str,
) -> Result<FileOutcome> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|e| TsDoctorError::SourceReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

    // Splitting on '\n' keeps any '\r' inside the line and the final empty
    // segment, so joining restores the original byte stream exactly.
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();

    let counts = patch_lines(&mut lines, records, import_from);

    let changed = counts.rewrites() + counts.imports > 0;
    if changed {
        std::fs::write(path, lines.join("\n")).map_err(|e| TsDoctorError::SourceWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    Ok(FileOutcome { counts, changed })
}
