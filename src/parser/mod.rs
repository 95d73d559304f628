//! Schema-document parsing
//!
//! A migration directory is the unit of input: every `.sql` file in it,
//! sorted lexicographically by file name, is one schema document. Documents
//! are read once and never mutated.

mod table_parser;
mod token_base;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::TsDoctorError;
use crate::util::read_file_with_encoding_fallback;

pub use table_parser::{
    extract_statements, ParsedColumn, ParsedEnum, ParsedTable, SchemaStatement,
};
pub use token_base::TokenParser;

/// One schema document: its path and the statements extracted from it.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    pub path: PathBuf,
    pub statements: Vec<SchemaStatement>,
}

/// Discover migration files under a directory: fixed `.sql` extension filter,
/// sorted lexicographically by path so filename order is document order.
pub fn discover_migrations(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TsDoctorError::MigrationsDirError {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        }
        .into());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| TsDoctorError::MigrationsDirError {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_sql = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if is_sql {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Parse a set of migration files into schema documents, preserving order.
pub fn parse_migration_files(files: &[PathBuf]) -> Result<Vec<SchemaDocument>> {
    let mut documents = Vec::with_capacity(files.len());
    for file in files {
        documents.push(parse_migration_file(file)?);
    }
    Ok(documents)
}

/// Parse a single migration file.
pub fn parse_migration_file(path: &Path) -> Result<SchemaDocument> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|e| TsDoctorError::MigrationReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

    let statements = extract_statements(&content);
    debug!(
        path = %path.display(),
        statements = statements.len(),
        "parsed migration"
    );

    Ok(SchemaDocument {
        path: path.to_path_buf(),
        statements,
    })
}
