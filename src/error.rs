//! Error types for tsdoctor

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generating types or applying fixes
#[derive(Error, Debug)]
pub enum TsDoctorError {
    #[error("Failed to read migrations directory: {path}")]
    MigrationsDirError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read migration file: {path}")]
    MigrationReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write generated types to {path}")]
    TypesWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read diagnostics from {path}")]
    DiagnosticsReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run type checker `{command}`")]
    TypeCheckerSpawnError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read source file: {path}")]
    SourceReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write source file: {path}")]
    SourceWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
