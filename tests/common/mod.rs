//! Shared test helpers: temporary project scaffolding.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway project directory with a migrations folder and source files.
pub struct TestContext {
    root: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("create temp project"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn migrations_dir(&self) -> PathBuf {
        let dir = self.path().join("migrations");
        fs::create_dir_all(&dir).expect("create migrations dir");
        dir
    }

    /// Write one migration file under `migrations/`.
    pub fn write_migration(&self, name: &str, sql: &str) -> PathBuf {
        let path = self.migrations_dir().join(name);
        fs::write(&path, sql).expect("write migration");
        path
    }

    /// Write an arbitrary file relative to the project root.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, content).expect("write file");
        path
    }

    pub fn read_file(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).expect("read file")
    }
}
