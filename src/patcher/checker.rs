//! Type-checker invocation
//!
//! The patcher either consumes a saved diagnostic stream or produces one by
//! running the project's type checker as a subprocess. The checker exiting
//! nonzero is the normal case (that is what having diagnostics means); only
//! failure to spawn it is an error.

use std::path::Path;
use std::process::Command;

use anyhow::Result;

use crate::error::TsDoctorError;

const CHECKER_ARGS: &[&str] = &["tsc", "--noEmit", "--pretty", "false"];

/// Run the type checker in `project_dir` and return its combined output.
pub fn run_type_checker(project_dir: &Path) -> Result<String> {
    let output = Command::new("npx")
        .args(CHECKER_ARGS)
        .current_dir(project_dir)
        .output()
        .map_err(|e| TsDoctorError::TypeCheckerSpawnError {
            command: format!("npx {}", CHECKER_ARGS.join(" ")),
            source: e,
        })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(text)
}
