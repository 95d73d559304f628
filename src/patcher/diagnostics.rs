//! Type-checker diagnostic parsing
//!
//! The type checker reports one diagnostic per line in the form
//! `path(line,col): error TSnnnn: message` (1-based line and column). Lines
//! in any other shape are ignored; diagnostics whose code is outside the
//! supported set are counted and dropped, never an error.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

static DIAGNOSTIC_LINE: Lazy<Regex> = Lazy::new(|| {
    // The file segment is matched lazily so paths containing parentheses
    // (route groups like app/(dashboard)/page.tsx) still parse.
    Regex::new(r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\):\s+error\s+(?P<code>TS\d+):\s+(?P<msg>.+?)\r?$")
        .expect("diagnostic line pattern")
});

static UNKNOWN_IDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'(?P<ident>[^']+)' is of type 'unknown'").expect("unknown ident pattern")
});

/// One (file, line, column, code, message) tuple from a type-checker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
    /// Category tag, e.g. "TS2339"
    pub code: String,
    pub message: String,
}

/// Diagnostic codes the patcher knows how to act on. Everything else is
/// skipped up front.
pub fn is_supported_code(code: &str) -> bool {
    matches!(code, "TS2339" | "TS2571" | "TS18046" | "TS2345" | "TS2769")
}

/// Parse a raw diagnostic stream into records, ignoring non-diagnostic lines.
pub fn parse_diagnostics(text: &str) -> Vec<DiagnosticRecord> {
    text.lines()
        .filter_map(|line| {
            let caps = DIAGNOSTIC_LINE.captures(line)?;
            Some(DiagnosticRecord {
                file: PathBuf::from(caps.name("file")?.as_str().trim()),
                line: caps.name("line")?.as_str().parse().ok()?,
                column: caps.name("col")?.as_str().parse().ok()?,
                code: caps.name("code")?.as_str().to_string(),
                message: caps.name("msg")?.as_str().to_string(),
            })
        })
        .collect()
}

/// Extract the identifier an "is of type 'unknown'" message names.
pub fn unknown_identifier(message: &str) -> Option<&str> {
    UNKNOWN_IDENT
        .captures(message)
        .and_then(|caps| caps.name("ident"))
        .map(|m| m.as_str())
}
