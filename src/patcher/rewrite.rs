//! Line-level rewrite planning and application
//!
//! Each supported diagnostic category maps to one textual action on the
//! implicated line (or the line above it). Planning and application are kept
//! separate: records are classified against the current buffer first, then
//! applied in descending line order so inserted lines never shift a pending
//! target. Every action's trigger excludes its own output, so re-running the
//! patcher over already-patched lines is a no-op.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::diagnostics::{unknown_identifier, DiagnosticRecord};

/// How many lines above a diagnostic the chain / catch-binding scans look.
const SCAN_LIMIT: usize = 40;

static FROM_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\.from\(\s*['"](?P<table>[A-Za-z0-9_.]+)['"]\s*\)"#).expect("from pattern")
});

static IMPORT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*import\b").expect("import pattern"));

static HELPER_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*import\s+(type\s+)?\{[^}]*\bRow\b").expect("helper import pattern")
});

/// Methods whose inline callback parameters the patcher will annotate.
const CALLBACK_METHODS: &[&str] = &[".map(", ".filter(", ".forEach(", ".find(", ".some("];

/// Methods that mark a mutating-query call site.
const MUTATION_METHODS: &[&str] = &[".insert(", ".update(", ".upsert("];

/// The rewrite a classified diagnostic maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixAction {
    /// Append a result-shape assertion to a terminal query-chain line
    QueryAssertion { table: String, single: bool },
    /// Narrow a catch-bound identifier's member accesses to `Error`
    CatchCast { ident: String },
    /// Annotate an inline callback parameter with a catch-all type
    CallbackParam { ident: String },
    /// Insert a suppression comment above a mutating-query call
    MutationSuppress,
}

/// Rewrite counts for one file (or one whole run, summed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixCounts {
    pub assertions: usize,
    pub error_casts: usize,
    pub param_annotations: usize,
    pub suppressions: usize,
    pub imports: usize,
    /// Diagnostics whose trigger did not hold against the current buffer
    /// (already patched, out of range, or shape mismatch)
    pub skipped: usize,
}

impl FixCounts {
    /// Line rewrites applied (imports are tracked separately).
    pub fn rewrites(&self) -> usize {
        self.assertions + self.error_casts + self.param_annotations + self.suppressions
    }

    pub fn absorb(&mut self, other: FixCounts) {
        self.assertions += other.assertions;
        self.error_casts += other.error_casts;
        self.param_annotations += other.param_annotations;
        self.suppressions += other.suppressions;
        self.imports += other.imports;
        self.skipped += other.skipped;
    }
}

/// Apply a batch of diagnostics for one file to its line buffer.
///
/// Keeps the first classified record per line (a line matches at most one
/// category per pass), applies rewrites bottom-up, and inserts the helper
/// import once if any assertion was added.
pub fn patch_lines(
    lines: &mut Vec<String>,
    records: &[DiagnosticRecord],
    import_from: &str,
) -> FixCounts {
    let mut counts = FixCounts::default();
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut planned: Vec<(usize, FixAction)> = Vec::new();

    for record in records {
        let line_idx = match record.line.checked_sub(1) {
            Some(idx) if idx < lines.len() => idx,
            _ => {
                counts.skipped += 1;
                continue;
            }
        };
        if claimed.contains(&line_idx) {
            continue;
        }
        match classify(record, line_idx, lines) {
            Some(action) => {
                claimed.insert(line_idx);
                planned.push((line_idx, action));
            }
            None => counts.skipped += 1,
        }
    }

    // Bottom-up so the suppression-comment insertions never shift targets.
    planned.sort_by(|a, b| b.0.cmp(&a.0));

    let mut need_import = false;
    for (line_idx, action) in planned {
        match action {
            FixAction::QueryAssertion { table, single } => {
                apply_query_assertion(&mut lines[line_idx], &table, single);
                counts.assertions += 1;
                need_import = true;
            }
            FixAction::CatchCast { ident } => {
                apply_catch_cast(&mut lines[line_idx], &ident);
                counts.error_casts += 1;
            }
            FixAction::CallbackParam { ident } => {
                apply_callback_param(&mut lines[line_idx], &ident);
                counts.param_annotations += 1;
            }
            FixAction::MutationSuppress => {
                let indent: String = lines[line_idx]
                    .chars()
                    .take_while(|c| c.is_whitespace() && *c != '\n')
                    .collect();
                lines.insert(
                    line_idx,
                    format!(
                        "{}// @ts-expect-error TODO: align payload with generated Insert type",
                        indent.trim_end_matches('\r')
                    ),
                );
                counts.suppressions += 1;
            }
        }
    }

    if need_import && !has_helper_import(lines) {
        insert_helper_import(lines, import_from);
        counts.imports += 1;
    }

    counts
}

/// Map one diagnostic to an action, or `None` when its trigger does not hold.
pub fn classify(
    record: &DiagnosticRecord,
    line_idx: usize,
    lines: &[String],
) -> Option<FixAction> {
    let line = lines[line_idx].as_str();

    match record.code.as_str() {
        "TS2339" | "TS2571" => {
            if record.code == "TS2339" && !record.message.contains("on type 'never'") {
                return None;
            }
            if line.contains(" as { data:") {
                return None;
            }
            let trimmed = line.trim_end().trim_end_matches(';');
            if !trimmed.ends_with(')') {
                return None;
            }
            let table = find_chain_table(lines, line_idx)?;
            let single = line.contains(".single()") || line.contains(".maybeSingle()");
            Some(FixAction::QueryAssertion { table, single })
        }
        "TS18046" => {
            let ident = unknown_identifier(&record.message)?;
            if find_catch_binding(lines, line_idx, ident) {
                let access = Regex::new(&format!(r"\b{}\.", regex::escape(ident))).ok()?;
                if line.contains(&format!("({} as ", ident)) || !access.is_match(line) {
                    return None;
                }
                return Some(FixAction::CatchCast {
                    ident: ident.to_string(),
                });
            }
            if CALLBACK_METHODS.iter().any(|m| line.contains(m))
                && !line.contains(&format!("{}: any", ident))
                && binds_callback_param(line, ident)
            {
                return Some(FixAction::CallbackParam {
                    ident: ident.to_string(),
                });
            }
            None
        }
        "TS2345" | "TS2769" => {
            if !MUTATION_METHODS.iter().any(|m| line.contains(m)) {
                return None;
            }
            if line_idx > 0 {
                let above = &lines[line_idx - 1];
                if above.contains("@ts-expect-error") || above.contains("@ts-ignore") {
                    return None;
                }
            }
            Some(FixAction::MutationSuppress)
        }
        _ => None,
    }
}

/// Walk the query chain upward from the diagnostic line and return the table
/// named by the nearest `.from('...')` selector, stopping at a statement
/// boundary.
fn find_chain_table(lines: &[String], start_idx: usize) -> Option<String> {
    let lowest = start_idx.saturating_sub(SCAN_LIMIT);
    for idx in (lowest..=start_idx).rev() {
        let line = lines[idx].as_str();
        if idx < start_idx {
            // A line that closes a statement or block belongs to something
            // else; the chain cannot extend above it.
            let trimmed = line.trim_end();
            if trimmed.ends_with(';') || trimmed.ends_with('{') || trimmed.ends_with('}') {
                return None;
            }
        }
        if let Some(caps) = FROM_CALL.captures(line) {
            let table = caps.name("table")?.as_str();
            // A schema-qualified selector keys the row shape by bare name.
            return Some(table.rsplit('.').next().unwrap_or(table).to_string());
        }
    }
    None
}

/// Check whether `ident` is bound by an enclosing catch clause above the line.
fn find_catch_binding(lines: &[String], start_idx: usize, ident: &str) -> bool {
    let Ok(pattern) = Regex::new(&format!(r"catch\s*\(\s*{}\b", regex::escape(ident))) else {
        return false;
    };
    let lowest = start_idx.saturating_sub(SCAN_LIMIT);
    lines[lowest..=start_idx]
        .iter()
        .any(|line| pattern.is_match(line))
}

/// Check whether the line binds `ident` as an inline arrow-callback parameter.
fn binds_callback_param(line: &str, ident: &str) -> bool {
    let escaped = regex::escape(ident);
    let Ok(pattern) = Regex::new(&format!(r"\(\s*{}\s*\)\s*=>|\b{}\s*=>", escaped, escaped)) else {
        return false;
    };
    pattern.is_match(line)
}

fn apply_query_assertion(line: &mut String, table: &str, single: bool) {
    let (body, cr) = split_carriage_return(line);
    let trimmed = body.trim_end();
    let (stmt, semi) = match trimmed.strip_suffix(';') {
        Some(stmt) => (stmt, ";"),
        None => (trimmed, ""),
    };
    let row_ref = if single {
        format!("Row<'{}'>", table)
    } else {
        format!("Row<'{}'>[]", table)
    };
    *line = format!(
        "{} as {{ data: {} | null; error: any }}{}{}",
        stmt, row_ref, semi, cr
    );
}

fn apply_catch_cast(line: &mut String, ident: &str) {
    let Ok(access) = Regex::new(&format!(r"\b{}\.", regex::escape(ident))) else {
        return;
    };
    let replaced = access
        .replace_all(line.as_str(), format!("({} as Error).", ident))
        .into_owned();
    *line = replaced;
}

fn apply_callback_param(line: &mut String, ident: &str) {
    let escaped = regex::escape(ident);
    let annotated = format!("({}: any) =>", ident);

    if let Ok(parenthesized) = Regex::new(&format!(r"\(\s*{}\s*\)\s*=>", escaped)) {
        if parenthesized.is_match(line) {
            *line = parenthesized
                .replace(line.as_str(), annotated.as_str())
                .into_owned();
            return;
        }
    }
    if let Ok(bare) = Regex::new(&format!(r"\b{}\s*=>", escaped)) {
        *line = bare.replace(line.as_str(), annotated.as_str()).into_owned();
    }
}

/// Check for an existing import of the `Row` helper, from any module.
fn has_helper_import(lines: &[String]) -> bool {
    lines.iter().any(|line| HELPER_IMPORT.is_match(line))
}

/// Insert the helper-type import after the last top-level import line, or at
/// the top of the file when there are none.
fn insert_helper_import(lines: &mut Vec<String>, import_from: &str) {
    let import_text = format!("import type {{ Row }} from '{}';", import_from);
    let insert_at = lines
        .iter()
        .rposition(|line| IMPORT_LINE.is_match(line))
        .map(|idx| idx + 1)
        .unwrap_or(0);
    lines.insert(insert_at, import_text);
}

fn split_carriage_return(line: &str) -> (&str, &str) {
    match line.strip_suffix('\r') {
        Some(body) => (body, "\r"),
        None => (line, ""),
    }
}
