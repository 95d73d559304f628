//! Typed-interface emission
//!
//! Renders the schema model as a single TypeScript declaration file: a
//! `Database` interface with Row/Insert/Update shapes per table, placeholder
//! sections for views and functions, enum unions, and helper aliases. The
//! artifact is regenerated wholesale on every run and contains nothing
//! environment-dependent, so unchanged input reproduces byte-identical
//! output.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;

use crate::error::TsDoctorError;
use crate::model::{ColumnDecl, SchemaModel, SemanticType, TableDecl};

/// How a shape treats optionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Every column present; nullable columns unioned with null
    Row,
    /// Nullable-or-defaulted columns optional
    Insert,
    /// Every column optional
    Update,
}

/// Render the complete declaration file for a schema model.
pub fn render_types(model: &SchemaModel) -> String {
    let mut out = String::new();

    out.push_str("// Generated by tsdoctor. Do not edit by hand; regenerate from migrations.\n\n");
    out.push_str("export type Json =\n");
    out.push_str("  | string\n");
    out.push_str("  | number\n");
    out.push_str("  | boolean\n");
    out.push_str("  | null\n");
    out.push_str("  | { [key: string]: Json | undefined }\n");
    out.push_str("  | Json[];\n\n");

    out.push_str("export interface Database {\n");
    out.push_str("  public: {\n");

    out.push_str("    Tables: {\n");
    if model.table_count() == 0 {
        out.push_str("      [_ in never]: never;\n");
    } else {
        for table in model.tables() {
            render_table(&mut out, table);
        }
    }
    out.push_str("    };\n");

    out.push_str("    Views: {\n      [_ in never]: never;\n    };\n");
    out.push_str("    Functions: {\n      [_ in never]: never;\n    };\n");

    out.push_str("    Enums: {\n");
    if model.enum_count() == 0 {
        out.push_str("      [_ in never]: never;\n");
    } else {
        for decl in model.enums() {
            let union = if decl.labels.is_empty() {
                "never".to_string()
            } else {
                decl.labels
                    .iter()
                    .map(|label| format!("\"{}\"", escape_string(label)))
                    .collect::<Vec<_>>()
                    .join(" | ")
            };
            let _ = writeln!(out, "      {}: {};", property_name(&decl.name), union);
        }
    }
    out.push_str("    };\n");

    out.push_str("  };\n}\n\n");

    out.push_str(
        "export type Row<T extends keyof Database['public']['Tables']> =\n  \
         Database['public']['Tables'][T]['Row'];\n",
    );
    out.push_str(
        "export type InsertRow<T extends keyof Database['public']['Tables']> =\n  \
         Database['public']['Tables'][T]['Insert'];\n",
    );
    out.push_str(
        "export type UpdateRow<T extends keyof Database['public']['Tables']> =\n  \
         Database['public']['Tables'][T]['Update'];\n",
    );

    out
}

/// Render the types file to disk, replacing any prior content in full.
pub fn write_types(model: &SchemaModel, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| TsDoctorError::TypesWriteError {
                path: output_path.to_path_buf(),
                source: e,
            })?;
        }
    }

    let rendered = render_types(model);
    std::fs::write(output_path, rendered).map_err(|e| TsDoctorError::TypesWriteError {
        path: output_path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

fn render_table(out: &mut String, table: &TableDecl) {
    let _ = writeln!(out, "      {}: {{", property_name(&table.name));
    render_shape(out, "Row", &table.columns, Shape::Row);
    render_shape(out, "Insert", &table.columns, Shape::Insert);
    render_shape(out, "Update", &table.columns, Shape::Update);
    out.push_str("      };\n");
}

fn render_shape(out: &mut String, label: &str, columns: &[ColumnDecl], shape: Shape) {
    let _ = writeln!(out, "        {}: {{", label);
    for column in columns {
        let optional = match shape {
            Shape::Row => false,
            Shape::Insert => column.nullable || column.has_default,
            Shape::Update => true,
        };
        let mut ts = ts_type(&column.semantic);
        if column.nullable {
            ts.push_str(" | null");
        }
        let _ = writeln!(
            out,
            "          {}{}: {};",
            property_name(&column.name),
            if optional { "?" } else { "" },
            ts
        );
    }
    out.push_str("        };\n");
}

/// Map a semantic type to its TypeScript spelling.
fn ts_type(semantic: &SemanticType) -> String {
    match semantic {
        SemanticType::Text => "string".to_string(),
        SemanticType::Number => "number".to_string(),
        SemanticType::Boolean => "boolean".to_string(),
        SemanticType::Json => "Json".to_string(),
        SemanticType::Unknown => "unknown".to_string(),
        SemanticType::Enum(name) => {
            format!("Database['public']['Enums']['{}']", escape_string(name))
        }
        SemanticType::Array(inner) => format!("{}[]", ts_type(inner)),
    }
}

/// Quote a property name unless it is a plain TypeScript identifier.
fn property_name(name: &str) -> String {
    let plain = !name.is_empty()
        && name
            .chars()
            .enumerate()
            .all(|(i, c)| c == '_' || c == '$' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", escape_string(name))
    }
}

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"").replace('\'', "\\'")
}
