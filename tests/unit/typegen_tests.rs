//! Generated-artifact shape tests
//!
//! These exercise the parse -> model -> render pipeline on in-memory
//! documents, asserting the exact Row/Insert/Update shapes the artifact
//! must carry.

use std::path::PathBuf;

use pretty_assertions::assert_eq;

use tsdoctor::model::{build_model, SchemaModel};
use tsdoctor::parser::{extract_statements, SchemaDocument};
use tsdoctor::typegen::render_types;

fn model_from_docs(docs: &[(&str, &str)]) -> SchemaModel {
    let documents: Vec<SchemaDocument> = docs
        .iter()
        .map(|(name, sql)| SchemaDocument {
            path: PathBuf::from(name),
            statements: extract_statements(sql),
        })
        .collect();
    build_model(&documents)
}

/// Slice the rendered artifact down to one shape block of one table.
fn shape_block<'a>(rendered: &'a str, table: &str, shape: &str) -> &'a str {
    let table_start = rendered
        .find(&format!("      {}: {{", table))
        .unwrap_or_else(|| panic!("table {} not rendered", table));
    let scoped = &rendered[table_start..];
    let shape_start = scoped
        .find(&format!("        {}: {{", shape))
        .unwrap_or_else(|| panic!("shape {} not rendered for {}", shape, table));
    let scoped = &scoped[shape_start..];
    let end = scoped.find("        };").expect("shape terminator");
    &scoped[..end]
}

#[test]
fn test_widgets_row_shape() {
    let model = model_from_docs(&[(
        "001_widgets.sql",
        "CREATE TABLE widgets (id UUID PRIMARY KEY, name TEXT NOT NULL, note TEXT, created_at TIMESTAMPTZ DEFAULT now());",
    )]);
    let rendered = render_types(&model);

    let row = shape_block(&rendered, "widgets", "Row");
    assert!(row.contains("id: string;"));
    assert!(row.contains("name: string;"));
    assert!(row.contains("note: string | null;"));
    assert!(row.contains("created_at: string | null;"));
}

#[test]
fn test_widgets_insert_shape() {
    let model = model_from_docs(&[(
        "001_widgets.sql",
        "CREATE TABLE widgets (id UUID PRIMARY KEY, name TEXT NOT NULL, note TEXT, created_at TIMESTAMPTZ DEFAULT now());",
    )]);
    let rendered = render_types(&model);

    let insert = shape_block(&rendered, "widgets", "Insert");
    assert!(insert.contains("id: string;"), "primary key stays required");
    assert!(insert.contains("name: string;"));
    assert!(insert.contains("note?: string | null;"));
    assert!(insert.contains("created_at?: string | null;"));
}

#[test]
fn test_update_shape_is_fully_optional() {
    let model = model_from_docs(&[(
        "001_widgets.sql",
        "CREATE TABLE widgets (id UUID PRIMARY KEY, name TEXT NOT NULL);",
    )]);
    let rendered = render_types(&model);

    let update = shape_block(&rendered, "widgets", "Update");
    assert!(update.contains("id?: string;"));
    assert!(update.contains("name?: string;"));
}

#[test]
fn test_duplicate_table_earliest_document_wins() {
    let model = model_from_docs(&[
        (
            "001_a.sql",
            "CREATE TABLE IF NOT EXISTS accounts (id uuid NOT NULL, email text NOT NULL);",
        ),
        (
            "002_b.sql",
            "CREATE TABLE IF NOT EXISTS accounts (id bigint NOT NULL, phone text);",
        ),
    ]);
    let rendered = render_types(&model);

    assert_eq!(model.table_count(), 1);
    assert!(rendered.contains("email: string;"));
    assert!(!rendered.contains("phone"));
    assert!(!rendered.contains("id: number;"));
}

#[test]
fn test_tables_ordered_by_name_not_discovery() {
    let model = model_from_docs(&[
        ("001.sql", "CREATE TABLE zulu (id uuid);"),
        ("002.sql", "CREATE TABLE alpha (id uuid);"),
        ("003.sql", "CREATE TABLE mike (id uuid);"),
    ]);
    let rendered = render_types(&model);

    let alpha = rendered.find("alpha: {").unwrap();
    let mike = rendered.find("mike: {").unwrap();
    let zulu = rendered.find("zulu: {").unwrap();
    assert!(alpha < mike && mike < zulu);
}

#[test]
fn test_array_and_json_columns() {
    let model = model_from_docs(&[(
        "001.sql",
        "CREATE TABLE t (tags text[] NOT NULL, payload jsonb, flags boolean[]);",
    )]);
    let rendered = render_types(&model);

    let row = shape_block(&rendered, "t", "Row");
    assert!(row.contains("tags: string[];"));
    assert!(row.contains("payload: Json | null;"));
    assert!(row.contains("flags: boolean[] | null;"));
}

#[test]
fn test_unknown_type_maps_to_unknown() {
    let model = model_from_docs(&[("001.sql", "CREATE TABLE t (region tsrange);")]);
    let rendered = render_types(&model);
    assert!(shape_block(&rendered, "t", "Row").contains("region: unknown | null;"));
}

#[test]
fn test_enum_reference_and_union() {
    let model = model_from_docs(&[
        ("001.sql", "CREATE TYPE mood AS ENUM ('sad', 'ok', 'happy');"),
        ("002.sql", "CREATE TABLE posts (state mood NOT NULL);"),
    ]);
    let rendered = render_types(&model);

    assert!(rendered.contains("mood: \"sad\" | \"ok\" | \"happy\";"));
    assert!(shape_block(&rendered, "posts", "Row")
        .contains("state: Database['public']['Enums']['mood'];"));
}

#[test]
fn test_placeholders_always_present() {
    let rendered = render_types(&model_from_docs(&[]));
    assert!(rendered.contains("Views: {\n      [_ in never]: never;\n    };"));
    assert!(rendered.contains("Functions: {\n      [_ in never]: never;\n    };"));
    assert!(rendered.contains("Enums: {\n      [_ in never]: never;\n    };"));
}

#[test]
fn test_helper_aliases_emitted() {
    let rendered = render_types(&model_from_docs(&[]));
    assert!(rendered.contains("export type Row<T extends keyof Database['public']['Tables']>"));
    assert!(rendered.contains("export type InsertRow<T extends keyof Database['public']['Tables']>"));
    assert!(rendered.contains("export type UpdateRow<T extends keyof Database['public']['Tables']>"));
}

#[test]
fn test_render_is_pure() {
    let docs = [
        ("001.sql", "CREATE TYPE mood AS ENUM ('a', 'b');"),
        ("002.sql", "CREATE TABLE t (m mood, n numeric(10, 2) NOT NULL);"),
    ];
    assert_eq!(
        render_types(&model_from_docs(&docs)),
        render_types(&model_from_docs(&docs))
    );
}
