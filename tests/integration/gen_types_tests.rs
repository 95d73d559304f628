//! End-to-end generator tests over real directories

use std::fs;

use pretty_assertions::assert_eq;

use tsdoctor::{generate_types, GenTypesOptions};

use crate::common::TestContext;

fn options(ctx: &TestContext) -> GenTypesOptions {
    GenTypesOptions {
        migrations_dir: ctx.path().join("migrations"),
        output_path: ctx.path().join("lib/database.types.ts"),
        verbose: false,
    }
}

#[test]
fn test_generate_from_single_migration() {
    let ctx = TestContext::new();
    ctx.write_migration(
        "20240101000000_init.sql",
        "CREATE TABLE widgets (id UUID PRIMARY KEY, name TEXT NOT NULL, note TEXT, created_at TIMESTAMPTZ DEFAULT now());",
    );

    let summary = generate_types(&options(&ctx)).expect("generate");
    assert_eq!(summary.documents, 1);
    assert_eq!(summary.tables, 1);

    let rendered = ctx.read_file("lib/database.types.ts");
    assert!(rendered.contains("widgets: {"));
    assert!(rendered.contains("note: string | null;"));
    assert!(rendered.contains("note?: string | null;"));
}

#[test]
fn test_regeneration_is_byte_identical() {
    let ctx = TestContext::new();
    ctx.write_migration(
        "001_types.sql",
        "CREATE TYPE mood AS ENUM ('sad', 'ok');",
    );
    ctx.write_migration(
        "002_tables.sql",
        "CREATE TABLE posts (id uuid PRIMARY KEY, state mood NOT NULL, tags text[]);",
    );

    generate_types(&options(&ctx)).expect("first run");
    let first = ctx.read_file("lib/database.types.ts");

    generate_types(&options(&ctx)).expect("second run");
    let second = ctx.read_file("lib/database.types.ts");

    assert_eq!(first, second);
}

#[test]
fn test_output_replaced_wholesale() {
    let ctx = TestContext::new();
    ctx.write_file("lib/database.types.ts", "// stale hand-edited content\n");
    ctx.write_migration("001.sql", "CREATE TABLE t (id uuid);");

    generate_types(&options(&ctx)).expect("generate");
    let rendered = ctx.read_file("lib/database.types.ts");
    assert!(!rendered.contains("stale hand-edited content"));
    assert!(rendered.contains("t: {"));
}

#[test]
fn test_first_sorted_document_wins_across_files() {
    let ctx = TestContext::new();
    // Written out of order; discovery sorts by filename.
    ctx.write_migration(
        "002_later.sql",
        "CREATE TABLE IF NOT EXISTS accounts (id bigint NOT NULL, phone text);",
    );
    ctx.write_migration(
        "001_earlier.sql",
        "CREATE TABLE IF NOT EXISTS accounts (id uuid NOT NULL, email text NOT NULL);",
    );

    generate_types(&options(&ctx)).expect("generate");
    let rendered = ctx.read_file("lib/database.types.ts");
    assert!(rendered.contains("email: string;"));
    assert!(!rendered.contains("phone"));
}

#[test]
fn test_empty_migration_dir_yields_valid_artifact() {
    let ctx = TestContext::new();
    ctx.migrations_dir();

    let summary = generate_types(&options(&ctx)).expect("generate");
    assert_eq!(summary.tables, 0);

    let rendered = ctx.read_file("lib/database.types.ts");
    assert!(rendered.contains("export interface Database"));
    assert!(rendered.contains("[_ in never]: never;"));
}

#[test]
fn test_non_sql_files_are_ignored() {
    let ctx = TestContext::new();
    ctx.write_migration("001.sql", "CREATE TABLE t (id uuid);");
    ctx.write_file("migrations/README.md", "# notes\nCREATE TABLE fake (id int);");

    let summary = generate_types(&options(&ctx)).expect("generate");
    assert_eq!(summary.documents, 1);
    assert_eq!(summary.tables, 1);
}

#[test]
fn test_missing_migrations_dir_is_fatal() {
    let ctx = TestContext::new();
    let result = generate_types(&options(&ctx));
    assert!(result.is_err());
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("migrations"), "error names the path: {message}");
}

#[test]
fn test_malformed_statements_do_not_abort_the_run() {
    let ctx = TestContext::new();
    ctx.write_migration(
        "001.sql",
        "CREATE TABLE good (id uuid);\nCREATE TABLE broken (id uuid,; garbage;\nCREATE TABLE also_good (id uuid);",
    );

    let summary = generate_types(&options(&ctx)).expect("generate");
    assert_eq!(summary.tables, 2, "good tables survive a broken neighbor");
    let rendered = ctx.read_file("lib/database.types.ts");
    assert!(rendered.contains("good: {"));
    assert!(rendered.contains("also_good: {"));
}

#[test]
fn test_utf8_bom_is_tolerated() {
    let ctx = TestContext::new();
    let path = ctx.migrations_dir().join("001.sql");
    fs::write(&path, "\u{FEFF}CREATE TABLE t (id uuid);").unwrap();

    let summary = generate_types(&options(&ctx)).expect("generate");
    assert_eq!(summary.tables, 1);
}
