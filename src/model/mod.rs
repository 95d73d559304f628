//! Schema model: the run-scoped registry of table and enum declarations.

mod infer;

use std::collections::BTreeMap;

use tracing::debug;

use crate::parser::{SchemaDocument, SchemaStatement};

pub use infer::infer_semantic_type;

/// The abstract value-category a column maps to, independent of the source
/// schema dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticType {
    Text,
    Number,
    Boolean,
    Json,
    Unknown,
    /// A registered enum, by canonical name
    Enum(String),
    Array(Box<SemanticType>),
}

/// One column with nullability and default metadata resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDecl {
    pub name: String,
    pub semantic: SemanticType,
    /// Absence of a NOT NULL marker (and of an inline primary key)
    pub nullable: bool,
    pub has_default: bool,
}

/// One table with its ordered columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDecl {
    pub name: String,
    pub columns: Vec<ColumnDecl>,
}

/// One enum with its labels in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: String,
    pub labels: Vec<String>,
}

/// The complete schema model for one generator run.
///
/// Registration is first-write-wins by name across the whole run, respecting
/// document order; iteration is lexicographic by name. The registry is owned
/// by the run, so repeated or concurrent invocations never share state.
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    tables: BTreeMap<String, TableDecl>,
    enums: BTreeMap<String, EnumDecl>,
}

impl SchemaModel {
    /// Tables in lexicographic name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDecl> {
        self.tables.values()
    }

    /// Enums in lexicographic name order.
    pub fn enums(&self) -> impl Iterator<Item = &EnumDecl> {
        self.enums.values()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }
}

/// Build the schema model from parsed documents.
///
/// Two passes over the statements: the first registers every declaration
/// first-wins, the second resolves column types, so an enum referenced by an
/// earlier-sorted document still resolves.
pub fn build_model(documents: &[SchemaDocument]) -> SchemaModel {
    let mut raw_tables: BTreeMap<String, &crate::parser::ParsedTable> = BTreeMap::new();
    let mut enums: BTreeMap<String, EnumDecl> = BTreeMap::new();

    for document in documents {
        for statement in &document.statements {
            match statement {
                SchemaStatement::Table(table) => {
                    if raw_tables.contains_key(&table.name) {
                        debug!(
                            table = %table.name,
                            path = %document.path.display(),
                            "duplicate table declaration ignored (first wins)"
                        );
                    } else {
                        raw_tables.insert(table.name.clone(), table);
                    }
                }
                SchemaStatement::Enum(parsed) => {
                    if enums.contains_key(&parsed.name) {
                        debug!(
                            enum_name = %parsed.name,
                            path = %document.path.display(),
                            "duplicate enum declaration ignored (first wins)"
                        );
                    } else {
                        enums.insert(
                            parsed.name.clone(),
                            EnumDecl {
                                name: parsed.name.clone(),
                                labels: parsed.labels.clone(),
                            },
                        );
                    }
                }
            }
        }
    }

    let enum_lookup = |base: &str| -> Option<String> {
        enums
            .keys()
            .find(|name| name.eq_ignore_ascii_case(base))
            .cloned()
    };

    let mut tables = BTreeMap::new();
    for (name, raw) in &raw_tables {
        let columns = raw
            .columns
            .iter()
            .map(|column| ColumnDecl {
                name: column.name.clone(),
                semantic: infer_semantic_type(&column.type_token, &enum_lookup),
                nullable: !column.not_null,
                has_default: column.has_default,
            })
            .collect();
        tables.insert(
            name.clone(),
            TableDecl {
                name: name.clone(),
                columns,
            },
        );
    }

    SchemaModel { tables, enums }
}
