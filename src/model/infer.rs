//! Semantic type inference for raw declared type tokens.
//!
//! Inference is a pure function of the raw token (plus the run's enum
//! registry): case-insensitive substring matching against a fixed ordered
//! rule table, first matching rule wins. Array suffixes wrap the base
//! inference. Unrecognized tokens map to `Unknown`, never an error.

use super::SemanticType;

/// Ordered rule table. Order matters: `interval` must precede `int`,
/// otherwise it would classify as a number.
const TYPE_RULES: &[(&str, BaseKind)] = &[
    ("bool", BaseKind::Boolean),
    ("json", BaseKind::Json),
    ("interval", BaseKind::Text),
    ("smallint", BaseKind::Number),
    ("bigint", BaseKind::Number),
    ("integer", BaseKind::Number),
    ("int", BaseKind::Number),
    ("serial", BaseKind::Number),
    ("decimal", BaseKind::Number),
    ("numeric", BaseKind::Number),
    ("real", BaseKind::Number),
    ("double", BaseKind::Number),
    ("float", BaseKind::Number),
    ("money", BaseKind::Number),
    ("text", BaseKind::Text),
    ("char", BaseKind::Text),
    ("uuid", BaseKind::Text),
    ("timestamp", BaseKind::Text),
    ("date", BaseKind::Text),
    ("time", BaseKind::Text),
    ("inet", BaseKind::Text),
    ("cidr", BaseKind::Text),
    ("macaddr", BaseKind::Text),
    ("bytea", BaseKind::Text),
    ("tsvector", BaseKind::Text),
    ("xml", BaseKind::Text),
];

#[derive(Debug, Clone, Copy)]
enum BaseKind {
    Text,
    Number,
    Boolean,
    Json,
}

impl From<BaseKind> for SemanticType {
    fn from(kind: BaseKind) -> Self {
        match kind {
            BaseKind::Text => SemanticType::Text,
            BaseKind::Number => SemanticType::Number,
            BaseKind::Boolean => SemanticType::Boolean,
            BaseKind::Json => SemanticType::Json,
        }
    }
}

/// Infer the semantic type of a raw declared type token.
///
/// `enum_lookup` resolves a normalized base name to the canonical name of a
/// registered enum, consulted before the substring rules.
pub fn infer_semantic_type(
    raw: &str,
    enum_lookup: &dyn Fn(&str) -> Option<String>,
) -> SemanticType {
    let trimmed = raw.trim();

    if let Some(element) = trimmed.strip_suffix("[]") {
        return SemanticType::Array(Box::new(infer_semantic_type(element, enum_lookup)));
    }

    let base = normalize_base_name(trimmed);
    if let Some(enum_name) = enum_lookup(&base) {
        return SemanticType::Enum(enum_name);
    }

    for (needle, kind) in TYPE_RULES {
        if crate::util::contains_ci(trimmed, needle) {
            return SemanticType::from(*kind);
        }
    }

    SemanticType::Unknown
}

/// Reduce a type token to its bare name: drop parenthesized arguments and a
/// schema qualifier, lowercase the rest.
fn normalize_base_name(raw: &str) -> String {
    let no_args = raw.split('(').next().unwrap_or(raw).trim();
    let bare = no_args.rsplit('.').next().unwrap_or(no_args);
    bare.trim_matches('"').to_ascii_lowercase()
}
