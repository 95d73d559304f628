//! Token-based extraction of table and enum declarations from schema documents.
//!
//! Scans a tokenized migration for `CREATE TABLE` and `CREATE TYPE ... AS ENUM`
//! statements. Everything else in the document (functions, policies, indexes,
//! triggers, DML) is passed over without error. A statement body is captured up
//! to its balanced closing parenthesis, so a column's own parenthesized type
//! arguments or a composite default expression never terminate it early.
//!
//! ## Supported syntax
//!
//! ```sql
//! CREATE TABLE [IF NOT EXISTS] [schema.]name (
//!     name TYPE [NOT NULL] [DEFAULT expr] [PRIMARY KEY] [REFERENCES ...],
//!     ...,
//!     [CONSTRAINT ... | PRIMARY KEY ... | FOREIGN KEY ... | UNIQUE ... | CHECK ...]
//! );
//!
//! CREATE TYPE [schema.]name AS ENUM ('label', ...);
//! ```

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, TokenWithSpan};
use tracing::debug;

use super::token_base::{split_top_level, TokenParser};

/// One column declaration carved out of a `CREATE TABLE` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedColumn {
    /// Column name, unquoted
    pub name: String,
    /// Raw declared type token, e.g. "numeric(10, 2)", "text[]", "timestamptz"
    pub type_token: String,
    /// Explicit NOT NULL marker, or an inline PRIMARY KEY
    pub not_null: bool,
    /// DEFAULT marker, a serial pseudo-type, or a GENERATED column
    pub has_default: bool,
}

/// One `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    /// Bare table name (schema qualifier discarded)
    pub name: String,
    pub columns: Vec<ParsedColumn>,
}

/// One `CREATE TYPE ... AS ENUM` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEnum {
    /// Bare enum name (schema qualifier discarded)
    pub name: String,
    /// Labels in declaration order
    pub labels: Vec<String>,
}

/// A schema-definition statement the generator understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatement {
    Table(ParsedTable),
    Enum(ParsedEnum),
}

/// Extract all recognized schema statements from one document, in order.
///
/// Returns an empty vector when the document cannot be tokenized; malformed
/// individual statements are dropped, never fatal.
pub fn extract_statements(sql: &str) -> Vec<SchemaStatement> {
    let Some(mut scanner) = StatementScanner::new(sql) else {
        debug!("document could not be tokenized; skipping");
        return Vec::new();
    };
    scanner.scan()
}

/// Token-stream scanner for schema-definition statements.
struct StatementScanner {
    base: TokenParser,
}

impl StatementScanner {
    fn new(sql: &str) -> Option<Self> {
        Some(Self {
            base: TokenParser::new(sql)?,
        })
    }

    fn scan(&mut self) -> Vec<SchemaStatement> {
        let mut statements = Vec::new();

        while !self.base.is_at_end() {
            if !self.base.check_keyword(Keyword::CREATE) {
                self.base.advance();
                continue;
            }
            self.base.advance();
            self.base.skip_whitespace();

            if self.base.check_keyword(Keyword::TABLE) {
                self.base.advance();
                if let Some(table) = self.parse_create_table() {
                    statements.push(SchemaStatement::Table(table));
                }
            } else if self.base.check_word_ci("TYPE") {
                self.base.advance();
                if let Some(parsed) = self.parse_create_enum() {
                    statements.push(SchemaStatement::Enum(parsed));
                }
            }
            // Any other CREATE (INDEX, FUNCTION, POLICY, ...) is passed over.
        }

        statements
    }

    /// Parse from just after the TABLE keyword. Returns `None` on any shape
    /// mismatch; the scanner then resumes from the current position.
    fn parse_create_table(&mut self) -> Option<ParsedTable> {
        self.base.skip_whitespace();

        // Optional IF NOT EXISTS qualifier
        if self.base.check_keyword(Keyword::IF) {
            self.base.advance();
            self.base.skip_whitespace();
            self.base.expect_keyword(Keyword::NOT)?;
            self.base.skip_whitespace();
            self.base.expect_keyword(Keyword::EXISTS)?;
            self.base.skip_whitespace();
        }

        let name = self.base.parse_object_name()?;
        self.base.skip_whitespace();

        // CREATE TABLE ... AS SELECT and friends have no column list body.
        let body_start = self.base.pos();
        let Some(body) = self.base.consume_balanced_body() else {
            // An unbalanced body must not swallow the rest of the document:
            // resume scanning just past the opening delimiter.
            if body_start < self.base.tokens().len() {
                self.base.set_pos(body_start + 1);
            }
            return None;
        };

        let mut columns = Vec::new();
        for clause in split_top_level(&body) {
            match parse_column_clause(clause) {
                Some(column) => columns.push(column),
                None => debug!(table = %name, "dropping unrecognized or constraint clause"),
            }
        }

        Some(ParsedTable { name, columns })
    }

    /// Parse from just after the TYPE keyword. Only the enum form is
    /// recognized; other CREATE TYPE variants are skipped.
    fn parse_create_enum(&mut self) -> Option<ParsedEnum> {
        self.base.skip_whitespace();
        let name = self.base.parse_object_name()?;
        self.base.skip_whitespace();
        self.base.expect_keyword(Keyword::AS)?;
        self.base.skip_whitespace();
        if !self.base.check_word_ci("ENUM") {
            return None;
        }
        self.base.advance();
        self.base.skip_whitespace();

        let body_start = self.base.pos();
        let Some(body) = self.base.consume_balanced_body() else {
            if body_start < self.base.tokens().len() {
                self.base.set_pos(body_start + 1);
            }
            return None;
        };
        let labels: Vec<String> = body
            .iter()
            .filter_map(|t| match &t.token {
                Token::SingleQuotedString(s) => Some(s.clone()),
                _ => None,
            })
            .collect();

        Some(ParsedEnum { name, labels })
    }
}

/// Keywords that open a table-level constraint clause rather than a column.
const CONSTRAINT_KEYWORDS: &[Keyword] = &[
    Keyword::CONSTRAINT,
    Keyword::PRIMARY,
    Keyword::FOREIGN,
    Keyword::UNIQUE,
    Keyword::CHECK,
    Keyword::EXCLUDE,
    Keyword::LIKE,
    Keyword::REFERENCES,
];

/// Parse one top-level clause of a CREATE TABLE body as a column declaration.
///
/// Returns `None` for table-level constraints and for clauses that do not
/// match `<identifier> <type-token> ...`.
fn parse_column_clause(tokens: Vec<TokenWithSpan>) -> Option<ParsedColumn> {
    let mut parser = TokenParser::from_tokens(tokens);
    parser.skip_whitespace();

    // A clause opening with a constraint keyword is not a column. Quoted
    // identifiers carry no keyword, so a column named "unique" still parses.
    if let Some(token) = parser.current_token() {
        if let Token::Word(w) = &token.token {
            if w.quote_style.is_none() && CONSTRAINT_KEYWORDS.contains(&w.keyword) {
                return None;
            }
        }
    }

    let name = parser.parse_identifier()?;
    parser.skip_whitespace();

    let type_token = parse_type_token(&mut parser)?;

    let mut column = ParsedColumn {
        name,
        type_token,
        not_null: false,
        has_default: false,
    };

    if crate::util::contains_ci(&column.type_token, "serial") {
        column.has_default = true;
    }

    parse_column_modifiers(&mut parser, &mut column);

    Some(column)
}

/// Parse the raw declared type: first word, known multi-word continuations,
/// optional parenthesized arguments, optional array suffixes.
fn parse_type_token(parser: &mut TokenParser) -> Option<String> {
    let mut first = parser.parse_identifier()?;
    let mut type_token = first.clone();

    // Schema-qualified type names (e.g. an enum declared as public.mood)
    while parser.check_token(&Token::Period) {
        parser.advance();
        let segment = parser.parse_identifier()?;
        type_token.push('.');
        type_token.push_str(&segment);
        first = segment;
    }

    // Multi-word type names
    if first.eq_ignore_ascii_case("double") {
        if consume_word_sequence(parser, &["precision"]) {
            type_token.push_str(" precision");
        }
    } else if first.eq_ignore_ascii_case("character") {
        if consume_word_sequence(parser, &["varying"]) {
            type_token.push_str(" varying");
        }
    } else if first.eq_ignore_ascii_case("timestamp") || first.eq_ignore_ascii_case("time") {
        if consume_word_sequence(parser, &["with", "time", "zone"]) {
            type_token.push_str(" with time zone");
        } else if consume_word_sequence(parser, &["without", "time", "zone"]) {
            type_token.push_str(" without time zone");
        }
    }

    // Precision / length arguments
    let save = parser.pos();
    parser.skip_whitespace();
    if parser.check_token(&Token::LParen) {
        type_token.push_str(&parser.consume_parenthesized()?);
    } else {
        parser.set_pos(save);
    }

    // Array suffixes
    loop {
        let save = parser.pos();
        parser.skip_whitespace();
        if parser.check_token(&Token::LBracket) {
            parser.advance();
            parser.skip_whitespace();
            if parser.check_token(&Token::RBracket) {
                parser.advance();
                type_token.push_str("[]");
                continue;
            }
        }
        parser.set_pos(save);
        break;
    }

    Some(type_token)
}

/// Consume a case-insensitive word sequence, restoring position on mismatch.
fn consume_word_sequence(parser: &mut TokenParser, words: &[&str]) -> bool {
    let save = parser.pos();
    for word in words {
        parser.skip_whitespace();
        if !parser.check_word_ci(word) {
            parser.set_pos(save);
            return false;
        }
        parser.advance();
    }
    true
}

/// Scan the remainder of a column clause for nullability and default markers.
fn parse_column_modifiers(parser: &mut TokenParser, column: &mut ParsedColumn) {
    let mut saw_generated = false;

    while !parser.is_at_end() {
        parser.skip_whitespace();
        if parser.is_at_end() {
            break;
        }

        if parser.check_keyword(Keyword::NOT) {
            parser.advance();
            parser.skip_whitespace();
            if parser.check_keyword(Keyword::NULL) {
                parser.advance();
                column.not_null = true;
            }
            continue;
        }

        if parser.check_keyword(Keyword::PRIMARY) {
            parser.advance();
            parser.skip_whitespace();
            if parser.check_keyword(Keyword::KEY) {
                parser.advance();
                // An inline primary key is implicitly NOT NULL.
                column.not_null = true;
            }
            continue;
        }

        if parser.check_keyword(Keyword::DEFAULT) {
            parser.advance();
            column.has_default = true;
            continue;
        }

        if parser.check_keyword(Keyword::GENERATED) {
            parser.advance();
            saw_generated = true;
            continue;
        }

        if saw_generated && parser.check_keyword(Keyword::IDENTITY) {
            parser.advance();
            // GENERATED ... AS IDENTITY: the database supplies the value.
            column.has_default = true;
            continue;
        }

        // Skip parenthesized expressions (CHECK bodies, DEFAULT expressions)
        // so commas and keywords inside them are never misread as markers.
        if parser.check_token(&Token::LParen) {
            parser.skip_parenthesized();
            continue;
        }

        parser.advance();
    }

    // GENERATED ALWAYS AS (expr) STORED: computed, value supplied.
    if saw_generated {
        column.has_default = true;
    }
}
