//! Base token parser providing common helper methods for schema parsing.
//!
//! Each specialized parser composes a `TokenParser` and delegates token
//! navigation to it:
//!
//! ```ignore
//! pub struct StatementScanner {
//!     base: TokenParser,
//! }
//!
//! impl StatementScanner {
//!     pub fn new(sql: &str) -> Option<Self> {
//!         Some(Self { base: TokenParser::new(sql)? })
//!     }
//! }
//! ```

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer};

/// Base token parser with common helper methods for schema-definition parsing.
///
/// Encapsulates the token stream and position, providing the standard
/// navigation and checking methods needed by specialized parsers.
pub struct TokenParser {
    tokens: Vec<TokenWithSpan>,
    pos: usize,
}

impl TokenParser {
    /// Create a new TokenParser from a SQL string.
    ///
    /// Uses the Postgres dialect for tokenization (dollar-quoted bodies,
    /// double-quoted identifiers). Returns `None` if tokenization fails.
    pub fn new(sql: &str) -> Option<Self> {
        let dialect = PostgreSqlDialect {};
        let tokens = Tokenizer::new(&dialect, sql)
            .tokenize_with_location()
            .ok()?;

        Some(Self { tokens, pos: 0 })
    }

    /// Create a new TokenParser over pre-tokenized tokens.
    ///
    /// Used for parsing a clause carved out of a larger statement body.
    pub fn from_tokens(tokens: Vec<TokenWithSpan>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Check if at end of tokens.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Get current position in the token stream.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Set current position in the token stream.
    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Get the underlying tokens slice.
    #[inline]
    pub fn tokens(&self) -> &[TokenWithSpan] {
        &self.tokens
    }

    /// Get current token without consuming.
    #[inline]
    pub fn current_token(&self) -> Option<&TokenWithSpan> {
        self.tokens.get(self.pos)
    }

    /// Advance to next token.
    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Skip whitespace tokens.
    pub fn skip_whitespace(&mut self) {
        while let Some(token) = self.current_token() {
            match &token.token {
                Token::Whitespace(_) => self.advance(),
                _ => break,
            }
        }
    }

    /// Check if current token is a specific keyword.
    #[inline]
    pub fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(
            self.current_token().map(|t| &t.token),
            Some(Token::Word(w)) if w.keyword == keyword
        )
    }

    /// Check if current token is a word matching (case-insensitive).
    ///
    /// Useful for words sqlparser does not classify as keywords.
    #[inline]
    pub fn check_word_ci(&self, word: &str) -> bool {
        matches!(
            self.current_token().map(|t| &t.token),
            Some(Token::Word(w)) if w.value.eq_ignore_ascii_case(word)
        )
    }

    /// Check if current token matches a specific token type (by discriminant).
    #[inline]
    pub fn check_token(&self, expected: &Token) -> bool {
        if let Some(token) = self.current_token() {
            std::mem::discriminant(&token.token) == std::mem::discriminant(expected)
        } else {
            false
        }
    }

    /// Expect a specific keyword, advancing if found.
    ///
    /// Returns `Some(())` if the keyword was found and position advanced,
    /// `None` otherwise (position unchanged).
    pub fn expect_keyword(&mut self, keyword: Keyword) -> Option<()> {
        if self.check_keyword(keyword) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    /// Parse an identifier (plain or double-quoted).
    ///
    /// Returns the identifier value without quotes. Advances if successful.
    pub fn parse_identifier(&mut self) -> Option<String> {
        let token = self.current_token()?;
        match &token.token {
            Token::Word(w) => {
                let name = w.value.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        }
    }

    /// Parse a possibly schema-qualified name (`schema.name` or `name`).
    ///
    /// Returns the bare object name; the schema qualifier is discarded
    /// because the generated artifact is keyed by table name alone.
    pub fn parse_object_name(&mut self) -> Option<String> {
        let mut name = self.parse_identifier()?;
        loop {
            self.skip_whitespace();
            if self.check_token(&Token::Period) {
                self.advance();
                self.skip_whitespace();
                name = self.parse_identifier()?;
            } else {
                return Some(name);
            }
        }
    }

    /// Skip a parenthesized expression, handling nested parentheses.
    ///
    /// Position should be at the opening parenthesis. After this call,
    /// position will be after the closing parenthesis.
    pub fn skip_parenthesized(&mut self) {
        if !self.check_token(&Token::LParen) {
            return;
        }

        let mut depth = 0;
        while !self.is_at_end() {
            if self.check_token(&Token::LParen) {
                depth += 1;
            } else if self.check_token(&Token::RParen) {
                depth -= 1;
                if depth == 0 {
                    self.advance();
                    return;
                }
            }
            self.advance();
        }
    }

    /// Consume a balanced parenthesized body and return the inner tokens.
    ///
    /// Position should be at the opening parenthesis. The outer parentheses
    /// are not included in the returned tokens. Returns `None` when not at a
    /// left parenthesis or when the stream ends before the body is balanced.
    pub fn consume_balanced_body(&mut self) -> Option<Vec<TokenWithSpan>> {
        if !self.check_token(&Token::LParen) {
            return None;
        }
        self.advance();

        let mut body = Vec::new();
        let mut depth = 1;
        while !self.is_at_end() {
            if self.check_token(&Token::LParen) {
                depth += 1;
            } else if self.check_token(&Token::RParen) {
                depth -= 1;
                if depth == 0 {
                    self.advance();
                    return Some(body);
                }
            }
            if let Some(token) = self.current_token() {
                body.push(token.clone());
            }
            self.advance();
        }

        None
    }

    /// Consume a parenthesized expression and return its contents as a string,
    /// including the outer parentheses.
    pub fn consume_parenthesized(&mut self) -> Option<String> {
        let body = self.consume_balanced_body()?;
        Some(format!("({})", tokens_to_string(&body)))
    }
}

/// Split a token slice into top-level clauses on commas at nesting depth zero.
///
/// A comma inside a nested parenthesis (a precision specifier, a composite
/// default expression) never splits.
pub fn split_top_level(tokens: &[TokenWithSpan]) -> Vec<Vec<TokenWithSpan>> {
    let mut clauses = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;

    for token in tokens {
        match &token.token {
            Token::LParen => {
                depth += 1;
                current.push(token.clone());
            }
            Token::RParen => {
                depth = depth.saturating_sub(1);
                current.push(token.clone());
            }
            Token::Comma if depth == 0 => {
                clauses.push(std::mem::take(&mut current));
            }
            _ => current.push(token.clone()),
        }
    }
    if !current.is_empty() {
        clauses.push(current);
    }

    clauses
}

/// Convert a token to its string representation, preserving quote style.
pub fn format_token(token: &Token) -> String {
    match token {
        Token::Word(w) => match w.quote_style {
            Some('"') => format!("\"{}\"", w.value),
            _ => w.value.clone(),
        },
        Token::Number(n, _) => n.clone(),
        Token::SingleQuotedString(s) => format!("'{}'", s),
        Token::LParen => "(".to_string(),
        Token::RParen => ")".to_string(),
        Token::LBracket => "[".to_string(),
        Token::RBracket => "]".to_string(),
        Token::Comma => ",".to_string(),
        Token::Period => ".".to_string(),
        Token::SemiColon => ";".to_string(),
        Token::DoubleColon => "::".to_string(),
        Token::Colon => ":".to_string(),
        Token::Eq => "=".to_string(),
        Token::Plus => "+".to_string(),
        Token::Minus => "-".to_string(),
        Token::Mul => "*".to_string(),
        Token::Div => "/".to_string(),
        Token::Whitespace(ws) => ws.to_string(),
        other => format!("{}", other),
    }
}

/// Convert a range of tokens to a string.
pub fn tokens_to_string(tokens: &[TokenWithSpan]) -> String {
    tokens.iter().map(|t| format_token(&t.token)).collect()
}
