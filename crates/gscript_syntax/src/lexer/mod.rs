//! Lexer for gscript source text.
//!
//! Handles tokenization including:
//! - Identifiers (keywords included; see [`tokens`]) and numbers (decimal, `.5`, optional `0x` hex)
//! - Strings (`"..."`, optional `'...'`), localized strings (`&"..."`) and resource variables (`%name`)
//! - Line and block comments, whitespace runs
//! - Single-character symbols
//!
//! The lexer can be stepped one token at a time ([`Lexer::next_token`]) or run to completion ([`lex`]). Its only
//! failure mode is a [`LexError`], which is always fatal: no token sequence is produced for that input.

pub mod tokens;

pub use tokens::{Token, TokenKind};

use gscript_core::lang::keywords::KeywordSet;
use miette::Diagnostic;
use thiserror::Error;

use crate::ast::Location;

/// Characters emitted as single-character symbol tokens.
pub const SYMBOL_SET: &str = "{}()[];,.:=+-*/%<>!&|^~?#\\";

// ============================================================================
// DIALECT
// ============================================================================

/// Lexical dialect flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Accept `0x1F` integer literals.
    pub hex_literals: bool,
    /// Accept `'...'` string literals.
    pub single_quote_strings: bool,
    /// Which game-mode keyword set is reserved.
    pub keyword_set: KeywordSet,
    /// Treat characters outside every known class as identifier letters instead of failing.
    pub unknown_chars_as_letters: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            hex_literals: true,
            single_quote_strings: false,
            keyword_set: KeywordSet::Multiplayer,
            unknown_chars_as_letters: false,
        }
    }
}

impl Dialect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hex_literals(mut self, enabled: bool) -> Self {
        self.hex_literals = enabled;
        self
    }

    pub fn with_single_quote_strings(mut self, enabled: bool) -> Self {
        self.single_quote_strings = enabled;
        self
    }

    pub fn with_keyword_set(mut self, set: KeywordSet) -> Self {
        self.keyword_set = set;
        self
    }

    pub fn with_unknown_chars_as_letters(mut self, enabled: bool) -> Self {
        self.unknown_chars_as_letters = enabled;
        self
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Fatal lexing failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum LexError {
    #[error("illegal character {ch:?} at {loc}")]
    #[diagnostic(
        code(gscript::lex::illegal_character),
        help("enable `unknown_chars_as_letters` to treat unknown characters as part of identifiers")
    )]
    IllegalCharacter { ch: char, loc: Location },

    #[error("unterminated string literal starting at {loc}")]
    #[diagnostic(code(gscript::lex::unterminated_string))]
    UnterminatedString { loc: Location },

    #[error("unterminated block comment starting at {loc}")]
    #[diagnostic(code(gscript::lex::unterminated_comment))]
    UnterminatedComment { loc: Location },

    #[error("hexadecimal literal without digits at {loc}")]
    #[diagnostic(code(gscript::lex::empty_hex_literal))]
    EmptyHexLiteral { loc: Location },
}

impl LexError {
    pub fn location(&self) -> Location {
        match self {
            LexError::IllegalCharacter { loc, .. }
            | LexError::UnterminatedString { loc }
            | LexError::UnterminatedComment { loc }
            | LexError::EmptyHexLiteral { loc } => *loc,
        }
    }
}

// ============================================================================
// LEXER STATE
// ============================================================================

/// Step-driven lexer over one source text.
pub struct Lexer<'a> {
    source: &'a str,
    dialect: Dialect,
    /// Byte offset of the next unread character.
    pos: usize,
    line: u32,
    column: u32,
    /// Last non-trivia token, used to tell `%` as modulo apart from a resource variable.
    last_significant: Option<Token>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, dialect: Dialect) -> Self {
        Self {
            source,
            dialect,
            pos: 0,
            line: 1,
            column: 1,
            last_significant: None,
            finished: false,
        }
    }

    /// Fraction of the source consumed so far, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.source.is_empty() {
            1.0
        } else {
            self.pos as f32 / self.source.len() as f32
        }
    }

    /// Produce the next token.
    ///
    /// ## Returns
    /// - `Ok(Some(token))` for every token, ending with exactly one [`TokenKind::Eof`].
    /// - `Ok(None)` once the `Eof` token has been delivered.
    ///
    /// ## Errors
    /// - [`LexError`] on an illegal character or an unterminated literal/comment.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        if self.finished {
            return Ok(None);
        }
        let start = self.location();
        let Some(c) = self.peek() else {
            self.finished = true;
            return Ok(Some(Token::eof(start)));
        };

        let dialect = self.dialect;
        let kind = match c {
            ' ' | '\t' | '\r' | '\n' => {
                self.eat_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
                TokenKind::WhiteSpace
            }
            '/' if self.peek_second() == Some('/') => {
                self.eat_while(|c| c != '\n');
                TokenKind::Comment
            }
            '/' if self.peek_second() == Some('*') => {
                self.block_comment(start)?;
                TokenKind::Comment
            }
            '"' => {
                self.string('"', start)?;
                TokenKind::String
            }
            '\'' if self.dialect.single_quote_strings => {
                self.string('\'', start)?;
                TokenKind::String
            }
            '&' if self.peek_second() == Some('"') => {
                self.bump();
                self.string('"', start)?;
                TokenKind::MetaString
            }
            '%' if self.peek_second().is_some_and(|c| is_ident_start(c, &dialect)) && !self.after_value() => {
                self.bump();
                self.eat_while(|c| is_ident_continue(c, &dialect));
                TokenKind::ResourceVar
            }
            c if c.is_ascii_digit() => {
                self.number(start)?;
                TokenKind::Number
            }
            '.' if self.peek_second().is_some_and(|c| c.is_ascii_digit()) && !self.after_value() => {
                self.number(start)?;
                TokenKind::Number
            }
            c if is_ident_start(c, &dialect) => {
                self.eat_while(|c| is_ident_continue(c, &dialect));
                TokenKind::Identifier
            }
            c if SYMBOL_SET.contains(c) => {
                self.bump();
                TokenKind::Symbol
            }
            ch => return Err(LexError::IllegalCharacter { ch, loc: start }),
        };

        let token = Token::new(kind, &self.source[start.offset..self.pos], start);
        if !token.is_trivia() {
            self.last_significant = Some(token.clone());
        }
        Ok(Some(token))
    }

    /// Tokenize the whole source. The result always ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn location(&self) -> Location {
        Location::new(self.line, self.column, self.pos)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while self.peek().is_some_and(&mut pred) {
            self.bump();
        }
    }

    fn after_value(&self) -> bool {
        self.last_significant
            .as_ref()
            .is_some_and(|t| t.ends_value(self.dialect.keyword_set))
    }

    // ========================================================================
    // Literal scanners
    // ========================================================================

    fn block_comment(&mut self, start: Location) -> Result<(), LexError> {
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(LexError::UnterminatedComment { loc: start }),
            }
        }
    }

    /// Scan a quoted literal; escapes are kept verbatim and decoded later by the parser's constant nodes.
    fn string(&mut self, quote: char, start: Location) -> Result<(), LexError> {
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(LexError::UnterminatedString { loc: start });
                    }
                }
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
                None => return Err(LexError::UnterminatedString { loc: start }),
            }
        }
    }

    fn number(&mut self, start: Location) -> Result<(), LexError> {
        if self.dialect.hex_literals && self.peek() == Some('0') && matches!(self.peek_second(), Some('x' | 'X')) {
            self.bump();
            self.bump();
            let digits_start = self.pos;
            self.eat_while(|c| c.is_ascii_hexdigit());
            if self.pos == digits_start {
                return Err(LexError::EmptyHexLiteral { loc: start });
            }
            return Ok(());
        }

        self.eat_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }
        Ok(())
    }
}

fn is_ident_start(c: char, dialect: &Dialect) -> bool {
    c.is_ascii_alphabetic() || c == '_' || (dialect.unknown_chars_as_letters && is_unknown(c, dialect))
}

fn is_ident_continue(c: char, dialect: &Dialect) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || (dialect.unknown_chars_as_letters && is_unknown(c, dialect))
}

/// Outside every character class the lexer knows.
fn is_unknown(c: char, dialect: &Dialect) -> bool {
    !(c.is_ascii_alphanumeric()
        || c == '_'
        || matches!(c, ' ' | '\t' | '\r' | '\n' | '"')
        || (c == '\'' && dialect.single_quote_strings)
        || SYMBOL_SET.contains(c))
}

/// Convenience function to lex a source string.
///
/// This is a shorthand for `Lexer::new(source, *dialect).tokenize()`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str, dialect: &Dialect) -> Result<Vec<Token>, LexError> {
    Lexer::new(source, *dialect).tokenize()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn significant(source: &str, dialect: &Dialect) -> Vec<(TokenKind, String)> {
        lex(source, dialect)
            .unwrap()
            .into_iter()
            .filter(|t| !t.is_trivia())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        significant(source, &Dialect::default()).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn symbols_are_single_characters() {
        let toks = significant("a<<=1;", &Dialect::default());
        let texts: Vec<&str> = toks.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["a", "<", "<", "=", "1", ";", ""]);
    }

    #[test]
    fn whitespace_and_comments_are_delivered() {
        let toks = lex("a // note\n/* block */ b", &Dialect::default()).unwrap();
        let kinds: Vec<TokenKind> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::WhiteSpace,
                TokenKind::Comment,
                TokenKind::WhiteSpace,
                TokenKind::Comment,
                TokenKind::WhiteSpace,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn locations_track_lines_and_columns() {
        let toks = lex("a\n  bc", &Dialect::default()).unwrap();
        let bc = toks.iter().find(|t| t.text == "bc").unwrap();
        assert_eq!(bc.loc, Location::new(2, 3, 4));
    }

    #[test]
    fn percent_is_resource_or_modulo_by_position() {
        assert_eq!(
            kinds("x = %run;"),
            vec![
                TokenKind::Identifier,
                TokenKind::Symbol,
                TokenKind::ResourceVar,
                TokenKind::Symbol,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("x = a %b;"),
            vec![
                TokenKind::Identifier,
                TokenKind::Symbol,
                TokenKind::Identifier,
                TokenKind::Symbol,
                TokenKind::Identifier,
                TokenKind::Symbol,
                TokenKind::Eof
            ]
        );
        assert_eq!(kinds("return %death;")[1], TokenKind::ResourceVar);
    }

    #[test]
    fn localized_strings_and_numbers() {
        let toks = significant(r#"f(&"HINT", .5, 0x1f, 2.25)"#, &Dialect::default());
        assert_eq!(toks[2], (TokenKind::MetaString, r#"&"HINT""#.to_string()));
        assert_eq!(toks[4], (TokenKind::Number, ".5".to_string()));
        assert_eq!(toks[6], (TokenKind::Number, "0x1f".to_string()));
        assert_eq!(toks[8], (TokenKind::Number, "2.25".to_string()));
    }

    #[test]
    fn member_access_is_not_a_number() {
        assert_eq!(
            kinds("a.b"),
            vec![TokenKind::Identifier, TokenKind::Symbol, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn single_quotes_depend_on_dialect() {
        let err = lex("x = 'a';", &Dialect::default()).unwrap_err();
        assert!(matches!(err, LexError::IllegalCharacter { ch: '\'', .. }));

        let dialect = Dialect::new().with_single_quote_strings(true);
        assert_eq!(significant("'a'", &dialect)[0].0, TokenKind::String);
    }

    #[test]
    fn hex_depends_on_dialect() {
        let dialect = Dialect::new().with_hex_literals(false);
        let toks = significant("0x10", &dialect);
        assert_eq!(toks[0], (TokenKind::Number, "0".to_string()));
        assert_eq!(toks[1], (TokenKind::Identifier, "x10".to_string()));
    }

    #[test]
    fn illegal_character_is_fatal_and_located() {
        let err = lex("a = 1;\nb = @;", &Dialect::default()).unwrap_err();
        assert_eq!(
            err,
            LexError::IllegalCharacter {
                ch: '@',
                loc: Location::new(2, 5, 11)
            }
        );
        assert!(err.to_string().contains("2:5"));
    }

    #[test]
    fn unknown_chars_as_letters() {
        let dialect = Dialect::new().with_unknown_chars_as_letters(true);
        let toks = significant("a@b = 1;", &dialect);
        assert_eq!(toks[0], (TokenKind::Identifier, "a@b".to_string()));
    }

    #[test]
    fn unterminated_literals() {
        assert!(matches!(
            lex("\"abc", &Dialect::default()),
            Err(LexError::UnterminatedString { .. })
        ));
        assert!(matches!(
            lex("/* abc", &Dialect::default()),
            Err(LexError::UnterminatedComment { .. })
        ));
    }

    #[test]
    fn stepping_matches_tokenize() {
        let source = "main() { wait 1; }";
        let mut lexer = Lexer::new(source, Dialect::default());
        let mut stepped = Vec::new();
        while let Some(token) = lexer.next_token().unwrap() {
            stepped.push(token);
        }
        assert_eq!(lexer.progress(), 1.0);
        assert_eq!(stepped, lex(source, &Dialect::default()).unwrap());
    }
}
