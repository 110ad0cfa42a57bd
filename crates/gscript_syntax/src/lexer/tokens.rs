//! Token types for the gscript lexer.
//!
//! ## Notes
//! - Keywords are lexed as [`TokenKind::Identifier`]; whether a word is reserved depends on the active keyword set,
//!   so the parser asks [`Token::keyword`] instead of trusting a lexer-side classification.
//! - Every symbol is a single-character [`TokenKind::Symbol`] token. Multi-character operators are assembled by the
//!   parser through the token stream's lookahead.

use gscript_core::lang::keywords::{self, KeywordCategory, KeywordId, KeywordSet};

use crate::ast::Location;

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    /// Localized string: `&"REFERENCE"`.
    MetaString,
    /// Resource variable: `%anim_name`.
    ResourceVar,
    Symbol,
    Comment,
    WhiteSpace,
    Eof,
}

/// A token with its kind, raw text and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub loc: Location,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, loc: Location) -> Self {
        Self {
            kind,
            text: text.into(),
            loc,
        }
    }

    pub fn eof(loc: Location) -> Self {
        Self::new(TokenKind::Eof, "", loc)
    }

    /// Whitespace and comments: delivered by the stream, ignored by the parser's dispatcher.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::WhiteSpace | TokenKind::Comment)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// The character of a symbol token.
    pub fn symbol(&self) -> Option<char> {
        match self.kind {
            TokenKind::Symbol => self.text.chars().next(),
            _ => None,
        }
    }

    pub fn is_symbol(&self, c: char) -> bool {
        self.symbol() == Some(c)
    }

    /// The reserved keyword this identifier spells in `set`, if any.
    pub fn keyword(&self, set: KeywordSet) -> Option<KeywordId> {
        match self.kind {
            TokenKind::Identifier => keywords::from_str(&self.text, set),
            _ => None,
        }
    }

    pub fn is_keyword(&self, id: KeywordId, set: KeywordSet) -> bool {
        self.keyword(set) == Some(id)
    }

    /// Whether this token can end an operand, making a following `%` the modulo operator.
    pub(crate) fn ends_value(&self, set: KeywordSet) -> bool {
        match self.kind {
            TokenKind::Identifier => self
                .keyword(set)
                .is_none_or(|k| keywords::info_for(k).category == KeywordCategory::Literal),
            TokenKind::Number | TokenKind::String | TokenKind::MetaString | TokenKind::ResourceVar => true,
            TokenKind::Symbol => matches!(self.symbol(), Some(')' | ']')),
            TokenKind::Comment | TokenKind::WhiteSpace | TokenKind::Eof => false,
        }
    }

    /// Short human-readable description for diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Identifier => format!("identifier `{}`", self.text),
            TokenKind::Number => format!("number `{}`", self.text),
            TokenKind::String | TokenKind::MetaString => format!("string {}", self.text),
            TokenKind::ResourceVar => format!("resource `{}`", self.text),
            TokenKind::Symbol => format!("`{}`", self.text),
            TokenKind::Comment => "comment".to_string(),
            TokenKind::WhiteSpace => "whitespace".to_string(),
        }
    }
}
