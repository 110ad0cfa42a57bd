//! Pull cursor over a materialized token sequence.
//!
//! The stream owns every token of one session. Two cursors walk it:
//!
//! - the **committed cursor** (`cursor`): the next token a plain [`TokenStream::read`] delivers;
//! - the **read-ahead cursor** (`ahead`): where lookahead reads continue.
//!
//! Tokens in `cursor..ahead` form the lookahead buffer. They are replayed by the next committed reads unless the
//! caller commits to them with [`TokenStream::discard`].

use crate::ast::Location;
use crate::lexer::{Token, TokenKind};

/// Saved committed position, see [`TokenStream::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
    ahead: usize,
    /// Index of the token delivered by the latest committed read.
    last: Option<usize>,
}

impl TokenStream {
    /// Wrap a token sequence. An `Eof` token is appended when the sequence does not already end with one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let loc = tokens.last().map(end_of).unwrap_or_default();
            tokens.push(Token::eof(loc));
        }
        Self {
            tokens,
            cursor: 0,
            ahead: 0,
            last: None,
        }
    }

    fn at(&self, index: usize) -> &Token {
        // `new` guarantees a trailing Eof, so the clamp always lands on a real token.
        &self.tokens[index.min(self.tokens.len() - 1)]
    }

    fn end(&self) -> usize {
        self.tokens.len()
    }

    /// Deliver the next token.
    ///
    /// ## Parameters
    /// - `store`: when `true`, read at the read-ahead cursor and keep the token buffered; when `false`, commit the
    ///   next token (replaying the buffer first, if any).
    ///
    /// Reading past the end keeps yielding the `Eof` token.
    pub fn read(&mut self, store: bool) -> &Token {
        if store {
            let index = self.ahead;
            self.ahead = (self.ahead + 1).min(self.end());
            return self.at(index);
        }
        let index = self.cursor;
        self.last = Some(index);
        self.cursor = (self.cursor + 1).min(self.end());
        self.ahead = self.ahead.max(self.cursor);
        self.at(index)
    }

    /// Re-deliver the latest committed token on the next read.
    pub fn defer(&mut self) {
        if let Some(last) = self.last.take() {
            self.cursor = last;
        }
    }

    /// Commit the first `n` buffered lookahead tokens.
    pub fn discard(&mut self, n: usize) {
        self.cursor = (self.cursor + n).min(self.ahead);
    }

    /// Greedily read adjacent symbol tokens whose character is in `allowed`, starting at the committed cursor.
    ///
    /// ## Returns
    /// The matched characters and how many tokens were read. The tokens stay buffered: call
    /// [`discard`](Self::discard) with the part of the count the caller commits to.
    ///
    /// ## Notes
    /// - Whitespace and comment tokens end the run, so `< <` never reads as `<<`.
    pub fn read_consecutive_symbols(&mut self, allowed: &str, max_len: usize) -> (String, usize) {
        self.ahead = self.cursor;
        let mut text = String::new();
        let mut count = 0;
        while count < max_len {
            let next = self.at(self.ahead);
            match next.symbol() {
                Some(c) if allowed.contains(c) => {
                    text.push(c);
                    count += 1;
                    self.ahead = (self.ahead + 1).min(self.end());
                }
                _ => break,
            }
        }
        (text, count)
    }

    /// Look at the token `n` positions past the committed cursor without reading it.
    pub fn peek_n(&self, n: usize) -> &Token {
        self.at(self.cursor + n)
    }

    /// The next committed token.
    pub fn peek(&self) -> &Token {
        self.peek_n(0)
    }

    /// The next committed token that is not whitespace or a comment.
    pub fn peek_significant(&self) -> &Token {
        let mut index = self.cursor;
        while self.at(index).is_trivia() {
            index += 1;
        }
        self.at(index)
    }

    /// Step the committed cursor back by one token.
    pub fn unread(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.last = None;
    }

    pub fn mark(&self) -> Mark {
        Mark(self.cursor)
    }

    /// Return to a saved position, dropping any lookahead.
    pub fn reset(&mut self, mark: Mark) {
        self.cursor = mark.0.min(self.end());
        self.ahead = self.cursor;
        self.last = None;
    }

    /// Fraction of tokens committed so far, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        self.cursor as f32 / self.end() as f32
    }

    /// Whether the committed cursor has moved past the `Eof` token.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.end()
    }

    /// Number of buffered lookahead tokens.
    pub fn buffered(&self) -> usize {
        self.ahead - self.cursor
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

fn end_of(token: &Token) -> Location {
    let mut loc = token.loc;
    for c in token.text.chars() {
        loc.offset += c.len_utf8();
        if c == '\n' {
            loc.line += 1;
            loc.column = 1;
        } else {
            loc.column += 1;
        }
    }
    loc
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Dialect, lex};

    fn stream(source: &str) -> TokenStream {
        TokenStream::new(lex(source, &Dialect::default()).unwrap())
    }

    #[test]
    fn reads_past_end_yield_eof() {
        let mut s = stream("a");
        assert_eq!(s.read(false).text, "a");
        assert!(s.read(false).is_eof());
        assert!(s.read(false).is_eof());
        assert!(s.is_exhausted());
        assert_eq!(s.progress(), 1.0);
    }

    #[test]
    fn appends_missing_eof() {
        let mut s = TokenStream::new(vec![Token::new(TokenKind::Identifier, "ab", Location::new(1, 1, 0))]);
        s.read(false);
        let eof = s.read(false);
        assert!(eof.is_eof());
        assert_eq!(eof.loc, Location::new(1, 3, 2));
    }

    #[test]
    fn defer_redelivers_last_token() {
        let mut s = stream("a b");
        assert_eq!(s.read(false).text, "a");
        s.defer();
        assert_eq!(s.read(false).text, "a");
        assert_eq!(s.read(false).kind, TokenKind::WhiteSpace);
    }

    #[test]
    fn consecutive_symbols_stop_at_trivia() {
        let mut s = stream("<<= 1");
        assert_eq!(s.read(false).text, "<");
        let (text, count) = s.read_consecutive_symbols("<>=", 2);
        assert_eq!((text.as_str(), count), ("<=", 2));
        s.discard(count);
        assert_eq!(s.read(false).kind, TokenKind::WhiteSpace);

        let mut s = stream("< <");
        s.read(false);
        let (text, count) = s.read_consecutive_symbols("<", 2);
        assert_eq!((text.as_str(), count), ("", 0));
    }

    #[test]
    fn undiscarded_lookahead_is_replayed() {
        let mut s = stream("<<1");
        s.read(false);
        let (_, count) = s.read_consecutive_symbols("<", 2);
        assert_eq!(count, 1);
        assert_eq!(s.buffered(), 1);
        s.discard(0);
        assert_eq!(s.read(false).text, "<");
        assert_eq!(s.read(false).text, "1");
    }

    #[test]
    fn stored_reads_do_not_commit() {
        let mut s = stream("a.b");
        assert_eq!(s.read(true).text, "a");
        assert_eq!(s.read(true).text, ".");
        assert_eq!(s.buffered(), 2);
        assert_eq!(s.read(false).text, "a");
        s.discard(1);
        assert_eq!(s.read(false).text, "b");
    }

    #[test]
    fn mark_reset_and_unread() {
        let mut s = stream("a b c");
        let mark = s.mark();
        s.read(false);
        s.read(false);
        assert_eq!(s.peek_n(0).text, "b");
        assert_eq!(s.peek_significant().text, "b");
        s.unread();
        assert_eq!(s.peek().kind, TokenKind::WhiteSpace);
        s.reset(mark);
        assert_eq!(s.read(false).text, "a");
    }
}
