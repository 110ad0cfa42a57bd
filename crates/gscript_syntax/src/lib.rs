//! Syntax front end for gscript: lexer, token stream, incremental parser, syntax graph and structural comparer.
//!
//! This crate is dependency-light and intended for reuse by the formatter, the CLI and any external analyzer that
//! consumes the syntax graph.
//!
//! ## Notes
//! - This crate is “syntax-only”: it never resolves names across modules. Function references keep the scope
//!   qualifier they were written with and nothing more.
//! - Vocabulary identity (keywords/operators/punctuation) comes from `gscript_core::lang` registries.
//! - Both the lexer ([`lexer::Lexer::next_token`]) and the parser ([`parser::Parser::step`]) can be driven one step
//!   at a time; the `lex`/`parse` helpers simply loop to completion.
//!
//! ## Examples
//! ```rust
//! use gscript_syntax::lexer::{self, Dialect};
//! use gscript_syntax::parser::{self, ParserConfig};
//!
//! let tokens = lexer::lex("main() { wait 1; }", &Dialect::default()).unwrap();
//! let output = parser::parse(tokens, ParserConfig::default());
//! assert!(output.is_success());
//! ```

pub mod ast;
pub mod compare;
pub mod const_eval;
pub mod diagnostics;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod token_stream;
pub mod value;

mod display;
