//! Incremental parser for gscript.
//!
//! Converts a token sequence into the syntax graph with two cooperating automata: an operator-precedence machine for
//! expressions and a block/conditional machine for statements. Neither recurses; all construction state lives on
//! explicit stacks owned by one [`Parser`] session, which consumes exactly one token per [`Parser::step`].
//!
//! ## Examples
//!
//! ```rust
//! use gscript_syntax::parser::{self, ParserConfig};
//!
//! let output = parser::parse_source("main() { if (a > 1) b = 2; else b = 3; }", ParserConfig::default()).unwrap();
//! assert!(output.is_success());
//! let module = output.syntax.as_ref().and_then(|s| s.as_module()).unwrap();
//! assert_eq!(module.functions().count(), 1);
//! ```

use std::collections::HashMap;

use crate::ast::*;
use crate::const_eval;
use crate::diagnostics::{Diagnostic, Severity, errors};
use crate::lexer::{Dialect, LexError, Token, TokenKind, lex};
use crate::token_stream::TokenStream;
use crate::value::Value;
use gscript_core::lang::directives::{self, DirectiveId};
use gscript_core::lang::keywords::{self, KeywordId};
use gscript_core::lang::longest_symbol_prefix;
use gscript_core::lang::operators::{self, Fixity, OperatorId};

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/pending.rs");
include!("parser/expr.rs");
include!("parser/stmts.rs");
include!("parser/root.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
