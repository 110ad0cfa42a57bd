#![forbid(unsafe_code)]
//! gscript: front end for a C-like, thread-oriented game scripting language.
//!
//! The syntax work (lexer, incremental parser, syntax graph, comparer) lives in `gscript_syntax`; this crate adds the
//! source-level tooling built on it: the formatter, the whitespace packer, the round-trip self-check and the CLI.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! ## Examples
//!
//! ```rust
//! use gscript::{FormatConfig, verify_round_trip};
//!
//! let trip = verify_round_trip("main(){if(a>1)b=2;else b=3;}", &FormatConfig::default()).unwrap();
//! assert_eq!(trip.packed, "main(){if(a>1)b=2;else b=3;}");
//! ```

pub mod cli;
pub mod format;

pub use gscript_syntax::{ast, compare, diagnostics, lexer, parser};

pub use format::{
    FormatConfig, FormatError, check_formatted, format_diff, format_source, format_source_with_config, pack_source,
    verify_round_trip,
};
