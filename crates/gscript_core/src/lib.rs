//! Provide the canonical language vocabulary for the gscript front end.
//!
//! This crate is intentionally small and dependency-free. It holds the registry tables that the lexer, parser,
//! renderer and tooling all agree on: reserved keywords (per game-mode keyword set), operators with their
//! precedence and fixity, and punctuation.
//!
//! ## Notes
//!
//! - This is a “vocabulary” crate: **no IO**, no global mutable state, and no syntax-tree types.
//! - Every table is a `const` slice, so lookups never allocate.

pub mod lang;
