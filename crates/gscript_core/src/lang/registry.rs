//! Shareable metadata for `gscript_core::lang` registries.
//!
//! The `gscript_core::lang` module is a set of **registry-first** vocabularies: keywords, operators and punctuation.
//! This submodule provides the small, dependency-free metadata types that are reused across all registries.
//!
//! ## Notes
//! - These types are `Copy` so registries can live in `const` tables.
//! - Metadata is meant for tooling/docs/diagnostics; enforcement of syntax rules still lives in the lexer/parser.

/// Describe the lifecycle status of a language vocabulary item.
///
/// ## Examples
/// ```rust
/// use gscript_core::lang::registry::Stability;
///
/// let s = Stability::Stable;
/// assert_eq!(format!("{s:?}"), "Stable");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stability {
    Stable,
    /// Accepted by the parser but discouraged (e.g. debugger-only constructs).
    Deprecated,
}

/// Represent a small example snippet for documentation.
///
/// ## Examples
/// ```rust
/// use gscript_core::lang::registry::Example;
///
/// let ex = Example {
///     code: "wait 0.05;",
///     note: Some("Yield the current thread for one server frame."),
/// };
/// assert!(ex.code.starts_with("wait"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Example {
    pub code: &'static str,
    pub note: Option<&'static str>,
}
