//! gscript language vocabulary registries.
//!
//! This module is the “front door” for language-level vocabulary: reserved keywords, operators, punctuation and
//! directive names.
//!
//! Callers work with **stable IDs** (e.g. `KeywordId`, `OperatorId`) and look up spellings/metadata via registry
//! tables instead of scattering string comparisons across the parser.
//!
//! ## Notes
//! - Registries are **pure**: no AST types, no IO, no side effects.
//! - The lexer emits every symbol character as its own token; multi-character spellings (`<<=`, `::`, `[[`) are
//!   assembled by the parser. For operators it reads a run drawn from [`operators::SPELLING_CHARS`] and commits to
//!   the characters [`longest_symbol_prefix`] accepts.
//!
//! ## Examples
//! ```rust
//! use gscript_core::lang::keywords::{self, KeywordId, KeywordSet};
//!
//! assert_eq!(keywords::from_str("if", KeywordSet::Multiplayer), Some(KeywordId::If));
//! assert_eq!(keywords::as_str(KeywordId::If), "if");
//! ```

pub mod directives;
pub mod keywords;
pub mod operators;
pub mod punctuation;
pub mod registry;

/// Return the length (in characters) of the longest operator or punctuation spelling that prefixes `run`.
///
/// ## Parameters
/// - `run`: a run of adjacent symbol characters, e.g. `"<<=-"`.
///
/// ## Returns
/// - The number of leading characters forming the longest known spelling, or `0` if not even the first character
///   is a known symbol.
///
/// ## Examples
/// ```rust
/// use gscript_core::lang::longest_symbol_prefix;
///
/// assert_eq!(longest_symbol_prefix("<<=1"), 3);
/// assert_eq!(longest_symbol_prefix("<-"), 1);
/// assert_eq!(longest_symbol_prefix("::"), 2);
/// assert_eq!(longest_symbol_prefix("@"), 0);
/// ```
pub fn longest_symbol_prefix(run: &str) -> usize {
    let mut best = 0;
    for (end, _) in run.char_indices().map(|(i, c)| (i + c.len_utf8(), c)) {
        let candidate = &run[..end];
        if operators::is_spelling(candidate) || punctuation::from_str(candidate).is_some() {
            best = candidate.chars().count();
        }
    }
    best
}

/// Check whether `text` is a strict prefix of some multi-character operator or punctuation spelling.
///
/// ## Notes
/// - Used by whitespace packers: two adjacent symbol tokens must stay separated when gluing them would start a
///   longer spelling (`a - -b` must not become `a--b`).
pub fn extends_to_longer_symbol(text: &str) -> bool {
    let longer = |s: &str| s.len() > text.len() && s.starts_with(text);
    operators::OPERATORS.iter().any(|o| o.spellings.iter().copied().any(longer))
        || punctuation::PUNCTUATION.iter().any(|p| longer(p.canonical))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_prefers_longer_spellings() {
        assert_eq!(longest_symbol_prefix("+="), 2);
        assert_eq!(longest_symbol_prefix("++"), 2);
        assert_eq!(longest_symbol_prefix(">>="), 3);
        assert_eq!(longest_symbol_prefix("[["), 2);
        assert_eq!(longest_symbol_prefix("..."), 3);
        assert_eq!(longest_symbol_prefix(".."), 1);
    }

    #[test]
    fn gluing_detection() {
        assert!(extends_to_longer_symbol("-"));
        assert!(extends_to_longer_symbol("<<"));
        assert!(!extends_to_longer_symbol("~"));
        assert!(!extends_to_longer_symbol(";"));
    }
}
