//! Define the reserved keyword vocabulary for gscript.
//!
//! This module is the single source of truth for reserved words: a stable identifier ([`KeywordId`]) plus a const
//! metadata table ([`KEYWORDS`]) that records canonical spellings, categories and the game modes a keyword exists in.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **ASCII case-insensitive**: the language treats `IF` and `if` alike.
//! - The singleplayer and multiplayer dialects reserve slightly different words. A keyword that is unavailable in
//!   the active [`KeywordSet`] is an ordinary identifier there (e.g. `childthread` in singleplayer scripts).
//!
//! ## Examples
//! ```rust
//! use gscript_core::lang::keywords::{self, KeywordId, KeywordSet};
//!
//! assert_eq!(keywords::from_str("WAIT", KeywordSet::Singleplayer), Some(KeywordId::Wait));
//! assert_eq!(keywords::from_str("childthread", KeywordSet::Singleplayer), None);
//! assert_eq!(keywords::from_str("childthread", KeywordSet::Multiplayer), Some(KeywordId::ChildThread));
//! ```

use super::registry::{Example, Stability};

/// Stable identifier for every reserved keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Control flow
    If,
    Else,
    While,
    For,
    Foreach,
    In,
    Switch,
    Case,
    Default,
    Break,
    Continue,

    // Keyword-style calls
    Return,
    Wait,
    WaitTillFrameEnd,
    Breakpoint,

    // Call modifiers
    Thread,
    ChildThread,

    // Literals
    True,
    False,
    Undefined,

    // Root declarations
    Const,
    Global,
}

/// Select which game-mode keyword set the lexer/parser reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeywordSet {
    Singleplayer,
    #[default]
    Multiplayer,
}

/// Record in which keyword sets a keyword is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    Both,
    SingleplayerOnly,
    MultiplayerOnly,
}

impl Availability {
    /// Check whether the keyword is reserved in `set`.
    pub const fn includes(self, set: KeywordSet) -> bool {
        match self {
            Availability::Both => true,
            Availability::SingleplayerOnly => matches!(set, KeywordSet::Singleplayer),
            Availability::MultiplayerOnly => matches!(set, KeywordSet::Multiplayer),
        }
    }
}

/// High-level grouping for documentation and tooling.
///
/// ## Notes
/// - Categories are metadata only; the parser owns context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    ControlFlow,
    /// `return`, `wait`, `waittillframeend`, `breakpoint`: statements shaped like a call with an optional argument.
    KeywordCall,
    CallModifier,
    Literal,
    Declaration,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub category: KeywordCategory,
    pub availability: Availability,
    pub stability: Stability,
    pub examples: &'static [Example],
}

/// Registry of all keywords.
///
/// ## Notes
/// - The ordering is not semantically meaningful, but is grouped for readability.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Control flow
    info(KeywordId::If, "if", KeywordCategory::ControlFlow, Availability::Both),
    info(KeywordId::Else, "else", KeywordCategory::ControlFlow, Availability::Both),
    info(KeywordId::While, "while", KeywordCategory::ControlFlow, Availability::Both),
    info(KeywordId::For, "for", KeywordCategory::ControlFlow, Availability::Both),
    KeywordInfo {
        examples: &[Example {
            code: "foreach (key, value in level.players) { value notify(\"go\"); }",
            note: Some("The key binding is optional."),
        }],
        ..info(KeywordId::Foreach, "foreach", KeywordCategory::ControlFlow, Availability::Both)
    },
    info(KeywordId::In, "in", KeywordCategory::ControlFlow, Availability::Both),
    info(KeywordId::Switch, "switch", KeywordCategory::ControlFlow, Availability::Both),
    info(KeywordId::Case, "case", KeywordCategory::ControlFlow, Availability::Both),
    info(KeywordId::Default, "default", KeywordCategory::ControlFlow, Availability::Both),
    info(KeywordId::Break, "break", KeywordCategory::ControlFlow, Availability::Both),
    info(KeywordId::Continue, "continue", KeywordCategory::ControlFlow, Availability::Both),
    // Keyword-style calls
    info(KeywordId::Return, "return", KeywordCategory::KeywordCall, Availability::Both),
    KeywordInfo {
        examples: &[Example {
            code: "wait 0.05;",
            note: Some("Yield the current thread for one server frame."),
        }],
        ..info(KeywordId::Wait, "wait", KeywordCategory::KeywordCall, Availability::Both)
    },
    info(
        KeywordId::WaitTillFrameEnd,
        "waittillframeend",
        KeywordCategory::KeywordCall,
        Availability::Both,
    ),
    KeywordInfo {
        stability: Stability::Deprecated,
        ..info(
            KeywordId::Breakpoint,
            "breakpoint",
            KeywordCategory::KeywordCall,
            Availability::SingleplayerOnly,
        )
    },
    // Call modifiers
    info(KeywordId::Thread, "thread", KeywordCategory::CallModifier, Availability::Both),
    info(
        KeywordId::ChildThread,
        "childthread",
        KeywordCategory::CallModifier,
        Availability::MultiplayerOnly,
    ),
    // Literals
    info(KeywordId::True, "true", KeywordCategory::Literal, Availability::Both),
    info(KeywordId::False, "false", KeywordCategory::Literal, Availability::Both),
    info(KeywordId::Undefined, "undefined", KeywordCategory::Literal, Availability::Both),
    // Root declarations
    info(KeywordId::Const, "const", KeywordCategory::Declaration, Availability::Both),
    info(KeywordId::Global, "global", KeywordCategory::Declaration, Availability::Both),
];

/// Canonical spelling.
///
/// ## Parameters
/// - `id`: Keyword identifier.
///
/// ## Returns
/// - The canonical spelling from [`KEYWORDS`].
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("keyword info missing")
}

/// Lookup by spelling within a keyword set.
///
/// ## Parameters
/// - `s`: Candidate keyword spelling.
/// - `set`: The active game-mode keyword set.
///
/// ## Returns
/// - `Some(KeywordId)` if the spelling names a keyword reserved in `set`.
/// - `None` otherwise (the word is an ordinary identifier).
pub fn from_str(s: &str, set: KeywordSet) -> Option<KeywordId> {
    KEYWORDS
        .iter()
        .find(|k| k.canonical.eq_ignore_ascii_case(s) && k.availability.includes(set))
        .map(|k| k.id)
}

/// Check whether a keyword begins a statement inside a function body.
///
/// ## Notes
/// - The expression machine hands these back to the statement machine untouched.
pub fn starts_statement(id: KeywordId) -> bool {
    matches!(
        id,
        KeywordId::If
            | KeywordId::Else
            | KeywordId::While
            | KeywordId::For
            | KeywordId::Foreach
            | KeywordId::Switch
            | KeywordId::Case
            | KeywordId::Default
            | KeywordId::Break
            | KeywordId::Continue
            | KeywordId::Return
            | KeywordId::Wait
            | KeywordId::WaitTillFrameEnd
            | KeywordId::Breakpoint
    )
}

// --- helpers -----------------------------------------------------------------

const fn info(
    id: KeywordId,
    canonical: &'static str,
    category: KeywordCategory,
    availability: Availability,
) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        category,
        availability,
        stability: Stability::Stable,
        examples: &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(from_str("Foreach", KeywordSet::Multiplayer), Some(KeywordId::Foreach));
        assert_eq!(from_str("TRUE", KeywordSet::Singleplayer), Some(KeywordId::True));
    }

    #[test]
    fn dialect_specific_keywords() {
        assert_eq!(from_str("breakpoint", KeywordSet::Multiplayer), None);
        assert_eq!(from_str("breakpoint", KeywordSet::Singleplayer), Some(KeywordId::Breakpoint));
        assert!(info_for(KeywordId::Breakpoint).stability == Stability::Deprecated);
    }

    #[test]
    fn literals_do_not_start_statements() {
        assert!(!starts_statement(KeywordId::True));
        assert!(!starts_statement(KeywordId::Thread));
        assert!(starts_statement(KeywordId::Wait));
    }
}
