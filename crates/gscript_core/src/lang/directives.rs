//! Preprocessor-style directive vocabulary.
//!
//! Directives are root declarations introduced by `#`. Only the names the parser treats specially are listed here;
//! any other `#name(args);` or `#name;` is kept as a generic directive.
//!
//! ## Notes
//! - Directive names are matched case-insensitively, like every other gscript identifier.
//!
//! ## Examples
//! ```rust
//! use gscript_core::lang::directives::{self, DirectiveId};
//!
//! assert_eq!(directives::from_str("INCLUDE"), Some(DirectiveId::Include));
//! assert_eq!(directives::as_str(DirectiveId::Declarative), "declarative");
//! assert_eq!(directives::from_str("using_animtree"), None);
//! ```

use super::registry::{Example, Stability};

/// Stable identifier for directives with dedicated syntax or semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveId {
    /// `#include a\b\c;` imports another script by path.
    Include,
    /// `#declarative;` turns the module into a list of forward declarations.
    Declarative,
}

/// Metadata for a directive.
#[derive(Debug, Clone, Copy)]
pub struct DirectiveInfo {
    pub id: DirectiveId,
    pub canonical: &'static str,
    pub stability: Stability,
    pub examples: &'static [Example],
}

/// Registry of all directives.
pub const DIRECTIVES: &[DirectiveInfo] = &[
    DirectiveInfo {
        id: DirectiveId::Include,
        canonical: "include",
        stability: Stability::Stable,
        examples: &[Example {
            code: "#include maps\\mp\\_utility;",
            note: None,
        }],
    },
    DirectiveInfo {
        id: DirectiveId::Declarative,
        canonical: "declarative",
        stability: Stability::Stable,
        examples: &[Example {
            code: "#declarative;\nspawn(origin, angles);",
            note: Some("Must precede every other declaration; functions in the module have no bodies."),
        }],
    },
];

/// Canonical spelling.
pub fn as_str(id: DirectiveId) -> &'static str {
    info_for(id).canonical
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: DirectiveId) -> &'static DirectiveInfo {
    DIRECTIVES.iter().find(|d| d.id == id).expect("directive info missing")
}

/// Lookup by name, ignoring ASCII case.
pub fn from_str(name: &str) -> Option<DirectiveId> {
    DIRECTIVES
        .iter()
        .find(|d| d.canonical.eq_ignore_ascii_case(name))
        .map(|d| d.id)
}
