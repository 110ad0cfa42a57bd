//! Operator vocabulary.
//!
//! This module defines the canonical operator set along with precedence, associativity and fixity.
//!
//! ## Notes
//! - `precedence` is relative; higher binds tighter. Every binary operator has a distinct level except operators in
//!   the same family (`*`/`/`/`%`, `+`/`-`, shifts, relational, equality).
//! - Prefix operators bind tighter than every binary operator; assignment binds loosest and associates right.
//! - `-` is spelled by both [`OperatorId::Minus`] (infix) and [`OperatorId::Negate`] (prefix). Use [`lookup`] with a
//!   [`Fixity`] when the position is known.
//!
//! ## Examples
//! ```rust
//! use gscript_core::lang::operators::{self, Fixity, OperatorId};
//!
//! assert_eq!(operators::lookup("-", Fixity::Prefix), Some(OperatorId::Negate));
//! assert!(operators::info_for(OperatorId::Star).precedence > operators::info_for(OperatorId::Plus).precedence);
//! ```

use super::registry::{Example, Stability};

/// Define how operators associate when chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

/// Define where an operator sits relative to its operand(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
    Postfix,
    /// Infix, but only legal with a mutable left-hand side.
    Assign,
}

/// Stable identifier for every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Shifts
    Shl,
    Shr,

    // Comparison
    Lt,
    LtEq,
    Gt,
    GtEq,
    EqEq,
    NotEq,

    // Bitwise
    BitAnd,
    BitXor,
    BitOr,

    // Logical
    AndAnd,
    OrOr,

    // Prefix
    Not,
    Negate,
    BitNot,

    // Postfix
    Increment,
    Decrement,

    // Assignment
    Assign,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AndEq,
    OrEq,
    XorEq,
    ShlEq,
    ShrEq,
}

/// Metadata for an operator.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spellings: &'static [&'static str],
    pub precedence: u8,
    pub associativity: Associativity,
    pub fixity: Fixity,
    pub stability: Stability,
    pub examples: &'static [Example],
}

/// Precedence shared by every prefix operator.
pub const PREFIX_PRECEDENCE: u8 = 110;

/// Precedence shared by every assignment operator.
pub const ASSIGN_PRECEDENCE: u8 = 10;

/// Every character that occurs in an operator spelling.
///
/// The parser reads adjacent symbol tokens drawn from this set before resolving the longest spelling.
pub const SPELLING_CHARS: &str = "=+-*/%<>!&|^~";

/// Length of the longest operator spelling, in characters.
pub const MAX_SPELLING_LEN: usize = 3;

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    // Arithmetic
    op(OperatorId::Star, &["*"], 100, Associativity::Left, Fixity::Infix),
    op(OperatorId::Slash, &["/"], 100, Associativity::Left, Fixity::Infix),
    op(OperatorId::Percent, &["%"], 100, Associativity::Left, Fixity::Infix),
    op(OperatorId::Plus, &["+"], 90, Associativity::Left, Fixity::Infix),
    op(OperatorId::Minus, &["-"], 90, Associativity::Left, Fixity::Infix),
    // Shifts
    op(OperatorId::Shl, &["<<"], 80, Associativity::Left, Fixity::Infix),
    op(OperatorId::Shr, &[">>"], 80, Associativity::Left, Fixity::Infix),
    // Comparison
    op(OperatorId::Lt, &["<"], 70, Associativity::Left, Fixity::Infix),
    op(OperatorId::LtEq, &["<="], 70, Associativity::Left, Fixity::Infix),
    op(OperatorId::Gt, &[">"], 70, Associativity::Left, Fixity::Infix),
    op(OperatorId::GtEq, &[">="], 70, Associativity::Left, Fixity::Infix),
    op(OperatorId::EqEq, &["=="], 60, Associativity::Left, Fixity::Infix),
    op(OperatorId::NotEq, &["!="], 60, Associativity::Left, Fixity::Infix),
    // Bitwise
    op(OperatorId::BitAnd, &["&"], 50, Associativity::Left, Fixity::Infix),
    op(OperatorId::BitXor, &["^"], 45, Associativity::Left, Fixity::Infix),
    op(OperatorId::BitOr, &["|"], 40, Associativity::Left, Fixity::Infix),
    // Logical
    op(OperatorId::AndAnd, &["&&"], 30, Associativity::Left, Fixity::Infix),
    op(OperatorId::OrOr, &["||"], 20, Associativity::Left, Fixity::Infix),
    // Prefix
    op(OperatorId::Not, &["!"], PREFIX_PRECEDENCE, Associativity::Right, Fixity::Prefix),
    op(OperatorId::Negate, &["-"], PREFIX_PRECEDENCE, Associativity::Right, Fixity::Prefix),
    op(OperatorId::BitNot, &["~"], PREFIX_PRECEDENCE, Associativity::Right, Fixity::Prefix),
    // Postfix
    OperatorInfo {
        examples: &[Example {
            code: "level.count++;",
            note: Some("Only variables, member accesses and indexers can be incremented."),
        }],
        ..op(OperatorId::Increment, &["++"], 120, Associativity::Left, Fixity::Postfix)
    },
    op(OperatorId::Decrement, &["--"], 120, Associativity::Left, Fixity::Postfix),
    // Assignment
    op(OperatorId::Assign, &["="], ASSIGN_PRECEDENCE, Associativity::Right, Fixity::Assign),
    op(OperatorId::PlusEq, &["+="], ASSIGN_PRECEDENCE, Associativity::Right, Fixity::Assign),
    op(OperatorId::MinusEq, &["-="], ASSIGN_PRECEDENCE, Associativity::Right, Fixity::Assign),
    op(OperatorId::StarEq, &["*="], ASSIGN_PRECEDENCE, Associativity::Right, Fixity::Assign),
    op(OperatorId::SlashEq, &["/="], ASSIGN_PRECEDENCE, Associativity::Right, Fixity::Assign),
    op(OperatorId::PercentEq, &["%="], ASSIGN_PRECEDENCE, Associativity::Right, Fixity::Assign),
    op(OperatorId::AndEq, &["&="], ASSIGN_PRECEDENCE, Associativity::Right, Fixity::Assign),
    op(OperatorId::OrEq, &["|="], ASSIGN_PRECEDENCE, Associativity::Right, Fixity::Assign),
    op(OperatorId::XorEq, &["^="], ASSIGN_PRECEDENCE, Associativity::Right, Fixity::Assign),
    op(OperatorId::ShlEq, &["<<="], ASSIGN_PRECEDENCE, Associativity::Right, Fixity::Assign),
    op(OperatorId::ShrEq, &[">>="], ASSIGN_PRECEDENCE, Associativity::Right, Fixity::Assign),
];

/// Return the full metadata entry for an operator.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    OPERATORS.iter().find(|o| o.id == id).expect("operator info missing")
}

/// Canonical spelling of an operator.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spellings[0]
}

/// Resolve a spelling in a known syntactic position.
///
/// ## Parameters
/// - `spelling`: Candidate operator token text.
/// - `fixity`: Position the parser found it in. [`Fixity::Infix`] also matches assignment operators, since both
///   follow a complete operand.
///
/// ## Returns
/// - `Some(OperatorId)` if an operator with that spelling exists for the position, `None` otherwise.
pub fn lookup(spelling: &str, fixity: Fixity) -> Option<OperatorId> {
    OPERATORS
        .iter()
        .find(|o| {
            let position_matches = o.fixity == fixity || (fixity == Fixity::Infix && o.fixity == Fixity::Assign);
            let spellings: &[&str] = o.spellings;
            position_matches && spellings.contains(&spelling)
        })
        .map(|o| o.id)
}

/// Check whether `spelling` is any operator's spelling.
pub fn is_spelling(spelling: &str) -> bool {
    OPERATORS.iter().any(|o| {
        let spellings: &[&str] = o.spellings;
        spellings.contains(&spelling)
    })
}

// --- helpers -----------------------------------------------------------------

const fn op(
    id: OperatorId,
    spellings: &'static [&'static str],
    precedence: u8,
    associativity: Associativity,
    fixity: Fixity,
) -> OperatorInfo {
    OperatorInfo {
        id,
        spellings,
        precedence,
        associativity,
        fixity,
        stability: Stability::Stable,
        examples: &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_binds_tighter_than_every_binary_operator() {
        for info in OPERATORS.iter().filter(|o| o.fixity == Fixity::Infix) {
            assert!(info.precedence < PREFIX_PRECEDENCE, "{:?}", info.id);
            assert!(info.precedence > ASSIGN_PRECEDENCE, "{:?}", info.id);
        }
    }

    #[test]
    fn minus_depends_on_position() {
        assert_eq!(lookup("-", Fixity::Infix), Some(OperatorId::Minus));
        assert_eq!(lookup("-", Fixity::Prefix), Some(OperatorId::Negate));
        assert_eq!(lookup("<<=", Fixity::Infix), Some(OperatorId::ShlEq));
        assert_eq!(lookup("++", Fixity::Infix), None);
    }
}
