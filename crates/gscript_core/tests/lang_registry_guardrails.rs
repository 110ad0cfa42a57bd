use std::collections::HashMap;

use gscript_core::lang::keywords::{self, KeywordSet};
use gscript_core::lang::operators::{self, Fixity};
use gscript_core::lang::punctuation;
use gscript_core::lang::longest_symbol_prefix;

#[test]
fn keywords_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, keywords::KeywordId> = HashMap::new();

    for info in keywords::KEYWORDS {
        let set = if info.availability.includes(KeywordSet::Multiplayer) {
            KeywordSet::Multiplayer
        } else {
            KeywordSet::Singleplayer
        };
        assert_eq!(
            keywords::from_str(info.canonical, set),
            Some(info.id),
            "keyword canonical spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(keywords::as_str(info.id), info.canonical, "keyword as_str mismatch for {:?}", info.id);

        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!("duplicate keyword spelling {:?}: {:?} and {:?}", info.canonical, prev, info.id);
        }
    }
}

#[test]
fn keywords_are_lowercase_identifiers() {
    for info in keywords::KEYWORDS {
        assert!(
            info.canonical.chars().all(|c| c.is_ascii_lowercase()),
            "keyword spelling must be a lowercase word: {}",
            info.canonical
        );
    }
}

#[test]
fn operator_spellings_unique_per_fixity() {
    let mut seen: HashMap<(&'static str, bool), operators::OperatorId> = HashMap::new();

    for info in operators::OPERATORS {
        let prefix = info.fixity == Fixity::Prefix;
        for &spelling in info.spellings {
            if let Some(prev) = seen.insert((spelling, prefix), info.id) {
                panic!("duplicate operator spelling {:?}: {:?} and {:?}", spelling, prev, info.id);
            }
            assert_eq!(
                longest_symbol_prefix(spelling),
                spelling.chars().count(),
                "operator spelling does not resolve to itself: {spelling}"
            );
        }
    }
}

#[test]
fn operator_character_set_matches_the_table() {
    let spellings: Vec<&str> = operators::OPERATORS.iter().flat_map(|o| o.spellings.iter().copied()).collect();

    for spelling in &spellings {
        for c in spelling.chars() {
            assert!(
                operators::SPELLING_CHARS.contains(c),
                "character {c:?} of operator {spelling:?} is missing from SPELLING_CHARS"
            );
        }
    }
    for c in operators::SPELLING_CHARS.chars() {
        assert!(spellings.iter().any(|s| s.contains(c)), "{c:?} in SPELLING_CHARS is not used by any operator");
    }

    let longest = spellings.iter().map(|s| s.chars().count()).max();
    assert_eq!(longest, Some(operators::MAX_SPELLING_LEN));
}

#[test]
fn punctuation_does_not_collide_with_operators() {
    for info in punctuation::PUNCTUATION {
        assert_eq!(punctuation::from_str(info.canonical), Some(info.id));
        assert!(
            !operators::is_spelling(info.canonical),
            "punctuation {:?} shadows an operator spelling",
            info.canonical
        );
    }
}
