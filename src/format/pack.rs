//! Whitespace packer
//!
//! Re-emits a token sequence with comments and whitespace removed. A single space survives only between tokens that
//! were separated in the source and would lex or assemble differently once glued (`a - -b`, `wait 1`, `& "x"`).

use gscript_core::lang::{extends_to_longer_symbol, longest_symbol_prefix};
use gscript_syntax::lexer::{self, Dialect, LexError, Token, TokenKind};

/// Lex `source` and pack the resulting tokens.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn pack_source(source: &str, dialect: &Dialect) -> Result<String, LexError> {
    let tokens = lexer::lex(source, dialect)?;
    Ok(pack_tokens(&tokens))
}

/// Pack an already lexed token sequence.
pub fn pack_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut previous: Option<&Token> = None;

    for token in tokens.iter().filter(|t| !t.is_trivia() && !t.is_eof()) {
        if let Some(left) = previous {
            let adjacent = left.loc.offset + left.text.len() == token.loc.offset;
            if !adjacent && needs_space(left, token) {
                out.push(' ');
            }
        }
        out.push_str(&token.text);
        previous = Some(token);
    }
    out
}

/// Whether gluing `left` and `right` would change how the pair is read.
fn needs_space(left: &Token, right: &Token) -> bool {
    let (Some(last), Some(first)) = (left.text.chars().last(), right.text.chars().next()) else {
        return false;
    };
    let word = |c: char| c.is_alphanumeric() || c == '_';

    if word(last) && word(first) {
        // `wait 1`, `0x1 f`, `a b`
        return true;
    }
    if (last == '.' && first.is_ascii_digit()) || (left.kind == TokenKind::Number && first == '.') {
        return true;
    }
    if left.kind == TokenKind::Symbol && right.kind == TokenKind::Symbol {
        let glued = format!("{}{}", left.text, right.text);
        return glued == "//"
            || glued == "/*"
            || longest_symbol_prefix(&glued) != left.text.chars().count()
            || extends_to_longer_symbol(&glued);
    }
    match (left.symbol(), right.kind) {
        // `&"x"` is a localized string, `%x` a resource variable.
        (Some('&'), TokenKind::String) => true,
        (Some('%'), TokenKind::Identifier) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(source: &str) -> String {
        pack_source(source, &Dialect::default()).unwrap()
    }

    #[test]
    fn test_drops_whitespace_and_comments() {
        let source = "main()\n{\n    // greet\n    a = 1; /* block */ b();\n}\n";
        assert_eq!(pack(source), "main(){a=1;b();}");
    }

    #[test]
    fn test_keeps_space_between_words() {
        assert_eq!(pack("f() { wait 1; return x; self thread g(); }"), "f(){wait 1;return x;self thread g();}");
    }

    #[test]
    fn test_symbol_runs() {
        assert_eq!(pack("a = b - -c;"), "a=b- -c;");
        assert_eq!(pack("a < -1;"), "a<-1;");
        assert_eq!(pack("a < < 1;"), "a< <1;");
        assert_eq!(pack("a <<= 1;"), "a<<=1;");
        assert_eq!(pack("a = b / /* x */ /c;"), "a=b/ /c;");
        assert_eq!(pack("a = b << -c;"), "a=b<<-c;");
    }

    #[test]
    fn test_lexical_merges() {
        assert_eq!(pack("x = & \"HINT\";"), "x=& \"HINT\";");
        assert_eq!(pack("x = &\"HINT\";"), "x=&\"HINT\";");
        assert_eq!(pack("a . 5"), "a. 5");
    }

    #[test]
    fn test_originally_glued_tokens_stay_glued() {
        assert_eq!(pack("i++ ;"), "i++;");
        assert_eq!(pack("[[ f ]]()"), "[[f]]()");
        assert_eq!(pack("a[ [1] ]"), "a[ [1] ]");
    }
}
