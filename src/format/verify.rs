//! Round-trip self-check: formatted and packed output must parse back to the same syntax graph.

use std::fmt;

use gscript_syntax::ast::Syntax;
use gscript_syntax::compare::{Divergence, compare};
use gscript_syntax::lexer;
use gscript_syntax::parser::{self, ParseOutput, ParserConfig};

use super::config::FormatConfig;
use super::formatter::Formatter;
use super::FormatError;
use super::pack::pack_tokens;

/// Which re-serialization is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Formatted,
    Packed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Formatted => "formatted",
            Stage::Packed => "packed",
        })
    }
}

/// Both re-serializations of a source that survived the check.
#[derive(Debug, Clone)]
pub struct RoundTrip {
    pub formatted: String,
    pub packed: String,
}

/// Parse `source`, format and pack it, then re-parse both outputs and compare each against the original graph.
///
/// ## Errors
/// - [`FormatError::Lex`] / [`FormatError::Parse`] when `source` itself does not parse.
/// - [`FormatError::Reparse`] when an output no longer lexes or parses.
/// - [`FormatError::Diverged`] when an output parses to a structurally different graph.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn verify_round_trip(source: &str, config: &FormatConfig) -> Result<RoundTrip, FormatError> {
    let tokens = lexer::lex(source, &config.parser.dialect)?;
    let packed = pack_tokens(&tokens);
    let original = parsed(parser::parse(tokens, config.parser.clone()))?;
    let formatted = Formatter::new(config).format(&original);

    for (stage, text) in [(Stage::Formatted, &formatted), (Stage::Packed, &packed)] {
        let reparsed = reparse(stage, text, &config.parser)?;
        let divergences = compare(&original, &reparsed);
        if !divergences.is_empty() {
            tracing::warn!(%stage, count = divergences.len(), "round trip diverged");
            return Err(FormatError::Diverged { stage, divergences });
        }
        tracing::debug!(%stage, "round trip ok");
    }
    Ok(RoundTrip { formatted, packed })
}

/// The graph of a successful parse, or its errors.
pub(super) fn parsed(output: ParseOutput) -> Result<Syntax, FormatError> {
    match output.syntax {
        Some(syntax) if output.errors.is_empty() => Ok(syntax),
        _ => Err(FormatError::Parse(output.errors)),
    }
}

fn reparse(stage: Stage, text: &str, config: &ParserConfig) -> Result<Syntax, FormatError> {
    let reparse_error = |message: String| FormatError::Reparse { stage, message };
    let output = parser::parse_source(text, config.clone()).map_err(|e| reparse_error(e.to_string()))?;
    match parsed(output) {
        Ok(syntax) => Ok(syntax),
        Err(FormatError::Parse(errors)) => {
            let first = errors.first().map_or_else(|| "no output".to_string(), |d| format!("{} at {}", d.message, d.location));
            Err(reparse_error(first))
        }
        Err(other) => Err(other),
    }
}

/// Divergences rendered one per line, for CLI output.
pub fn describe_divergences(divergences: &[Divergence]) -> String {
    divergences.iter().map(|d| format!("  {d}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::BraceStyle;

    const SCRIPT: &str = r#"#include maps\mp\_utility;

const MAX = 4 * 2;
global level_state;

main()
{
    // spawn loop
    for (i = 0; i < MAX; i++)
    {
        if (i % 2 == 0) self thread spawn_one(i, &"SPAWNED"); else continue;
    }
    foreach (k, v in level.players) { v.health -= -1; }
    switch (level_state) { case "idle": case "wait": wait .5; break; default: [[level.cb]](self); }
    x = ::helper;
    a = (1, 2, 3);
    b = [];
    while (!done) waittillframeend;
}

helper(&a, ?b, ...)
{
    return a[b] + maps\mp\_utility::get(a << 2, -b);
}
"#;

    #[test]
    fn test_script_round_trips() {
        let trip = verify_round_trip(SCRIPT, &FormatConfig::default()).unwrap();
        assert!(trip.packed.starts_with("#include maps\\mp\\_utility;const MAX=4*2;"));
        assert!(trip.formatted.contains("\n    foreach (k, v in level.players)\n"));
    }

    #[test]
    fn test_round_trip_with_same_line_braces() {
        let config = FormatConfig::new().with_brace_style(BraceStyle::SameLine);
        assert!(verify_round_trip(SCRIPT, &config).is_ok());
    }

    #[test]
    fn test_invalid_source_is_a_parse_error() {
        let err = verify_round_trip("main() { a + ; }", &FormatConfig::default()).unwrap_err();
        assert!(matches!(err, FormatError::Parse(ref errors) if !errors.is_empty()));
    }

    #[test]
    fn test_lex_error_propagates() {
        let err = verify_round_trip("main() { a = \"open; }", &FormatConfig::default()).unwrap_err();
        assert!(matches!(err, FormatError::Lex(_)));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Formatted.to_string(), "formatted");
        assert_eq!(Stage::Packed.to_string(), "packed");
    }
}
