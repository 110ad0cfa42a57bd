//! End-to-end tests for the gscript tooling: lex, parse, format, pack and compare on whole sources.

use gscript::ast::{Expr, Stmt, Syntax};
use gscript::compare::compare;
use gscript::format::{BraceStyle, Stage};
use gscript::lexer::{self, Dialect, LexError};
use gscript::parser::{self, ParseOutput, ParseTarget, ParserConfig};
use gscript::{FormatConfig, FormatError, format_source, format_source_with_config, pack_source, verify_round_trip};

const LEVEL_SCRIPT: &str = r#"#include common_scripts\utility;
#include maps\mp\gametypes\_hud_util;

global round_state;
const ROUNDS = 3;
const HALF = ROUNDS / 2;

init()
{
    level.rounds = [];
    level thread on_player_connect();
}

on_player_connect()
{
    for (;;)
    {
        level waittill("connected", player);
        player thread [[level.on_spawn]](player.origin, (0, 0, 1));
    }
}

score(player, ?bonus)
{
    /* multi-line
       comment */
    total = player.kills * 10 - player.deaths % 2;
    if (isdefined(bonus) && bonus > 0) total += bonus; else if (total < -1) total = 0;
    switch (round_state)
    {
        case "warmup":
        case "post":
            return 0;
        default:
            break;
    }
    foreach (k, v in player.stats) total |= v << 1;
    return total;
}
"#;

fn parse_module(source: &str) -> ParseOutput {
    parser::parse_source(source, ParserConfig::default()).unwrap()
}

fn syntax_of(source: &str, config: ParserConfig) -> Syntax {
    let output = parser::parse_source(source, config).unwrap();
    assert!(output.is_success(), "unexpected errors: {:?}", output.errors);
    output.syntax.unwrap()
}

fn expression(source: &str) -> Expr {
    let syntax = syntax_of(source, ParserConfig::new().with_target(ParseTarget::Expression));
    syntax.as_expression().cloned().unwrap()
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_simple_function_round_trips() {
    let source = "main(){if(a>1)b=2;else b=3;}";
    let trip = verify_round_trip(source, &FormatConfig::default()).unwrap();
    assert_eq!(trip.packed, source);
    insta::assert_snapshot!(trip.formatted, @r"
    main()
    {
        if (a > 1)
            b = 2;
        else
            b = 3;
    }
    ");
}

#[test]
fn test_level_script_round_trips_in_both_brace_styles() {
    for style in [BraceStyle::NextLine, BraceStyle::SameLine] {
        let config = FormatConfig::new().with_brace_style(style);
        let trip = verify_round_trip(LEVEL_SCRIPT, &config).unwrap();
        assert!(!trip.packed.contains('\n'));
        assert!(!trip.packed.contains("comment"));
    }
}

#[test]
fn test_formatting_is_idempotent() {
    let once = format_source(LEVEL_SCRIPT).unwrap();
    let twice = format_source(&once).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_packed_output_parses_to_the_same_graph() {
    let original = parse_module(LEVEL_SCRIPT).syntax.unwrap();
    let packed = pack_source(LEVEL_SCRIPT, &Dialect::default()).unwrap();
    let reparsed = parse_module(&packed).syntax.unwrap();
    assert!(compare(&original, &reparsed).is_empty());
}

#[test]
fn test_comparer_catches_a_changed_operator() {
    let left = syntax_of("main() { a = b + c; }", ParserConfig::default());
    let right = syntax_of("main()\n{\n    a = b - c;\n}\n", ParserConfig::default());
    let divergences = compare(&left, &right);
    assert_eq!(divergences.len(), 1);
    assert_eq!(divergences[0].left, "b + c");
    assert_eq!(divergences[0].right, "b - c");
}

#[test]
fn test_function_target_round_trips() {
    let config = FormatConfig::new().with_parser_config(ParserConfig::new().with_target(ParseTarget::Function));
    let trip = verify_round_trip("f(&a, ...) { a++; }", &config).unwrap();
    assert_eq!(trip.formatted, "f(&a, ...)\n{\n    a++;\n}\n");
    assert_eq!(trip.packed, "f(&a,...){a++;}");
}

#[test]
fn test_assignment_expressions_round_trip_when_enabled() {
    let config = FormatConfig::new().with_parser_config(ParserConfig::new().with_assignment_expressions(true));
    let trip = verify_round_trip("main() { a = b = 1; }", &config).unwrap();
    assert!(trip.formatted.contains("    a = b = 1;\n"));
}

// ============================================================================
// Parsing through the public surface
// ============================================================================

#[test]
fn test_multiplication_binds_tighter() {
    let Expr::Binary(add) = expression("2+3*4") else {
        panic!("expected a binary expression");
    };
    assert_eq!(add.left.to_string(), "2");
    assert_eq!(add.right.to_string(), "3 * 4");
}

#[test]
fn test_chained_assignment_is_fatal_by_default() {
    let output = parse_module("main() { a = b = 1; }");
    assert!(output.halted);
    assert!(output.syntax.is_none());
    assert!(output.errors.iter().any(|d| d.is_fatal()));
    assert!(matches!(format_source("main() { a = b = 1; }"), Err(FormatError::Parse(_))));
}

#[test]
fn test_truple_arity() {
    assert!(matches!(expression("(1, 2, 3)"), Expr::Truple(_)));

    let pair = parser::parse_source("(1, 2)", ParserConfig::new().with_target(ParseTarget::Expression)).unwrap();
    assert!(!pair.is_success());
    assert!(!pair.halted);
}

#[test]
fn test_switch_segments_survive_formatting() {
    let source = "main(){switch(x){case 1:a();case 2:b();break;default:c();}}";
    let formatted = format_source(source).unwrap();
    let syntax = syntax_of(&formatted, ParserConfig::default());
    let body = &syntax.as_module().unwrap().find_function("main").unwrap().body;
    let Some(Stmt::Switch(switch)) = body.as_ref().and_then(|b| b.statements.first()) else {
        panic!("expected a switch");
    };
    let segments: Vec<usize> = switch.segments().map(|(_, stmts)| stmts.len()).collect();
    assert_eq!(segments, [1, 2, 1]);
}

#[test]
fn test_multi_character_operators_follow_adjacency() {
    assert_eq!(expression("a<<1").to_string(), "a << 1");
    assert_eq!(expression("a < -1").to_string(), "a < -1");
    assert_eq!(pack_source("a < -1", &Dialect::default()).unwrap(), "a<-1");
    assert_eq!(pack_source("a <<= 1;", &Dialect::default()).unwrap(), "a<<=1;");

    let separated = parser::parse_source("a < < 1", ParserConfig::new().with_target(ParseTarget::Expression)).unwrap();
    assert!(!separated.is_success());
}

#[test]
fn test_keyword_member_names_round_trip() {
    let source = "main(){x=level.default;self.in=1;}";
    let trip = verify_round_trip(source, &FormatConfig::default()).unwrap();
    assert_eq!(trip.packed, source);
    assert!(trip.formatted.contains("    x = level.default;\n"));
}

// ============================================================================
// Lexing
// ============================================================================

#[test]
fn test_illegal_character_is_fatal() {
    let err = format_source("main() { a = @; }").unwrap_err();
    assert!(matches!(err, FormatError::Lex(LexError::IllegalCharacter { ch: '@', .. })));
}

#[test]
fn test_unknown_characters_as_letters() {
    let dialect = Dialect::new().with_unknown_chars_as_letters(true);
    let tokens = lexer::lex("a@b = 1;", &dialect).unwrap();
    assert!(tokens.iter().any(|t| t.text == "a@b"));
}

#[test]
fn test_hex_literals_can_be_disabled() {
    assert!(lexer::lex("a = 0x1f;", &Dialect::default()).is_ok());
    let dialect = Dialect::new().with_hex_literals(false);
    let packed = pack_source("a = 0x1f;", &dialect).unwrap();
    assert_eq!(packed, "a=0x1f;");
    let reparsed = parser::parse_source("main() { a = 0x1f; }", ParserConfig::new().with_dialect(dialect)).unwrap();
    assert!(!reparsed.is_success());
}

#[test]
fn test_reparse_failure_names_the_stage() {
    let err = FormatError::Reparse { stage: Stage::Packed, message: "unexpected `;`".to_string() };
    assert_eq!(err.to_string(), "packed output does not parse back: unexpected `;`");
}

#[test]
fn test_custom_indent_width() {
    let config = FormatConfig::new().with_indent_width(2);
    assert_eq!(format_source_with_config("f(){g();}", &config).unwrap(), "f()\n{\n  g();\n}\n");
}
