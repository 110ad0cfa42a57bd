//! CLI module for the gscript front end
//!
//! ## Commands
//!
//! - `lex <file>` - Print the token stream
//! - `parse <file>` - Print the syntax graph and diagnostics
//! - `fmt <file|dir>` - Format script files
//! - `pack <file>` - Print the whitespace-packed source
//! - `verify <file|dir>` - Round-trip self-check on every script file
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gscript_core::lang::keywords::KeywordSet;
use gscript_syntax::lexer::Dialect;
use gscript_syntax::parser::{ParseTarget, ParserConfig};

use crate::format::{BraceStyle, FormatConfig};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Front end for the gscript game scripting language
#[derive(Parser, Debug)]
#[command(name = "gscript")]
#[command(version = VERSION)]
#[command(about = "Lex, parse, format and verify gscript sources", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub syntax: SyntaxArgs,
}

/// Dialect and parser switches shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct SyntaxArgs {
    /// Reserve the singleplayer keyword set instead of the multiplayer one
    #[arg(long, global = true)]
    pub singleplayer: bool,
    /// Reject `0x` hexadecimal literals
    #[arg(long, global = true)]
    pub no_hex: bool,
    /// Accept single-quoted strings
    #[arg(long, global = true)]
    pub single_quotes: bool,
    /// Treat unknown characters as identifier letters instead of failing
    #[arg(long, global = true)]
    pub unknown_as_letters: bool,
    /// Accept assignments inside expressions (`a = b = 1`)
    #[arg(long, global = true)]
    pub assignment_expressions: bool,
    /// Accept `default` grouped with `case` labels
    #[arg(long, global = true)]
    pub default_with_case: bool,
    /// Make the first parse error fatal
    #[arg(long, global = true)]
    pub break_on_first_error: bool,
}

impl SyntaxArgs {
    pub fn dialect(&self) -> Dialect {
        let keyword_set = if self.singleplayer {
            KeywordSet::Singleplayer
        } else {
            KeywordSet::Multiplayer
        };
        Dialect::new()
            .with_keyword_set(keyword_set)
            .with_hex_literals(!self.no_hex)
            .with_single_quote_strings(self.single_quotes)
            .with_unknown_chars_as_letters(self.unknown_as_letters)
    }

    pub fn parser_config(&self, target: ParseTarget) -> ParserConfig {
        ParserConfig::new()
            .with_target(target)
            .with_dialect(self.dialect())
            .with_assignment_expressions(self.assignment_expressions)
            .with_default_with_case(self.default_with_case)
            .with_break_on_first_error(self.break_on_first_error)
    }
}

/// What `parse` reads the input as.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetArg {
    #[default]
    Module,
    Function,
    Expression,
}

impl From<TargetArg> for ParseTarget {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Module => ParseTarget::Module,
            TargetArg::Function => ParseTarget::Function,
            TargetArg::Expression => ParseTarget::Expression,
        }
    }
}

/// Layout switches for `fmt` and `verify`.
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Spaces per indentation level
    #[arg(long, value_name = "N", default_value_t = 4)]
    pub indent: usize,
    /// Put `{` at the end of the header line
    #[arg(long)]
    pub same_line_braces: bool,
}

impl LayoutArgs {
    pub fn format_config(&self, syntax: &SyntaxArgs) -> FormatConfig {
        let brace_style = if self.same_line_braces {
            BraceStyle::SameLine
        } else {
            BraceStyle::NextLine
        };
        FormatConfig::new()
            .with_indent_width(self.indent)
            .with_brace_style(brace_style)
            .with_parser_config(syntax.parser_config(ParseTarget::Module))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the token stream
    Lex {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Include whitespace and comment tokens
        #[arg(long)]
        trivia: bool,
    },

    /// Print the syntax graph and diagnostics
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Read the input as a module, a single function or a single expression
        #[arg(long, value_enum, default_value_t = TargetArg::Module)]
        target: TargetArg,
        /// Drive the parser one token at a time and report the step count
        #[arg(long)]
        steps: bool,
    },

    /// Format script files
    Fmt {
        /// File or directory to format
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
        /// Show diff of formatting changes
        #[arg(long)]
        diff: bool,
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Print the whitespace-packed source
    Pack {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Check that formatting and packing preserve the syntax graph
    Verify {
        /// File or directory to verify
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,
        #[command(flatten)]
        layout: LayoutArgs,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let syntax = cli.syntax;
    match cli.command {
        Command::Lex { file, trivia } => commands::lex_file(&file, &syntax.dialect(), trivia),
        Command::Parse { file, target, steps } => commands::parse_file(&file, syntax.parser_config(target.into()), steps),
        Command::Fmt {
            path,
            check,
            diff,
            layout,
        } => commands::format_files(&path, &layout.format_config(&syntax), check, diff),
        Command::Pack { file } => commands::pack_file(&file, &syntax.dialect()),
        Command::Verify { path, layout } => commands::verify_files(&path, &layout.format_config(&syntax)),
    }
}

// ============================================================================
// Tests
// ============================================================================
