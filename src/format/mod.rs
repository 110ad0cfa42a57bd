//! gscript code formatter, whitespace packer and round-trip self-check
//!
//! The formatter normalizes layout:
//! - 4-space indentation
//! - braces on their own line (configurable)
//! - spaced binary operators and canonical keyword spellings
//! - root items grouped as imports, globals, constants, functions
//!
//! The packer goes the other way and strips every byte of whitespace and comment the grammar does not need.
//! [`verify_round_trip`] checks both against the structural comparer.

mod config;
mod formatter;
mod pack;
mod verify;
mod writer;

pub use config::{BraceStyle, FormatConfig};
pub use formatter::Formatter;
pub use pack::{pack_source, pack_tokens};
pub use verify::{RoundTrip, Stage, describe_divergences, verify_round_trip};

use gscript_syntax::compare::Divergence;
use gscript_syntax::diagnostics::Diagnostic;
use gscript_syntax::lexer::LexError;
use gscript_syntax::parser;
use thiserror::Error;

/// Why a source could not be formatted or verified.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("source has {} parse error(s)", .0.len())]
    Parse(Vec<Diagnostic>),

    #[error("{stage} output does not parse back: {message}")]
    Reparse { stage: Stage, message: String },

    #[error("{stage} output diverges from the source in {} place(s)", .divergences.len())]
    Diverged { stage: Stage, divergences: Vec<Divergence> },
}

/// Format gscript source code with default settings
pub fn format_source(source: &str) -> Result<String, FormatError> {
    format_source_with_config(source, &FormatConfig::default())
}

/// Format gscript source code with custom configuration
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn format_source_with_config(source: &str, config: &FormatConfig) -> Result<String, FormatError> {
    let output = parser::parse_source(source, config.parser.clone())?;
    let syntax = verify::parsed(output)?;
    Ok(Formatter::new(config).format(&syntax))
}

/// Check if source code is already formatted
pub fn check_formatted(source: &str, config: &FormatConfig) -> Result<bool, FormatError> {
    let formatted = format_source_with_config(source, config)?;
    Ok(source == formatted)
}

/// Line-by-line diff between the source and its formatted form, or `None` when nothing changes.
pub fn format_diff(source: &str, config: &FormatConfig) -> Result<Option<String>, FormatError> {
    let formatted = format_source_with_config(source, config)?;
    if source == formatted {
        return Ok(None);
    }

    let original_lines: Vec<&str> = source.lines().collect();
    let formatted_lines: Vec<&str> = formatted.lines().collect();
    let mut diff = String::new();

    for i in 0..original_lines.len().max(formatted_lines.len()) {
        let orig = original_lines.get(i).copied().unwrap_or_default();
        let fmt = formatted_lines.get(i).copied().unwrap_or_default();
        if orig != fmt {
            if !orig.is_empty() {
                diff.push_str(&format!("-{:4} | {}\n", i + 1, orig));
            }
            if !fmt.is_empty() {
                diff.push_str(&format!("+{:4} | {}\n", i + 1, fmt));
            }
        }
    }
    Ok(Some(diff))
}
