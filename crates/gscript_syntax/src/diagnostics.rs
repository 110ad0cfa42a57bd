//! Diagnostics and error reporting for gscript.
//!
//! Parser diagnostics are plain values accumulated in order; the caller decides how to show them. Two renderings
//! are provided: [`format_diagnostic`] (source line, gutter and caret) and the [`miette::Diagnostic`] implementation
//! for graphical reports.

use std::fmt;

use miette::{LabeledSpan, SourceSpan};
use thiserror::Error;

use crate::ast::Location;

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Advisory; parsing continues and the session can still succeed.
    Warning,
    /// The current construct is untrustworthy; parsing continues but the session is unsuccessful.
    Error,
    /// The session halts.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal error"),
        }
    }
}

/// A located parser diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Diagnostic {
    pub message: String,
    pub location: Location,
    /// Length in bytes of the offending text, for underlining. At least 1 when rendered.
    pub len: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
            len: 1,
            severity,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn warning(message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Warning, message, location)
    }

    pub fn error(message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Error, message, location)
    }

    pub fn fatal(message: impl Into<String>, location: Location) -> Self {
        Self::new(Severity::Fatal, message, location)
    }

    pub fn with_len(mut self, len: usize) -> Self {
        self.len = len;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl From<Location> for SourceSpan {
    fn from(loc: Location) -> Self {
        SourceSpan::new(loc.offset.into(), 1)
    }
}

impl miette::Diagnostic for Diagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(match self.severity {
            Severity::Warning => "gscript::parse::warning",
            Severity::Error => "gscript::parse::error",
            Severity::Fatal => "gscript::parse::fatal",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Warning => miette::Severity::Warning,
            Severity::Error | Severity::Fatal => miette::Severity::Error,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.hints.is_empty() {
            None
        } else {
            Some(Box::new(self.hints.join("\n")))
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = SourceSpan::new(self.location.offset.into(), self.len.max(1));
        let label = match self.notes.first() {
            Some(note) => note.clone(),
            None => format!("{} here", self.severity),
        };
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(Some(label), span))))
    }
}

/// Render a diagnostic with source context.
///
/// ## Parameters
/// - `file_name`: shown in the `-->` location line.
/// - `source`: the full text the diagnostic's location points into.
/// - `color`: emit ANSI color codes.
///
/// ## Examples
///
/// ```text
/// error: expression `a + b` has no effect
///   --> main.gsc:2:5
///     |
///   2 |     a + b;
///     |     ^^^^^
///   = hint: only assignments, calls and `++`/`--` can stand alone
/// ```
pub fn format_diagnostic(file_name: &str, source: &str, diagnostic: &Diagnostic, color: bool) -> String {
    use std::fmt::Write;

    let (line_num, col_num, line_text) = get_line_info(source, diagnostic.location.offset);

    let paint = |code: &'static str| if color { code } else { "" };
    let red = paint("\x1b[31m");
    let cyan = paint("\x1b[36m");
    let yellow = paint("\x1b[33m");
    let bold = paint("\x1b[1m");
    let reset = paint("\x1b[0m");

    let kind_color = match diagnostic.severity {
        Severity::Error | Severity::Fatal => red,
        Severity::Warning => yellow,
    };

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "{bold}{kind_color}{kind}{reset}{bold}: {message}{reset}",
        kind = diagnostic.severity,
        message = diagnostic.message,
    );
    let _ = writeln!(out, "  {cyan}-->{reset} {file_name}:{line_num}:{col_num}");

    let width = line_num.to_string().len();
    let _ = writeln!(out, "  {cyan}{:>width$} |{reset}", "");
    let _ = writeln!(out, "  {cyan}{line_num:>width$} |{reset} {line_text}");

    let prefix: String = line_text
        .chars()
        .take(col_num.saturating_sub(1))
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    let remaining = line_text.chars().count().saturating_sub(col_num.saturating_sub(1));
    let underline = diagnostic.len.min(remaining).max(1);
    let _ = writeln!(
        out,
        "  {cyan}{:>width$} |{reset} {prefix}{kind_color}{}{reset}",
        "",
        "^".repeat(underline)
    );

    for note in &diagnostic.notes {
        let _ = writeln!(out, "  {cyan}= note:{reset} {note}");
    }
    for hint in &diagnostic.hints {
        let _ = writeln!(out, "  {cyan}= hint:{reset} {hint}");
    }
    out
}

/// Get line number, column number (in characters), and line text for a byte offset.
fn get_line_info(source: &str, offset: usize) -> (usize, usize, &str) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_num = source[..line_start].matches('\n').count() + 1;
    let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |i| line_start + i);

    let line_text = source[line_start..line_end].trim_end_matches('\r');
    let col_num = source[line_start..offset].chars().count() + 1;

    (line_num, col_num, line_text)
}

// ============================================================================
// Catalog: recurring parser diagnostics
// ============================================================================

/// Constructors for diagnostics raised from more than one place in the parser.
pub mod errors {
    use super::*;

    pub fn unexpected(found: &str, expected: &str, loc: Location) -> Diagnostic {
        Diagnostic::error(format!("unexpected {found}, expected {expected}"), loc)
    }

    pub fn missing_semicolon(loc: Location) -> Diagnostic {
        Diagnostic::error("expected `;`", loc).with_hint("statements end with `;`")
    }

    pub fn no_effect(expr: &str, loc: Location) -> Diagnostic {
        Diagnostic::error(format!("expression `{expr}` has no effect"), loc)
            .with_len(expr.len())
            .with_hint("only assignments, calls and `++`/`--` can stand alone")
    }

    pub fn not_assignable(expr: &str, loc: Location) -> Diagnostic {
        Diagnostic::error(format!("cannot assign to `{expr}`"), loc)
            .with_len(expr.len())
            .with_note("only variables, indexers and member accesses can be assigned")
    }

    pub fn assignment_expression(loc: Location) -> Diagnostic {
        Diagnostic::fatal("assignment used as an expression", loc)
            .with_hint("split the assignment into its own statement")
            .with_note("enable `allow_assignment_expressions` to accept chained assignments")
    }

    pub fn unbalanced_braces(loc: Location) -> Diagnostic {
        Diagnostic::fatal("unexpected end of input: unbalanced braces", loc).with_hint("add the missing `}`")
    }

    pub fn truple_overflow(loc: Location) -> Diagnostic {
        Diagnostic::fatal("a truple takes exactly three items", loc)
    }

    pub fn stray_semicolon(loc: Location) -> Diagnostic {
        Diagnostic::warning("stray `;`", loc).with_hint("remove the empty statement")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_info_counts_characters() {
        let source = "a\nbé = @;\n";
        let offset = source.find('@').unwrap();
        assert_eq!(get_line_info(source, offset), (2, 6, "bé = @;"));
        assert_eq!(get_line_info(source, 0), (1, 1, "a"));
        assert_eq!(get_line_info(source, 999), (3, 1, ""));
    }

    #[test]
    fn formats_with_context() {
        let source = "main()\n{\n    a + b;\n}\n";
        let offset = source.find("a +").unwrap();
        let diagnostic = errors::no_effect("a + b", Location::new(3, 5, offset));
        let text = format_diagnostic("main.gsc", source, &diagnostic, false);
        let expected = "\
error: expression `a + b` has no effect
  --> main.gsc:3:5
    |
  3 |     a + b;
    |     ^^^^^
  = hint: only assignments, calls and `++`/`--` can stand alone
";
        assert_eq!(text, expected);
    }

    #[test]
    fn severity_ordering_and_display() {
        assert!(Severity::Fatal > Severity::Error);
        assert_eq!(Severity::Fatal.to_string(), "fatal error");
        assert!(errors::unbalanced_braces(Location::default()).is_fatal());
        assert!(!errors::stray_semicolon(Location::default()).is_fatal());
    }

    #[test]
    fn miette_view() {
        use miette::Diagnostic as _;

        let diagnostic = Diagnostic::warning("empty switch", Location::new(1, 1, 4)).with_hint("add a case");
        assert_eq!(diagnostic.severity(), Some(miette::Severity::Warning));
        assert_eq!(diagnostic.help().map(|h| h.to_string()), Some("add a case".to_string()));
        let labels: Vec<_> = diagnostic.labels().unwrap().collect();
        assert_eq!(labels[0].offset(), 4);
    }
}
