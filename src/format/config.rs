//! Formatting configuration for gscript
//!
//! Defaults follow the layout most game script sources already use: Allman braces and 4-space indentation.

use gscript_syntax::lexer::Dialect;
use gscript_syntax::parser::ParserConfig;

/// Formatting configuration
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Number of spaces per indentation level
    pub indent_width: usize,
    /// Where opening braces go
    pub brace_style: BraceStyle,
    /// Number of blank lines between function definitions
    pub blank_lines_between_functions: usize,
    /// Parser settings used to read the source (and to re-read output during verification)
    pub parser: ParserConfig,
}

/// Placement of `{` after a function signature or statement header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BraceStyle {
    /// `{` on its own line.
    #[default]
    NextLine,
    /// `{` at the end of the header line; `} else` shares a line.
    SameLine,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            brace_style: BraceStyle::NextLine,
            blank_lines_between_functions: 1,
            parser: ParserConfig::default(),
        }
    }
}

impl FormatConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation width
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_brace_style(mut self, style: BraceStyle) -> Self {
        self.brace_style = style;
        self
    }

    pub fn with_blank_lines_between_functions(mut self, count: usize) -> Self {
        self.blank_lines_between_functions = count;
        self
    }

    pub fn with_parser_config(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Shorthand for replacing only the dialect of the parser settings.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.parser = self.parser.with_dialect(dialect);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gscript_core::lang::keywords::KeywordSet;

    #[test]
    fn test_default_config() {
        let config = FormatConfig::default();
        assert_eq!(config.indent_width, 4);
        assert_eq!(config.brace_style, BraceStyle::NextLine);
        assert_eq!(config.blank_lines_between_functions, 1);
        assert_eq!(config.parser, ParserConfig::default());
    }

    #[test]
    fn test_builder_chain() {
        let config = FormatConfig::new()
            .with_indent_width(2)
            .with_brace_style(BraceStyle::SameLine)
            .with_blank_lines_between_functions(2);

        assert_eq!(config.indent_width, 2);
        assert_eq!(config.brace_style, BraceStyle::SameLine);
        assert_eq!(config.blank_lines_between_functions, 2);
    }

    #[test]
    fn test_builder_override() {
        let config = FormatConfig::new().with_indent_width(2).with_indent_width(8);
        assert_eq!(config.indent_width, 8); // Last value wins
    }

    #[test]
    fn test_with_dialect_keeps_other_parser_settings() {
        let parser = ParserConfig::new().with_assignment_expressions(true);
        let config = FormatConfig::new()
            .with_parser_config(parser)
            .with_dialect(Dialect::new().with_keyword_set(KeywordSet::Singleplayer));

        assert!(config.parser.allow_assignment_expressions);
        assert_eq!(config.parser.dialect.keyword_set, KeywordSet::Singleplayer);
    }
}
