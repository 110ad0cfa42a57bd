//! Line-oriented output buffer with indentation and brace placement

use super::config::{BraceStyle, FormatConfig};

/// Builds formatted output one line at a time.
///
/// Indentation is applied lazily, on the first write of each line, so callers never emit leading spaces themselves.
/// A line may be left open (for `} else` on one line); [`FormatWriter::end_line`] closes it when needed.
pub struct FormatWriter {
    output: String,
    depth: usize,
    indent_width: usize,
    brace_style: BraceStyle,
    /// No text has been written on the current line yet.
    at_line_start: bool,
}

impl FormatWriter {
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            output: String::new(),
            depth: 0,
            indent_width: config.indent_width,
            brace_style: config.brace_style,
            at_line_start: true,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    pub fn brace_style(&self) -> BraceStyle {
        self.brace_style
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Append to the current line. Empty text writes nothing, not even indentation.
    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start {
            self.output.extend(std::iter::repeat_n(' ', self.depth * self.indent_width));
            self.at_line_start = false;
        }
        self.output.push_str(text);
    }

    pub fn writeln(&mut self, text: &str) {
        self.write(text);
        self.newline();
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }

    /// Terminate the current line if anything was written on it.
    pub fn end_line(&mut self) {
        if !self.at_line_start {
            self.newline();
        }
    }

    /// End the current line, then emit `count` empty lines.
    pub fn blank_lines(&mut self, count: usize) {
        self.end_line();
        for _ in 0..count {
            self.newline();
        }
    }

    /// Place `{` after the header on the current line and indent the block body.
    pub fn open_block(&mut self) {
        match self.brace_style {
            BraceStyle::NextLine => {
                self.end_line();
                self.writeln("{");
            }
            BraceStyle::SameLine => self.writeln(" {"),
        }
        self.indent();
    }

    /// Dedent and write `}`, leaving the line open.
    pub fn close_block(&mut self) {
        self.dedent();
        self.write("}");
    }

    #[cfg(test)]
    fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.depth
    }
}
