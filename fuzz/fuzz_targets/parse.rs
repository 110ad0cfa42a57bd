#![no_main]

use gscript::lexer::{self, Dialect};
use gscript::parser::{self, ParserConfig};
use gscript::{FormatConfig, FormatError, verify_round_trip};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(tokens) = lexer::lex(s, &Dialect::default()) {
            let output = parser::parse(tokens, ParserConfig::default());
            // Anything that parses cleanly must survive formatting and packing.
            if output.is_success() {
                if let Err(e @ (FormatError::Reparse { .. } | FormatError::Diverged { .. })) =
                    verify_round_trip(s, &FormatConfig::default())
                {
                    panic!("{e}");
                }
            }
        }
    }
});
