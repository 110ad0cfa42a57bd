//! Layering guardrails to keep the syntax crate reusable on its own.
//!
//! `gscript_syntax` is consumed by the formatter, the CLI and external analyzers. It must not depend on the tooling
//! crate (`gscript`) or pull in CLI-only crates. This test scans its manifest's `[dependencies]` table.

const FORBIDDEN: [&str; 3] = ["gscript ", "gscript=", "clap"];

#[test]
fn syntax_crate_does_not_depend_on_tooling() {
    let manifest = include_str!("../crates/gscript_syntax/Cargo.toml");
    let mut in_dependencies = false;

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        for name in FORBIDDEN {
            assert!(
                !line_no_comment.starts_with(name),
                "`{}` must not appear in gscript_syntax [dependencies]",
                name.trim_end_matches([' ', '='])
            );
        }
    }
}
