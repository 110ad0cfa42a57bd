//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use gscript_syntax::diagnostics::{Diagnostic, format_diagnostic};
use gscript_syntax::lexer::{self, Dialect, LexError, Lexer, Token};
use gscript_syntax::parser::{Parser, ParserConfig, StepOutcome};

use crate::format::{FormatConfig, FormatError, describe_divergences, format_diff, format_source_with_config, pack_tokens, verify_round_trip};

use super::{CliError, CliResult, ExitCode};

/// Maximum source file size (16 MB)
const MAX_SOURCE_SIZE: u64 = 16 * 1024 * 1024;

/// Extensions picked up when a directory is given.
const SCRIPT_EXTENSIONS: [&str; 3] = ["gsc", "csc", "gsh"];

/// Read a source file, with a size check.
pub fn read_source(file_path: &Path) -> CliResult<String> {
    let metadata = fs::metadata(file_path)
        .map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", file_path.display(), e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            file_path.display(),
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(file_path)
        .map_err(|e| CliError::failure(format!("Error reading file '{}': {}", file_path.display(), e)))
}

// ============================================================================
// Error rendering
// ============================================================================

fn use_color() -> bool {
    std::io::stderr().is_terminal()
}

/// Render a lexing failure with miette's graphical handler.
fn render_lex_error(file_path: &Path, source: &str, error: LexError) -> String {
    let name = file_path.display().to_string();
    let report = miette::Report::new(error).with_source_code(miette::NamedSource::new(name, source.to_string()));
    format!("{report:?}")
}

fn render_diagnostics(file_path: &Path, source: &str, diagnostics: &[Diagnostic]) -> String {
    let name = file_path.display().to_string();
    let color = use_color();
    diagnostics
        .iter()
        .map(|d| format_diagnostic(&name, source, d, color))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_format_error(file_path: &Path, source: &str, error: FormatError) -> String {
    match error {
        FormatError::Lex(lex) => render_lex_error(file_path, source, lex),
        FormatError::Parse(errors) => render_diagnostics(file_path, source, &errors),
        FormatError::Diverged { stage, divergences } => format!(
            "{}: {} output diverges from the source\n{}",
            file_path.display(),
            stage,
            describe_divergences(&divergences)
        ),
        other => format!("{}: {}", file_path.display(), other),
    }
}

fn lex_source(file_path: &Path, source: &str, dialect: &Dialect) -> CliResult<Vec<Token>> {
    lexer::lex(source, dialect).map_err(|e| CliError::failure(render_lex_error(file_path, source, e)))
}

// ============================================================================
// Commands
// ============================================================================

/// Lex and display tokens.
pub fn lex_file(file_path: &Path, dialect: &Dialect, trivia: bool) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let mut lexer = Lexer::new(&source, *dialect);

    loop {
        match lexer.next_token() {
            Ok(Some(token)) => {
                if trivia || !token.is_trivia() {
                    println!("{:>4}:{:<3} {:<12} {:?}", token.loc.line, token.loc.column, format!("{:?}", token.kind), token.text);
                }
            }
            Ok(None) => break,
            Err(e) => return Err(CliError::failure(render_lex_error(file_path, &source, e))),
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Parse and display the syntax graph, warnings and errors.
pub fn parse_file(file_path: &Path, config: ParserConfig, steps: bool) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let tokens = lex_source(file_path, &source, &config.dialect)?;

    let mut parser = Parser::new(tokens, config);
    let mut count = 0usize;
    if steps {
        while parser.step() == StepOutcome::Continue {
            count += 1;
            tracing::trace!(step = count, progress = parser.progress(), "parser step");
        }
    } else {
        parser.run();
    }
    let output = parser.finish();

    if let Some(syntax) = &output.syntax {
        println!("{:#?}", syntax);
    }
    if steps {
        println!("{count} step(s)");
    }
    if !output.warnings.is_empty() {
        eprintln!("{}", render_diagnostics(file_path, &source, &output.warnings));
    }
    if output.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Err(CliError::failure(render_diagnostics(file_path, &source, &output.errors)))
    }
}

/// Print the packed form of a file.
pub fn pack_file(file_path: &Path, dialect: &Dialect) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let tokens = lex_source(file_path, &source, dialect)?;
    println!("{}", pack_tokens(&tokens));
    Ok(ExitCode::SUCCESS)
}

/// Format files in place, or check / diff them.
pub fn format_files(path: &Path, config: &FormatConfig, check_mode: bool, diff_mode: bool) -> CliResult<ExitCode> {
    let files = collect_script_files(path);
    if files.is_empty() {
        return Err(CliError::failure("No script files found"));
    }

    let mut needs_formatting = false;
    let mut formatted_count = 0;
    let mut error_count = 0;

    for file_path in &files {
        let source = match read_source(file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}", e);
                error_count += 1;
                continue;
            }
        };

        match format_source_with_config(&source, config) {
            Ok(formatted) => {
                let changed = source != formatted;

                if diff_mode && changed {
                    println!("--- {}", file_path.display());
                    if let Ok(Some(diff)) = format_diff(&source, config) {
                        print!("{}", diff);
                    }
                    println!();
                }

                if check_mode {
                    if changed {
                        println!("Would reformat: {}", file_path.display());
                        needs_formatting = true;
                    }
                } else if diff_mode {
                    needs_formatting |= changed;
                } else if changed {
                    if let Err(e) = fs::write(file_path, &formatted) {
                        eprintln!("Error writing {}: {}", file_path.display(), e);
                        error_count += 1;
                    } else {
                        println!("Formatted: {}", file_path.display());
                        formatted_count += 1;
                    }
                }
            }
            Err(e) => {
                eprintln!("{}", render_format_error(file_path, &source, e));
                error_count += 1;
            }
        }
    }

    if check_mode || diff_mode {
        if needs_formatting {
            let msg = if diff_mode { "need formatting" } else { "would be reformatted" };
            return Err(CliError::failure(format!("\n{} file(s) {}", files.len(), msg)));
        }
        println!("✓ {} file(s) already formatted", files.len());
    } else {
        println!("\n✓ {} file(s) formatted, {} error(s)", formatted_count, error_count);
    }

    if error_count > 0 {
        return Err(CliError::new("", ExitCode::FAILURE));
    }
    Ok(ExitCode::SUCCESS)
}

/// Run the round-trip self-check on every script file under `path`.
pub fn verify_files(path: &Path, config: &FormatConfig) -> CliResult<ExitCode> {
    let files = collect_script_files(path);
    if files.is_empty() {
        return Err(CliError::failure("No script files found"));
    }

    let mut failures = 0;
    for file_path in &files {
        let source = read_source(file_path)?;
        match verify_round_trip(&source, config) {
            Ok(_) => tracing::info!(file = %file_path.display(), "round trip ok"),
            Err(e) => {
                eprintln!("{}", render_format_error(file_path, &source, e));
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(CliError::failure(format!("\n{} of {} file(s) failed verification", failures, files.len())));
    }
    println!("✓ {} file(s) round-trip", files.len());
    Ok(ExitCode::SUCCESS)
}

fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}

fn collect_script_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if path.is_file() {
        if is_script(path) {
            files.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        if let Ok(entries) = fs::read_dir(path) {
            for entry in entries.flatten() {
                let entry_path = entry.path();
                if entry_path.is_dir() {
                    let name = entry_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                    if !name.starts_with('.') && name != "target" {
                        files.extend(collect_script_files(&entry_path));
                    }
                } else if is_script(&entry_path) {
                    files.push(entry_path);
                }
            }
        }
    }

    files.sort();
    files
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gscript_cli_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("nested")).unwrap();
        dir
    }

    #[test]
    fn test_collect_script_files_filters_extensions() {
        let dir = scratch_dir("collect");
        fs::write(dir.join("a.gsc"), "").unwrap();
        fs::write(dir.join("nested/b.csc"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        let files = collect_script_files(&dir);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_script(f)));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_format_files_check_mode() {
        let dir = scratch_dir("fmt");
        let file = dir.join("main.gsc");
        fs::write(&file, "main(){wait 1;}").unwrap();
        let config = FormatConfig::default();

        assert!(format_files(&file, &config, true, false).is_err());
        assert_eq!(format_files(&file, &config, false, false).unwrap(), ExitCode::SUCCESS);
        assert_eq!(fs::read_to_string(&file).unwrap(), "main()\n{\n    wait 1;\n}\n");
        assert_eq!(format_files(&file, &config, true, false).unwrap(), ExitCode::SUCCESS);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_verify_files_reports_parse_errors() {
        let dir = scratch_dir("verify");
        fs::write(dir.join("good.gsc"), "main() { a = 1; }").unwrap();
        assert!(verify_files(&dir, &FormatConfig::default()).is_ok());

        fs::write(dir.join("bad.gsc"), "main() { a = ; }").unwrap();
        let err = verify_files(&dir, &FormatConfig::default()).unwrap_err();
        assert!(err.message.contains("1 of 2 file(s) failed verification"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source(Path::new("definitely/not/here.gsc")).unwrap_err();
        assert!(err.message.starts_with("Cannot access file"));
    }
}
