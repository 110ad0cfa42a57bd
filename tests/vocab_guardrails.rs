use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use gscript_core::lang::directives::DIRECTIVES;
use gscript_core::lang::keywords::KEYWORDS;
use gscript_core::lang::operators::OPERATORS;

/// Guardrail against reintroducing stringly-typed vocabulary checks.
///
/// This is a **coarse** safety net. It looks for patterns like `== "foreach"`, `"<<=" => ...` or
/// `name.matches("include")` in Rust sources where callers are expected to go through the `gscript_core::lang`
/// registries instead.
///
/// Notes:
/// - Occurrences in `crates/gscript_core/src/lang/**` (the registries themselves) and in test files are allowed.
#[test]
fn no_stringly_vocab_checks_in_rust_sources() {
    let root = repo_root();
    let spellings = vocabulary_spellings();
    let mut offenders: Vec<(PathBuf, usize, String)> = Vec::new();

    for dir in [root.join("src"), root.join("crates")] {
        if dir.exists() {
            scan_dir(&root, &dir, &spellings, &mut offenders);
        }
    }

    if !offenders.is_empty() {
        let mut msg = String::new();
        msg.push_str("Found potential stringly-typed vocabulary checks. Prefer gscript_core registries.\n\n");
        for (path, line_no, line) in offenders.into_iter().take(80) {
            msg.push_str(&format!(
                "- {}:{}: {}\n",
                path.strip_prefix(&root).unwrap_or(&path).display(),
                line_no,
                line.trim()
            ));
        }
        panic!("{msg}");
    }
}

#[test]
fn registries_are_not_empty() {
    assert!(vocabulary_spellings().contains(&"foreach"));
    assert!(vocabulary_spellings().contains(&"<<="));
    assert!(vocabulary_spellings().contains(&"declarative"));
}

#[test]
fn suspicious_patterns() {
    let spellings = vocabulary_spellings();
    assert!(is_suspicious_line(r#"if name.matches("include") {"#, &spellings));
    assert!(is_suspicious_line(r#"    if kw.eq_ignore_ascii_case("ForEach") {"#, &spellings));
    assert!(is_suspicious_line(r#"if text == "foreach" {"#, &spellings));
    assert!(is_suspicious_line(r#""<<=" => OperatorId::ShlEq,"#, &spellings));

    assert!(!is_suspicious_line(r#"// name.matches("include")"#, &spellings));
    assert!(!is_suspicious_line(r#"if name.matches("main") {"#, &spellings));
    assert!(!is_suspicious_line(r#"if directives::from_str(&name.name) == Some(DirectiveId::Include) {"#, &spellings));
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Keyword and directive spellings plus every multi-character operator spelling.
fn vocabulary_spellings() -> Vec<&'static str> {
    let mut set: BTreeSet<&'static str> = BTreeSet::new();
    for k in KEYWORDS {
        set.insert(k.canonical);
    }
    for d in DIRECTIVES {
        set.insert(d.canonical);
    }
    for op in OPERATORS {
        set.extend(op.spellings.iter().copied().filter(|s| s.len() > 1));
    }
    set.into_iter().collect()
}

fn is_allowed_file(root: &Path, path: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path).to_string_lossy();
    if !rel.ends_with(".rs") {
        return true;
    }
    // Registries define the spellings.
    if rel.starts_with("crates/gscript_core/src/lang/") {
        return true;
    }
    // Tests can mention spellings directly.
    rel.contains("/tests/") || rel.ends_with("/tests.rs")
}

fn scan_dir(root: &Path, dir: &Path, spellings: &[&'static str], offenders: &mut Vec<(PathBuf, usize, String)>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_dir(root, &path, spellings, offenders);
            continue;
        }
        if is_allowed_file(root, &path) {
            continue;
        }
        let Ok(contents) = fs::read_to_string(&path) else {
            continue;
        };
        for (idx, line) in contents.lines().enumerate() {
            if is_suspicious_line(line, spellings) {
                offenders.push((path.clone(), idx + 1, line.to_string()));
            }
        }
    }
}

fn is_suspicious_line(line: &str, spellings: &[&'static str]) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") {
        return false;
    }

    // `... == "spelling"`, `"spelling" => ...`, or a case-insensitive identifier comparison.
    let lowered = line.to_ascii_lowercase();
    spellings.iter().any(|s| {
        let eq = format!("== \"{s}\"");
        let arm = format!("\"{s}\" =>");
        let matches = format!(".matches(\"{s}\")");
        let ignore_case = format!(".eq_ignore_ascii_case(\"{s}\")");
        line.contains(&eq) || line.contains(&arm) || lowered.contains(&matches) || lowered.contains(&ignore_case)
    })
}
