//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The core crate never imports a terminal UI crate
//! - Core production code propagates errors instead of panicking
//!
//! These tests are designed to catch violations early in the development cycle.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A source line that breaks a rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.path.display(), self.line, self.text)
    }
}

/// Workspace root (two levels above this package)
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Every `.rs` file under `dir`
#[must_use]
pub fn rust_sources(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Lines of production code, i.e. everything before the first `#[cfg(test)]`
fn production_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .map(|(i, line)| (i + 1, line))
}

/// Production lines under `dir` matching `predicate`, comments excluded
pub fn scan(dir: &Path, predicate: impl Fn(&str) -> bool) -> Vec<Violation> {
    let mut violations = Vec::new();
    for path in rust_sources(dir) {
        let Ok(source) = fs::read_to_string(&path) else {
            continue;
        };
        for (line, text) in production_lines(&source) {
            let trimmed = text.trim();
            if trimmed.starts_with("//") {
                continue;
            }
            if predicate(trimmed) {
                violations.push(Violation {
                    path: path.clone(),
                    line,
                    text: trimmed.to_string(),
                });
            }
        }
    }
    violations
}

/// Whether `line` refers to one of `crates` by path
#[must_use]
pub fn mentions_crate(line: &str, crates: &[&str]) -> bool {
    crates.iter().any(|name| {
        line.contains(&format!("{name}::")) || line.contains(&format!("extern crate {name}"))
    })
}

/// Whether `line` panics on a `None`/`Err`
#[must_use]
pub fn panics_on_failure(line: &str) -> bool {
    line.contains(".unwrap()") || line.contains(".expect(")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions_crate() {
        assert!(mentions_crate("use ratatui::style::Color;", &["ratatui"]));
        assert!(mentions_crate("let s = crossterm::terminal::size();", &["crossterm"]));
        assert!(!mentions_crate("// terminal-free", &["ratatui"]));
    }

    #[test]
    fn test_panics_on_failure() {
        assert!(panics_on_failure("let x = y.unwrap();"));
        assert!(panics_on_failure("let x = y.expect(\"set\");"));
        assert!(!panics_on_failure("let x = y.unwrap_or_default();"));
    }

    #[test]
    fn test_production_lines_stop_at_tests() {
        let source = "fn a() {}\n#[cfg(test)]\nmod tests {}\n";
        let lines: Vec<_> = production_lines(source).collect();
        assert_eq!(lines, vec![(1, "fn a() {}")]);
    }
}
