//! Boundaries of the headless core crate

use architectural_enforcement::{mentions_crate, panics_on_failure, scan, workspace_root};

const UI_CRATES: &[&str] = &["ratatui", "crossterm"];

fn core_src() -> std::path::PathBuf {
    workspace_root().join("chuleta").join("core").join("src")
}

#[test]
fn test_core_has_no_terminal_ui_imports() {
    let violations = scan(&core_src(), |line| mentions_crate(line, UI_CRATES));
    assert!(
        violations.is_empty(),
        "core must stay UI-agnostic:\n{}",
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );
}

#[test]
fn test_core_production_code_does_not_panic_on_errors() {
    let violations = scan(&core_src(), panics_on_failure);
    assert!(
        violations.is_empty(),
        "propagate errors instead:\n{}",
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );
}

#[test]
fn test_core_sources_found() {
    assert!(!architectural_enforcement::rust_sources(&core_src()).is_empty());
}
