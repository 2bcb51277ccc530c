//! App Tests
//!
//! Drive the [`App`] with synthetic key events against a viewer backed by an
//! in-memory store and a silent speech engine. No terminal is involved.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;

use chuleta_core::corpus::QUIZ_SECTION_ID;
use chuleta_core::{
    Corpus, Intent, MemoryStore, NoticeLevel, QuizPhase, Row, RowId, Section, SpeechEngine,
    SpeechError, Utterance, View, Viewer, ViewerConfig, Voice,
};
use chuleta_tui::app::InputMode;
use chuleta_tui::display::layout;
use chuleta_tui::App;

// ============================================================================
// Helpers
// ============================================================================

struct SilentEngine;

impl SpeechEngine for SilentEngine {
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(&mut self, _utterance: &Utterance) -> Result<(), SpeechError> {
        Ok(())
    }

    fn cancel(&mut self) {}
}

fn corpus() -> Corpus {
    Corpus::new(vec![
        Section::new("verbs_irregular", "Irregular verbs")
            .with_headers(["Base", "Past", "Participle"])
            .with_rows(vec![
                Row::heading("Movement"),
                Row::data(["go", "went", "gone"]),
            ]),
        Section::new("vocab", "Vocabulary")
            .with_headers(["English", "Spanish"])
            .with_rows(vec![Row::data(["dog", "perro"]), Row::data(["cat", "gato"])]),
        Section::new(QUIZ_SECTION_ID, "Quiz"),
    ])
    .expect("valid corpus")
}

fn viewer() -> Viewer {
    Viewer::new(
        corpus(),
        MemoryStore::new().shared(),
        Box::new(SilentEngine),
        &ViewerConfig::default(),
    )
}

fn app() -> App {
    App::new(viewer(), (100, 40))
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }
}

fn go_row() -> RowId {
    RowId::derive(
        "verbs_irregular",
        &["go".to_string(), "went".to_string(), "gone".to_string()],
    )
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_layout_home_lists_tables_with_anchors() {
    let viewer = viewer();
    let doc = layout(viewer.tree(), 60);
    let lines = doc.plain_lines();

    assert_eq!(doc.anchor_line("verbs_irregular"), Some(0));
    assert_eq!(lines[0], "Irregular verbs");
    assert!(lines[1].contains("Base"));
    assert!(lines[2].starts_with("── Movement "));

    let vocab = doc.anchor_line("vocab").expect("vocab anchor");
    assert_eq!(lines[vocab], "Vocabulary");
    assert!(doc.anchor_line(QUIZ_SECTION_ID).is_none());
}

#[test]
fn test_layout_targets_carry_tree_intents() {
    let viewer = viewer();
    let doc = layout(viewer.tree(), 60);

    assert_eq!(doc.targets[0].intent, Intent::ToggleFavorite(go_row()));
    assert_eq!(doc.targets[0].line, 3);
    for target in &doc.targets {
        assert!(viewer.tree().contains(&target.intent));
    }
}

// ============================================================================
// Key handling
// ============================================================================

#[test]
fn test_first_target_is_focused_on_start() {
    let app = app();
    assert_eq!(app.focused_intent(), Some(&Intent::ToggleFavorite(go_row())));
    assert_eq!(app.mode(), InputMode::Browse);
}

#[test]
fn test_enter_toggles_favorite_and_shows_block() {
    let mut app = app();
    app.handle_key(key(KeyCode::Enter));

    assert!(app.viewer().favorites().is_favorite(&go_row()));
    assert_eq!(app.document().plain_lines()[0], "★ Favorites");

    app.handle_key(key(KeyCode::Enter));
    assert!(app.viewer().favorites().is_empty());
}

#[test]
fn test_tab_cycles_focus() {
    let mut app = app();
    let total = app.document().targets.len();
    let first = app.focused_intent().cloned();

    for _ in 0..total {
        app.handle_key(key(KeyCode::Tab));
    }
    assert_eq!(app.focused_intent().cloned(), first);

    app.handle_key(key(KeyCode::BackTab));
    assert_eq!(
        app.focused_intent(),
        app.document().targets.last().map(|t| &t.intent)
    );
}

#[test]
fn test_search_filters_live_and_escape_clears() {
    let mut app = app();
    app.handle_key(key(KeyCode::Char('/')));
    assert_eq!(app.mode(), InputMode::Search);

    type_text(&mut app, "gato");
    assert_eq!(app.input(), "gato");
    let lines = app.document().plain_lines();
    assert!(lines.iter().any(|l| l.contains("gato")));
    assert!(!lines.iter().any(|l| l.contains("perro")));

    app.handle_key(key(KeyCode::Esc));
    assert_eq!(app.mode(), InputMode::Browse);
    assert_eq!(app.viewer().state().search_term, "");
    assert!(app.document().plain_lines().iter().any(|l| l.contains("perro")));
}

#[test]
fn test_section_navigation_scrolls_to_anchor() {
    let mut app = App::new(viewer(), (100, 3));
    app.handle_key(key(KeyCode::Char('n')));
    app.handle_key(key(KeyCode::Char('n')));

    assert_eq!(
        app.viewer().state().current_view,
        View::Section("vocab".to_string())
    );
    let anchor = app.document().anchor_line("vocab").expect("vocab anchor");
    assert_eq!(app.scroll_offset(), anchor);
}

#[test]
fn test_quiz_flow_through_keys() {
    let mut app = app();
    app.handle_key(key(KeyCode::Char('z')));
    assert_eq!(app.viewer().state().current_view, View::Quiz);
    assert_eq!(app.focused_intent(), Some(&Intent::QuizStart));

    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.viewer().quiz().phase(), QuizPhase::Active);

    app.handle_key(key(KeyCode::Char('a')));
    assert_eq!(app.mode(), InputMode::Answer);

    let solution = app.viewer().quiz().solution().expect("question").to_string();
    type_text(&mut app, &solution);
    app.handle_key(key(KeyCode::Enter));

    let feedback = app
        .viewer()
        .tree()
        .quiz()
        .and_then(|q| q.feedback.clone())
        .expect("feedback shown");
    assert!(feedback.ok);
    assert_eq!(app.viewer().quiz().phase(), QuizPhase::Answered);
}

#[test]
fn test_import_requires_a_section_view() {
    let mut app = app();
    app.handle_key(key(KeyCode::Char('i')));

    assert_eq!(app.mode(), InputMode::Browse);
    assert_eq!(app.status().map(|n| n.level), Some(NoticeLevel::Warning));
}

#[test]
fn test_ctrl_c_quits_from_any_mode() {
    let mut app = app();
    app.handle_key(key(KeyCode::Char('/')));
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(!app.is_running());
}
