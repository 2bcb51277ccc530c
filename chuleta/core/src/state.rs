//! Application State
//!
//! What the router mutates and the render pipeline reads: the active view, the
//! search term, and the quiz form values.

use serde::{Deserialize, Serialize};

use crate::corpus::QUIZ_SECTION_ID;

/// Smallest question count offered by the quiz form
pub const MIN_QUIZ_COUNT: usize = 5;
/// Largest question count offered by the quiz form
pub const MAX_QUIZ_COUNT: usize = 50;
/// Question count the quiz form starts with
pub const DEFAULT_QUIZ_COUNT: usize = 15;
/// Sections offered as quiz sources by default
pub const DEFAULT_QUIZ_SOURCES: &[&str] = &["vocab", "phrasal", "idioms"];

/// The active view
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    /// All sections, favorites first
    #[default]
    Home,
    /// Only the quiz
    Quiz,
    /// All sections, scrolled to one of them
    Section(String),
}

impl View {
    /// View for a menu entry (`quiz` maps to the quiz view)
    #[must_use]
    pub fn for_menu_entry(id: &str) -> Self {
        if id == QUIZ_SECTION_ID {
            Self::Quiz
        } else {
            Self::Section(id.to_string())
        }
    }

    /// Selected section id, if any
    #[must_use]
    pub fn section_id(&self) -> Option<&str> {
        match self {
            Self::Section(id) => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Quiz => write!(f, "quiz"),
            Self::Section(id) => write!(f, "section:{id}"),
        }
    }
}

/// Application state: created once, mutated only by the router
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// Trimmed search input
    pub search_term: String,
    /// Active view
    pub current_view: View,
}

impl AppState {
    /// Lowercased search term as consumed by the search filter
    #[must_use]
    pub fn query_lower(&self) -> String {
        self.search_term.to_lowercase()
    }
}

/// Current values of the quiz form (source section and question count)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSetup {
    sources: Vec<String>,
    selected: usize,
    count: usize,
}

impl QuizSetup {
    /// Create a form over the given source section ids
    #[must_use]
    pub fn new(sources: Vec<String>, count: usize) -> Self {
        Self {
            sources,
            selected: 0,
            count: count.clamp(MIN_QUIZ_COUNT, MAX_QUIZ_COUNT),
        }
    }

    /// Offered source section ids
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Selected source section id
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.sources.get(self.selected).map(String::as_str)
    }

    /// Question count
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Select the next source, wrapping around
    pub fn cycle_source(&mut self) {
        if !self.sources.is_empty() {
            self.selected = (self.selected + 1) % self.sources.len();
        }
    }

    /// Change the count by `delta`, clamped to the form range
    pub fn adjust_count(&mut self, delta: i32) {
        let next = i64::try_from(self.count).unwrap_or(i64::MAX) + i64::from(delta);
        let clamped = next.clamp(MIN_QUIZ_COUNT as i64, MAX_QUIZ_COUNT as i64);
        self.count = usize::try_from(clamped).unwrap_or(DEFAULT_QUIZ_COUNT);
    }
}

impl Default for QuizSetup {
    fn default() -> Self {
        Self::new(
            DEFAULT_QUIZ_SOURCES.iter().map(|s| (*s).to_string()).collect(),
            DEFAULT_QUIZ_COUNT,
        )
    }
}
