//! Presentation Policy
//!
//! Per-section lookup table deciding which columns carry a speak affordance.
//! Adding a section is a data change: extend the table (or the config's
//! `[presentation.speak_columns]`), never the render code.

use std::collections::{HashMap, HashSet};

/// Default speak columns by section id
const DEFAULT_SPEAK_COLUMNS: &[(&str, &[usize])] = &[
    ("verbs_irregular", &[0, 1, 2]),
    ("verbs_regular", &[0, 1]),
    ("prepositions", &[0]),
    ("vocab", &[0]),
    ("phrasal", &[0]),
    ("idioms", &[0]),
    ("adverbs", &[0]),
    ("connectors", &[0]),
    ("false_friends", &[0]),
];

/// Sections whose column 0 is a category label, not a pronounceable term
const DEFAULT_FAVORITES_SILENT: &[&str] = &["adverbs", "connectors"];

/// Speak-affordance policy keyed by section id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresentationPolicy {
    speak_columns: HashMap<String, Vec<usize>>,
    favorites_silent: HashSet<String>,
}

impl Default for PresentationPolicy {
    fn default() -> Self {
        Self {
            speak_columns: DEFAULT_SPEAK_COLUMNS
                .iter()
                .map(|(id, cols)| ((*id).to_string(), cols.to_vec()))
                .collect(),
            favorites_silent: DEFAULT_FAVORITES_SILENT
                .iter()
                .map(|id| (*id).to_string())
                .collect(),
        }
    }
}

impl PresentationPolicy {
    /// Override or add speak columns for section ids
    #[must_use]
    pub fn with_speak_columns<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<usize>)>,
    {
        for (id, mut cols) in overrides {
            cols.sort_unstable();
            cols.dedup();
            self.speak_columns.insert(id, cols);
        }
        self
    }

    /// Replace the set of sections without a speak affordance in the favorites view
    #[must_use]
    pub fn with_favorites_silent<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.favorites_silent = ids.into_iter().collect();
        self
    }

    /// Columns of `section_id` rows that get a speak affordance
    #[must_use]
    pub fn speak_columns(&self, section_id: &str) -> &[usize] {
        self.speak_columns
            .get(section_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether column `col` of `section_id` rows is speakable
    #[must_use]
    pub fn speaks(&self, section_id: &str, col: usize) -> bool {
        self.speak_columns(section_id).contains(&col)
    }

    /// Whether the term of a `section_id` row is speakable in the favorites view
    #[must_use]
    pub fn favorite_term_speaks(&self, section_id: &str) -> bool {
        !self.favorites_silent.contains(section_id)
    }
}
