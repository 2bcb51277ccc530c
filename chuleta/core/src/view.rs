//! View Tree
//!
//! The complete visible content produced by the render pipeline. Surfaces
//! draw it as-is; every activatable element carries an [`Intent`] marker that
//! the router dispatches on.
//!
//! # Design Philosophy
//!
//! The tree is rebuilt from scratch on every state change and replaces the
//! previous one wholesale. Nothing in it is patched incrementally, so a
//! surface may hold on to a tree only until the next render.

use serde::{Deserialize, Serialize};

use crate::corpus::RowId;
use crate::quiz::{Feedback, QuizPhase};
use crate::state::View;

/// Marker on an activatable element telling the router what to do
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Flip a row's favorite membership
    ToggleFavorite(RowId),
    /// Pronounce a literal text
    Speak(String),
    /// Start a quiz with the current form values
    QuizStart,
    /// Check the typed answer
    QuizCheck,
    /// Advance to the next question
    QuizNext,
    /// Pronounce the current question's answer
    QuizSpeakSolution,
    /// Switch to another view
    Navigate(View),
}

/// The root of the rendered content
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewTree {
    /// Navigation menu entries in corpus order
    pub nav: Vec<NavEntry>,
    /// Main content
    pub body: Body,
}

impl ViewTree {
    /// Every intent in the tree, in display order
    #[must_use]
    pub fn intents(&self) -> Vec<&Intent> {
        let mut out: Vec<&Intent> = self.nav.iter().map(|n| &n.intent).collect();
        match &self.body {
            Body::Reference(reference) => {
                if let Some(favorites) = &reference.favorites {
                    for entry in &favorites.entries {
                        out.extend(entry.term.speak.as_ref());
                        out.push(&entry.favorite.intent);
                    }
                }
                for table in &reference.tables {
                    for row in &table.rows {
                        if let TableRow::Entry(entry) = row {
                            out.extend(entry.cells.iter().filter_map(|c| c.speak.as_ref()));
                            out.push(&entry.favorite.intent);
                        }
                    }
                }
            }
            Body::Quiz(quiz) => out.extend(quiz.controls.iter().map(|c| &c.intent)),
        }
        out
    }

    /// Whether `intent` is carried by some element of this tree
    #[must_use]
    pub fn contains(&self, intent: &Intent) -> bool {
        self.intents().into_iter().any(|i| i == intent)
    }

    /// The reference body, if this is not the quiz view
    #[must_use]
    pub fn reference(&self) -> Option<&ReferenceBody> {
        match &self.body {
            Body::Reference(reference) => Some(reference),
            Body::Quiz(_) => None,
        }
    }

    /// The quiz body, if this is the quiz view
    #[must_use]
    pub fn quiz(&self) -> Option<&QuizBlock> {
        match &self.body {
            Body::Quiz(quiz) => Some(quiz),
            Body::Reference(_) => None,
        }
    }
}

/// A navigation menu entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavEntry {
    /// Section id (or `quiz`)
    pub id: String,
    /// Display title
    pub title: String,
    /// Whether this entry is the active view
    pub active: bool,
    /// Navigation target
    pub intent: Intent,
}

/// Main content of the tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    /// Favorites plus every section table
    Reference(ReferenceBody),
    /// Only the quiz
    Quiz(QuizBlock),
}

/// Favorites block and section tables
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceBody {
    /// Aggregated favorites (absent when nothing is favorited)
    pub favorites: Option<FavoritesBlock>,
    /// One table per non-quiz section, in corpus order
    pub tables: Vec<TableBlock>,
    /// Section id the surface should scroll to
    pub anchor: Option<String>,
}

impl ReferenceBody {
    /// Table of a given section
    #[must_use]
    pub fn table(&self, section_id: &str) -> Option<&TableBlock> {
        self.tables.iter().find(|t| t.anchor == section_id)
    }
}

/// A rendered section
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableBlock {
    /// Section id, used as scroll anchor
    pub anchor: String,
    /// Section title
    pub title: String,
    /// Optional note
    pub note: Option<String>,
    /// Column headers (the trailing favorite column is implicit)
    pub headers: Vec<String>,
    /// Visible rows
    pub rows: Vec<TableRow>,
}

/// A rendered table row
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableRow {
    /// Sub-heading spanning `span` columns
    Subheading {
        /// Heading label
        text: String,
        /// Columns spanned (headers plus the favorite column)
        span: usize,
    },
    /// A data row
    Entry(EntryRow),
}

/// A rendered data row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryRow {
    /// Cells in column order
    pub cells: Vec<Cell>,
    /// Trailing favorite toggle
    pub favorite: FavoriteToggle,
}

/// A cell with an optional speak affordance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Cell text
    pub text: String,
    /// `Intent::Speak` when the column is speakable
    pub speak: Option<Intent>,
}

impl Cell {
    /// Plain cell
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speak: None,
        }
    }

    /// Cell with a speak affordance for its own text
    pub fn speakable(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            speak: Some(Intent::Speak(text.clone())),
            text,
        }
    }
}

/// Favorite toggle tagged with a row identity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FavoriteToggle {
    /// Row identity
    pub id: RowId,
    /// Whether the row is currently favorited
    pub active: bool,
    /// `Intent::ToggleFavorite(id)`
    pub intent: Intent,
}

impl FavoriteToggle {
    /// Create a toggle for `id`
    #[must_use]
    pub fn new(id: RowId, active: bool) -> Self {
        Self {
            intent: Intent::ToggleFavorite(id.clone()),
            id,
            active,
        }
    }
}

/// The aggregated favorites view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FavoritesBlock {
    /// Column headers
    pub headers: Vec<String>,
    /// Favorited rows in corpus order
    pub entries: Vec<FavoriteEntry>,
}

/// A favorited row in the aggregated view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FavoriteEntry {
    /// Column 0, speakable unless the section is a category list
    pub term: Cell,
    /// Remaining cells joined with ` / `
    pub description: String,
    /// Originating section id
    pub section_id: String,
    /// Originating section title
    pub section_title: String,
    /// Toggle to remove the favorite
    pub favorite: FavoriteToggle,
}

/// The quiz view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizBlock {
    /// Offered source sections
    pub sources: Vec<QuizSource>,
    /// Question count in the form
    pub count: usize,
    /// Current phase
    pub phase: QuizPhase,
    /// Question on screen
    pub question: Option<QuestionView>,
    /// Feedback on screen
    pub feedback: Option<Feedback>,
    /// Buttons in display order
    pub controls: Vec<Control>,
}

/// A quiz source option
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSource {
    /// Section id
    pub id: String,
    /// Section title
    pub title: String,
    /// Whether this is the selected source
    pub selected: bool,
}

/// The question on screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionView {
    /// Text to translate
    pub prompt: String,
    /// Example sentence
    pub extra: Option<String>,
    /// Answer field value at render time
    pub answer_field: String,
    /// 1-based question number
    pub number: usize,
    /// Questions in this session
    pub total: usize,
}

/// A quiz button
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Control {
    /// Button label
    pub label: String,
    /// Action
    pub intent: Intent,
}

impl Control {
    /// Create a control
    pub fn new(label: impl Into<String>, intent: Intent) -> Self {
        Self {
            label: label.into(),
            intent,
        }
    }
}
