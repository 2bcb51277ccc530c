//! Display Layout
//!
//! Turns the viewer's [`ViewTree`] into lines of styled spans for the
//! terminal. Every activatable element of the tree becomes a focus
//! [`Target`] carrying its intent, so activating a target simply hands the
//! intent back to the viewer.
//!
//! # Design Philosophy
//!
//! The TUI is a thin client: it lays out whatever tree the viewer produced and
//! never interprets row contents itself. A document lives exactly as long as
//! the tree it was laid out from.

use std::collections::HashMap;

use chuleta_core::view::{
    Body, Cell, FavoriteToggle, FavoritesBlock, QuizBlock, ReferenceBody, TableBlock, TableRow,
};
use chuleta_core::{Intent, QuizPhase, ViewTree};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a table column may grow before its cells are truncated
pub const MAX_COLUMN_WIDTH: usize = 32;

/// Gap between table columns
const COLUMN_GAP: &str = "  ";

/// Favorite toggle glyphs
const FAVORITE_ON: &str = "★";
const FAVORITE_OFF: &str = "☆";

/// What a span is, for styling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanRole {
    /// Section or block title
    Title,
    /// Section note
    Note,
    /// Column header
    Header,
    /// Sub-heading row
    Subheading,
    /// Plain cell text
    Text,
    /// Cell text with a speak affordance
    Speakable,
    /// Favorite toggle
    Favorite {
        /// Whether the row is favorited
        active: bool,
    },
    /// Quiz button
    Control,
    /// Selected option in a choice list
    Selected,
    /// Secondary text
    Dim,
    /// Question prompt
    Prompt,
    /// Typed answer
    Answer,
    /// Positive feedback
    FeedbackOk,
    /// Negative feedback
    FeedbackErr,
}

/// A run of text with one role
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplaySpan {
    /// Text to draw
    pub text: String,
    /// Styling role
    pub role: SpanRole,
    /// Index into [`DisplayDocument::targets`] when activatable
    pub target: Option<usize>,
}

/// One terminal line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayLine {
    /// Spans left to right
    pub spans: Vec<DisplaySpan>,
}

impl DisplayLine {
    /// The line's text without styling
    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// An activatable element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    /// Intent handed back to the viewer on activation
    pub intent: Intent,
    /// Line the element sits on
    pub line: usize,
}

/// A laid-out view tree
#[derive(Clone, Debug, Default)]
pub struct DisplayDocument {
    /// Lines top to bottom
    pub lines: Vec<DisplayLine>,
    /// Activatable elements in reading order
    pub targets: Vec<Target>,
    anchors: HashMap<String, usize>,
}

impl DisplayDocument {
    /// First line of a section's table
    #[must_use]
    pub fn anchor_line(&self, section_id: &str) -> Option<usize> {
        self.anchors.get(section_id).copied()
    }

    /// Lines as plain text
    #[must_use]
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines.iter().map(DisplayLine::text).collect()
    }
}

/// Lay out the body of `tree` for a content area `width` columns wide
#[must_use]
pub fn layout(tree: &ViewTree, width: u16) -> DisplayDocument {
    let mut builder = Builder::new(usize::from(width).max(20));
    match &tree.body {
        Body::Reference(reference) => builder.reference(reference),
        Body::Quiz(quiz) => builder.quiz(quiz),
    }
    builder.finish()
}

/// Pad or truncate `text` to exactly `width` terminal columns
#[must_use]
pub fn fit(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width <= width {
        let mut out = text.to_string();
        out.push_str(&" ".repeat(width - text_width));
        return out;
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

struct Builder {
    width: usize,
    doc: DisplayDocument,
    current: Vec<DisplaySpan>,
}

impl Builder {
    fn new(width: usize) -> Self {
        Self {
            width,
            doc: DisplayDocument::default(),
            current: Vec::new(),
        }
    }

    fn push(&mut self, text: impl Into<String>, role: SpanRole) {
        self.current.push(DisplaySpan {
            text: text.into(),
            role,
            target: None,
        });
    }

    fn push_target(&mut self, text: impl Into<String>, role: SpanRole, intent: Intent) {
        let index = self.doc.targets.len();
        self.doc.targets.push(Target {
            intent,
            line: self.doc.lines.len(),
        });
        self.current.push(DisplaySpan {
            text: text.into(),
            role,
            target: Some(index),
        });
    }

    fn push_cell(&mut self, cell: &Cell, width: usize) {
        let text = fit(&cell.text, width);
        match &cell.speak {
            Some(intent) => self.push_target(text, SpanRole::Speakable, intent.clone()),
            None => self.push(text, SpanRole::Text),
        }
    }

    fn push_toggle(&mut self, toggle: &FavoriteToggle) {
        let glyph = if toggle.active { FAVORITE_ON } else { FAVORITE_OFF };
        self.push_target(
            glyph,
            SpanRole::Favorite {
                active: toggle.active,
            },
            toggle.intent.clone(),
        );
    }

    fn end_line(&mut self) {
        let spans = std::mem::take(&mut self.current);
        self.doc.lines.push(DisplayLine { spans });
    }

    fn blank(&mut self) {
        self.end_line();
    }

    fn wrapped(&mut self, text: &str, role: SpanRole) {
        for line in textwrap::wrap(text, self.width) {
            self.push(line.into_owned(), role);
            self.end_line();
        }
    }

    fn finish(mut self) -> DisplayDocument {
        if !self.current.is_empty() {
            self.end_line();
        }
        self.doc
    }

    // =========================================================================
    // Reference view
    // =========================================================================

    fn reference(&mut self, reference: &ReferenceBody) {
        if let Some(favorites) = &reference.favorites {
            self.favorites(favorites);
        }
        for table in &reference.tables {
            self.table(table);
        }
    }

    fn favorites(&mut self, block: &FavoritesBlock) {
        self.push(format!("{FAVORITE_ON} Favorites"), SpanRole::Title);
        self.end_line();

        let term_width = column_width(
            block.headers.first().map(String::as_str),
            block.entries.iter().map(|e| e.term.text.as_str()),
        );
        let description_width = column_width(
            block.headers.get(1).map(String::as_str),
            block.entries.iter().map(|e| e.description.as_str()),
        );

        self.push("  ", SpanRole::Header);
        let header = [
            fit(block.headers.first().map_or("", String::as_str), term_width),
            fit(block.headers.get(1).map_or("", String::as_str), description_width),
            block.headers.get(2).cloned().unwrap_or_default(),
        ]
        .join(COLUMN_GAP);
        self.push(header, SpanRole::Header);
        self.end_line();

        for entry in &block.entries {
            self.push_toggle(&entry.favorite);
            self.push(" ", SpanRole::Text);
            self.push_cell(&entry.term, term_width);
            self.push(COLUMN_GAP, SpanRole::Text);
            self.push(fit(&entry.description, description_width), SpanRole::Text);
            self.push(COLUMN_GAP, SpanRole::Text);
            self.push(entry.section_title.clone(), SpanRole::Dim);
            self.end_line();
        }
        self.blank();
    }

    fn table(&mut self, table: &TableBlock) {
        self.doc
            .anchors
            .insert(table.anchor.clone(), self.doc.lines.len());
        self.push(table.title.clone(), SpanRole::Title);
        self.end_line();
        if let Some(note) = &table.note {
            self.wrapped(note, SpanRole::Note);
        }

        let widths = table_widths(table);
        if !table.headers.is_empty() {
            self.push("  ", SpanRole::Header);
            let header = table
                .headers
                .iter()
                .zip(&widths)
                .map(|(h, w)| fit(h, *w))
                .collect::<Vec<_>>()
                .join(COLUMN_GAP);
            self.push(header, SpanRole::Header);
            self.end_line();
        }

        if table.rows.is_empty() {
            self.push("  No matches", SpanRole::Dim);
            self.end_line();
        }

        for row in &table.rows {
            match row {
                TableRow::Subheading { text, span } => {
                    let total = subheading_width(&widths, *span);
                    let label = format!("── {text} ");
                    let fill = total.saturating_sub(label.width());
                    self.push(format!("{label}{}", "─".repeat(fill)), SpanRole::Subheading);
                    self.end_line();
                }
                TableRow::Entry(entry) => {
                    self.push_toggle(&entry.favorite);
                    self.push(" ", SpanRole::Text);
                    for (col, cell) in entry.cells.iter().enumerate() {
                        if col > 0 {
                            self.push(COLUMN_GAP, SpanRole::Text);
                        }
                        let width = widths.get(col).copied().unwrap_or(MAX_COLUMN_WIDTH);
                        self.push_cell(cell, width);
                    }
                    self.end_line();
                }
            }
        }
        self.blank();
    }

    // =========================================================================
    // Quiz view
    // =========================================================================

    fn quiz(&mut self, quiz: &QuizBlock) {
        self.push("Quiz", SpanRole::Title);
        self.end_line();
        self.blank();

        self.push("Source:    ", SpanRole::Dim);
        if quiz.sources.is_empty() {
            self.push("no quiz sections available", SpanRole::Dim);
        }
        for source in &quiz.sources {
            let role = if source.selected {
                SpanRole::Selected
            } else {
                SpanRole::Text
            };
            self.push(format!(" {} ", source.title), role);
            self.push(" ", SpanRole::Text);
        }
        self.end_line();
        self.push("Questions: ", SpanRole::Dim);
        self.push(quiz.count.to_string(), SpanRole::Selected);
        self.end_line();
        self.blank();

        for (i, control) in quiz.controls.iter().enumerate() {
            if i > 0 {
                self.push(" ", SpanRole::Text);
            }
            self.push_target(
                format!("[ {} ]", control.label),
                SpanRole::Control,
                control.intent.clone(),
            );
        }
        self.end_line();
        self.blank();

        match &quiz.question {
            Some(question) => {
                self.push(
                    format!("Question {} of {}", question.number, question.total),
                    SpanRole::Dim,
                );
                self.end_line();
                self.push("Translate: ", SpanRole::Dim);
                self.push(question.prompt.clone(), SpanRole::Prompt);
                self.end_line();
                if let Some(extra) = &question.extra {
                    self.wrapped(extra, SpanRole::Note);
                }
                self.push("Answer:    ", SpanRole::Dim);
                self.push(question.answer_field.clone(), SpanRole::Answer);
                self.end_line();
            }
            None if quiz.phase == QuizPhase::Idle => {
                self.push("Press Start to begin.", SpanRole::Dim);
                self.end_line();
            }
            None => {}
        }

        if let Some(feedback) = &quiz.feedback {
            self.blank();
            let role = if feedback.ok {
                SpanRole::FeedbackOk
            } else {
                SpanRole::FeedbackErr
            };
            self.wrapped(&feedback.message, role);
        }
    }
}

fn column_width<'a>(header: Option<&str>, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(UnicodeWidthStr::width)
        .chain(header.map(UnicodeWidthStr::width))
        .max()
        .unwrap_or(0)
        .min(MAX_COLUMN_WIDTH)
}

fn table_widths(table: &TableBlock) -> Vec<usize> {
    let columns = table
        .rows
        .iter()
        .filter_map(|row| match row {
            TableRow::Entry(entry) => Some(entry.cells.len()),
            TableRow::Subheading { .. } => None,
        })
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or(0);

    (0..columns)
        .map(|col| {
            let cells = table.rows.iter().filter_map(move |row| match row {
                TableRow::Entry(entry) => entry.cells.get(col).map(|c| c.text.as_str()),
                TableRow::Subheading { .. } => None,
            });
            column_width(table.headers.get(col).map(String::as_str), cells)
        })
        .collect()
}

/// Width covered by a sub-heading spanning `span` columns (the toggle included)
fn subheading_width(widths: &[usize], span: usize) -> usize {
    let data_columns = span.saturating_sub(1).min(widths.len());
    let cells: usize = widths[..data_columns].iter().sum();
    let gaps = data_columns.saturating_sub(1) * COLUMN_GAP.len();
    FAVORITE_ON.width() + 1 + cells + gaps
}
