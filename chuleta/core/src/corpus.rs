//! Corpus Model
//!
//! The static study content: an ordered list of sections, each a sequence of
//! data rows interleaved with decorative sub-heading markers.
//!
//! # Design Philosophy
//!
//! Section order is the curated study order, so the corpus is kept as an
//! ordered `Vec` rather than a map. Section ids are the join key used by
//! favorites, menu anchors and quiz source selection, and must be unique.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Section id of the menu-only quiz entry (never rendered as a table)
pub const QUIZ_SECTION_ID: &str = "quiz";

/// Built-in corpus shipped with the crate
const BUILTIN_CORPUS: &str = include_str!("../data/corpus.json");

/// Errors that can occur when loading or mutating the corpus
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Failed to read a corpus file
    #[error("Failed to read corpus file at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Corpus JSON did not match the expected shape
    #[error("Failed to parse corpus: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two sections share the same id
    #[error("Duplicate section id: {0}")]
    DuplicateSection(String),

    /// No section with the given id
    #[error("Unknown section: {0}")]
    UnknownSection(String),
}

/// Tag value of a heading marker (`{"type": "heading"}`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingKind {
    /// The only marker kind
    Heading,
}

/// A corpus row: either a sub-heading marker or a data row of cells
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Row {
    /// Decorative sub-heading; never searched, favorited or quizzed
    Heading {
        /// Always `heading`
        #[serde(rename = "type")]
        kind: HeadingKind,
        /// Heading label
        text: String,
    },
    /// Positional cells; column 0 is the studied term
    Data(#[serde(deserialize_with = "scalar_cells")] Vec<String>),
}

/// Read cells leniently: numbers and booleans become their text, `null` an empty cell
fn scalar_cells<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;
    use serde_json::Value;

    Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .map(|cell| match cell {
            Value::String(text) => Ok(text),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Null => Ok(String::new()),
            other => Err(D::Error::custom(format!("row cell is not a scalar: {other}"))),
        })
        .collect()
}

impl Row {
    /// Create a heading marker
    pub fn heading(text: impl Into<String>) -> Self {
        Self::Heading {
            kind: HeadingKind::Heading,
            text: text.into(),
        }
    }

    /// Create a data row from anything yielding cell strings
    pub fn data<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Data(cells.into_iter().map(Into::into).collect())
    }

    /// Whether this row is a heading marker
    #[must_use]
    pub fn is_heading(&self) -> bool {
        matches!(self, Self::Heading { .. })
    }

    /// Cells of a data row (`None` for headings)
    #[must_use]
    pub fn cells(&self) -> Option<&[String]> {
        match self {
            Self::Data(cells) => Some(cells),
            Self::Heading { .. } => None,
        }
    }
}

/// Deterministic favorite key of a data row: `section::cell|cell|...`
///
/// Rows with identical content in the same section share an identity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Derive the identity of a data row within a section
    #[must_use]
    pub fn derive(section_id: &str, cells: &[String]) -> Self {
        Self(format!("{}::{}", section_id, cells.join("|")))
    }

    /// Wrap an already-derived identity (e.g. loaded from the store)
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named group of rows sharing headers and a presentation policy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Unique, stable id
    pub id: String,
    /// Display title
    pub title: String,
    /// Optional short note shown next to the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Column header labels
    #[serde(default)]
    pub headers: Vec<String>,
    /// Rows in study order
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Section {
    /// Create an empty section
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            note: None,
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Builder: set headers
    #[must_use]
    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set rows
    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    /// Builder: set note
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Data rows only, skipping heading markers
    pub fn data_rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().filter_map(Row::cells)
    }

    /// Whether this is the menu-only quiz entry
    #[must_use]
    pub fn is_quiz(&self) -> bool {
        self.id == QUIZ_SECTION_ID
    }
}

#[derive(Deserialize)]
struct CorpusFile {
    sections: Vec<Section>,
}

/// The whole corpus in curated order
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    sections: Vec<Section>,
}

impl Corpus {
    /// Create a corpus, rejecting duplicate section ids
    pub fn new(sections: Vec<Section>) -> Result<Self, CorpusError> {
        for (i, section) in sections.iter().enumerate() {
            if sections[..i].iter().any(|s| s.id == section.id) {
                return Err(CorpusError::DuplicateSection(section.id.clone()));
            }
        }
        Ok(Self { sections })
    }

    /// Parse a corpus from `{ "sections": [...] }` JSON
    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let file: CorpusFile = serde_json::from_str(json)?;
        Self::new(file.sections)
    }

    /// Load a corpus file from disk
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let json = std::fs::read_to_string(path).map_err(|source| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Self::from_json(&json)?;
        tracing::info!(path = ?path, sections = corpus.len(), "Corpus loaded");
        Ok(corpus)
    }

    /// The corpus embedded in the crate
    pub fn builtin() -> Result<Self, CorpusError> {
        Self::from_json(BUILTIN_CORPUS)
    }

    /// All sections in corpus order (including the quiz entry)
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Sections rendered as tables (everything except the quiz entry)
    pub fn content_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| !s.is_quiz())
    }

    /// Look up a section by id
    #[must_use]
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Append rows to a section, returning how many were added
    pub fn append_rows(&mut self, section_id: &str, rows: Vec<Row>) -> Result<usize, CorpusError> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .ok_or_else(|| CorpusError::UnknownSection(section_id.to_string()))?;
        let added = rows.len();
        section.rows.extend(rows);
        Ok(added)
    }

    /// Number of sections
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the corpus has no sections
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
