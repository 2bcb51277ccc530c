//! Bulk Import / Export
//!
//! Rows come in as a JSON array or as comma-separated text and are appended
//! to one section; the whole corpus goes out as a timestamped JSON document.
//! A failed import never touches the corpus.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::corpus::{Corpus, CorpusError, Row, Section};

/// Default file name for exports
pub const EXPORT_FILE_NAME: &str = "chuleta_export.json";

/// Errors from import and export
#[derive(Debug, Error)]
pub enum TransferError {
    /// Failed to read the import file
    #[error("Failed to read {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to write the export file
    #[error("Failed to write {path}: {source}")]
    Write {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// A `.json` file that is not valid JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// A JSON array whose items are not rows
    #[error("JSON array does not contain rows: {0}")]
    InvalidRows(#[source] serde_json::Error),

    /// Delimited text that could not be parsed
    #[error("Invalid delimited text: {0}")]
    Delimited(#[from] csv::Error),

    /// Nothing to import
    #[error("No rows found")]
    Empty,

    /// Export encoding failed
    #[error("Failed to encode export: {0}")]
    Encode(#[source] serde_json::Error),

    /// Target section is missing
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

/// Input format of an import
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportFormat {
    /// JSON array of rows, falling back to delimited text for other JSON values
    Json,
    /// Comma-separated cells, one row per line
    Delimited,
}

impl ImportFormat {
    /// Choose the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Delimited,
        }
    }
}

/// Outcome of a successful import
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSummary {
    /// Target section id
    pub section_id: String,
    /// Target section title
    pub section_title: String,
    /// Rows appended
    pub rows: usize,
    /// Format used
    pub format: ImportFormat,
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.format {
            ImportFormat::Json => "",
            ImportFormat::Delimited => " CSV",
        };
        write!(
            f,
            "Imported {}{} rows into {}",
            self.rows, kind, self.section_title
        )
    }
}

/// Parse import text into rows
pub fn parse_rows(text: &str, format: ImportFormat) -> Result<(Vec<Row>, ImportFormat), TransferError> {
    if format == ImportFormat::Json {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(TransferError::InvalidJson)?;
        if value.is_array() {
            let rows: Vec<Row> =
                serde_json::from_value(value).map_err(TransferError::InvalidRows)?;
            return Ok((rows, ImportFormat::Json));
        }
    }
    Ok((parse_delimited(text)?, ImportFormat::Delimited))
}

fn parse_delimited(text: &str) -> Result<Vec<Row>, TransferError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(Row::data(record.iter()));
    }
    if rows.is_empty() {
        return Err(TransferError::Empty);
    }
    Ok(rows)
}

/// Import `path` into `section_id`; the corpus is only modified on success
pub fn import_file(
    corpus: &mut Corpus,
    section_id: &str,
    path: &Path,
) -> Result<ImportSummary, TransferError> {
    let section_title = corpus
        .section(section_id)
        .map(|s| s.title.clone())
        .ok_or_else(|| CorpusError::UnknownSection(section_id.to_string()))?;
    let text = std::fs::read_to_string(path).map_err(|source| TransferError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let (rows, format) = parse_rows(&text, ImportFormat::from_path(path))?;
    let added = corpus.append_rows(section_id, rows)?;

    tracing::info!(section = section_id, rows = added, path = ?path, "Rows imported");
    Ok(ImportSummary {
        section_id: section_id.to_string(),
        section_title,
        rows: added,
        format,
    })
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    #[serde(rename = "exportedAt")]
    exported_at: String,
    data: &'a [Section],
}

/// Serialize the corpus as pretty JSON stamped with `now`
pub fn export_json(corpus: &Corpus, now: DateTime<Utc>) -> Result<String, TransferError> {
    let doc = ExportDocument {
        exported_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        data: corpus.sections(),
    };
    serde_json::to_string_pretty(&doc).map_err(TransferError::Encode)
}

/// Write the corpus export to `path`
pub fn export_file(corpus: &Corpus, path: &Path) -> Result<(), TransferError> {
    let json = export_json(corpus, Utc::now())?;
    std::fs::write(path, json).map_err(|source| TransferError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = ?path, "Corpus exported");
    Ok(())
}
