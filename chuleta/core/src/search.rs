//! Search Filter
//!
//! Decides row visibility for a lowercase query. Heading markers always match
//! so section structure survives filtering.

use crate::corpus::{Row, Section};

/// Normalize raw user input into the stored search term
#[must_use]
pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_string()
}

/// Whether `row` is visible under `query_lower`
///
/// `query_lower` must already be lowercased. An empty query matches all rows;
/// a data row matches if any cell contains the query, case-insensitively.
#[must_use]
pub fn matches(row: &Row, query_lower: &str) -> bool {
    if query_lower.is_empty() {
        return true;
    }
    match row {
        Row::Heading { .. } => true,
        Row::Data(cells) => cells
            .iter()
            .any(|cell| cell.to_lowercase().contains(query_lower)),
    }
}

/// Rows of `section` visible under `query_lower`, in order
pub fn filter_rows<'a>(section: &'a Section, query_lower: &'a str) -> impl Iterator<Item = &'a Row> {
    section.rows.iter().filter(move |row| matches(row, query_lower))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section() -> Section {
        Section::new("vocab", "Vocabulary").with_rows(vec![
            Row::heading("Casa"),
            Row::data(["Kitchen", "cocina"]),
            Row::data(["bedroom", "dormitorio"]),
            Row::heading("Trabajo"),
            Row::data(["meeting", "reunión"]),
        ])
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let s = section();
        assert_eq!(filter_rows(&s, "").count(), s.rows.len());
    }

    #[test]
    fn test_headings_always_match() {
        assert!(matches(&Row::heading("Casa"), "zzz"));
    }

    #[test]
    fn test_case_insensitive_any_cell() {
        assert!(matches(&Row::data(["Kitchen", "cocina"]), "kitch"));
        assert!(matches(&Row::data(["Kitchen", "cocina"]), "cocin"));
        assert!(matches(&Row::data(["meeting", "REUNIÓN"]), "reunión"));
        assert!(!matches(&Row::data(["Kitchen", "cocina"]), "bed"));
    }

    #[test]
    fn test_filter_keeps_structure() {
        let s = section();
        let visible: Vec<_> = filter_rows(&s, "room").collect();
        assert_eq!(
            visible,
            vec![
                &Row::heading("Casa"),
                &Row::data(["bedroom", "dormitorio"]),
                &Row::heading("Trabajo"),
            ]
        );
    }

    #[test]
    fn test_matching_is_exact_partition() {
        let s = section();
        let query = "o";
        for row in &s.rows {
            if let Some(cells) = row.cells() {
                let any = cells.iter().any(|c| c.to_lowercase().contains(query));
                assert_eq!(matches(row, query), any);
            }
        }
    }

    #[test]
    fn test_normalize_term_trims() {
        assert_eq!(normalize_term("  Dog \n"), "Dog");
    }

    #[test]
    fn test_empty_row_never_matches_query() {
        assert!(!matches(&Row::Data(Vec::new()), "a"));
        assert!(matches(&Row::Data(Vec::new()), ""));
    }
}
