//! Full-text lookup over the local reference shelf.
//!
//! Two static documents (the book catalog and the Kindle notes export) are
//! scanned verbatim: paragraphs are blank-line-delimited, matching is a
//! case-insensitive substring test, results come back in document order with
//! at most ten per source. No index, no ranking. A missing document simply
//! yields fewer results.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use ts_rs::TS;

pub const MAX_MATCHES_PER_SOURCE: usize = 10;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub enum ShelfSource {
    #[serde(rename = "Catálogo")]
    Catalogo,
    #[serde(rename = "Kindle Notes")]
    KindleNotes,
}

impl std::fmt::Display for ShelfSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ShelfSource::Catalogo => "Catálogo",
            ShelfSource::KindleNotes => "Kindle Notes",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ShelfMatch {
    pub source: ShelfSource,
    pub content: String,
}

pub struct Shelf {
    catalog_path: PathBuf,
    kindle_notes_path: PathBuf,
}

impl Shelf {
    pub fn new(catalog_path: impl Into<PathBuf>, kindle_notes_path: impl Into<PathBuf>) -> Self {
        Shelf {
            catalog_path: catalog_path.into(),
            kindle_notes_path: kindle_notes_path.into(),
        }
    }

    /// Scan both documents for the query. Blank queries match nothing.
    pub fn search(&self, query: &str) -> Vec<ShelfMatch> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();
        let sources = [
            (ShelfSource::Catalogo, &self.catalog_path),
            (ShelfSource::KindleNotes, &self.kindle_notes_path),
        ];
        for (source, path) in sources {
            match fs::read_to_string(path) {
                Ok(text) => results.extend(find_matches(&text, &needle, source)),
                Err(err) => {
                    debug!(path = %path.display(), %source, "Shelf document unavailable: {err}");
                }
            }
        }
        results
    }
}

fn find_matches(text: &str, needle: &str, source: ShelfSource) -> Vec<ShelfMatch> {
    let mut matches = Vec::new();
    for paragraph in PARAGRAPH_BREAK.split(text) {
        if paragraph.to_lowercase().contains(needle) {
            matches.push(ShelfMatch {
                source,
                content: paragraph.trim().to_string(),
            });
            if matches.len() >= MAX_MATCHES_PER_SOURCE {
                break;
            }
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf_with_catalog(contents: &str) -> (tempfile::TempDir, Shelf) {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalogo.md");
        fs::write(&catalog, contents).unwrap();
        let shelf = Shelf::new(catalog, dir.path().join("ausente.md"));
        (dir, shelf)
    }

    #[test]
    fn matching_is_case_insensitive_and_in_document_order() {
        let (_dir, shelf) = shelf_with_catalog(
            "# Machado de Assis\n\nDom Casmurro, romance.\n\nOutro autor qualquer.\n\nmachado e a ironia.",
        );

        let results = shelf.search("Machado");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "# Machado de Assis");
        assert_eq!(results[1].content, "machado e a ironia.");
        assert!(results.iter().all(|m| m.source == ShelfSource::Catalogo));
    }

    #[test]
    fn matches_are_capped_per_source() {
        let body = (0..25)
            .map(|i| format!("parágrafo {i} sobre poesia"))
            .collect::<Vec<_>>()
            .join("\n\n");
        let (_dir, shelf) = shelf_with_catalog(&body);

        let results = shelf.search("poesia");

        assert_eq!(results.len(), MAX_MATCHES_PER_SOURCE);
    }

    #[test]
    fn paragraphs_split_on_blank_lines_including_padded_ones() {
        let (_dir, shelf) = shelf_with_catalog("primeiro verso\n   \nsegundo verso");

        let results = shelf.search("verso");

        assert_eq!(results.len(), 2);
    }

    #[test]
    fn missing_documents_yield_fewer_results_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        let shelf = Shelf::new(dir.path().join("nada.md"), dir.path().join("nada2.md"));

        assert!(shelf.search("qualquer").is_empty());
    }

    #[test]
    fn blank_queries_match_nothing() {
        let (_dir, shelf) = shelf_with_catalog("algum parágrafo");

        assert!(shelf.search("   ").is_empty());
    }

    #[test]
    fn both_sources_contribute_in_source_order() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalogo.md");
        let notes = dir.path().join("notas.md");
        fs::write(&catalog, "catálogo fala de mar").unwrap();
        fs::write(&notes, "nota de leitura sobre o mar\n\noutra nota, mar de novo").unwrap();
        let shelf = Shelf::new(catalog, notes);

        let results = shelf.search("mar");

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].source, ShelfSource::Catalogo);
        assert_eq!(results[1].source, ShelfSource::KindleNotes);
        assert_eq!(results[2].source, ShelfSource::KindleNotes);
    }
}
