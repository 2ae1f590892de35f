//! Persistent cache for advisory lookups.
//!
//! Entries are stored under the cache directory using a hash of the query key
//! as the filename to avoid filesystem issues; the payload is the tool's JSON
//! result. The cache is unbounded and best-effort: read and write failures
//! are swallowed so a broken cache only costs a repeat lookup.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct QueryCache {
    dir: PathBuf,
}

impl QueryCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        QueryCache { dir: dir.into() }
    }

    /// Load a cached result for a key, if present and parseable.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.entry_path(key);
        let data = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&data) {
            Ok(value) => {
                debug!(%key, "Advisory cache hit");
                Some(value)
            }
            Err(err) => {
                debug!(path = %path.display(), "Discarding unparseable cache entry: {err}");
                None
            }
        }
    }

    /// Persist a result for a key. Errors are ignored to keep lookups cheap.
    pub fn store<T: Serialize>(&self, key: &str, value: &T) {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(contents) = serde_json::to_string(value) {
            let _ = fs::write(path, contents);
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let hash = format!("{:x}", hasher.finalize());
        self.dir.join(format!("{hash}.json"))
    }
}

fn normalize(query: &str) -> String {
    query.to_lowercase().trim().to_string()
}

pub fn dictionary_key(word: &str) -> String {
    format!("dict_{}", normalize(word))
}

pub fn rhyme_key(word: &str) -> String {
    format!("rhyme_{}", normalize(word))
}

pub fn literary_key(query: &str) -> String {
    // The `_v3` suffix isolates entries written by older prompt revisions.
    format!("lit_{}_v3", normalize(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::DictionaryEntry;
    use std::path::Path;

    fn cache_in(dir: &Path) -> QueryCache {
        QueryCache::new(dir.join(".cache"))
    }

    #[test]
    fn store_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        let entry = DictionaryEntry {
            word: "saudade".to_string(),
            definition: "sentimento de falta".to_string(),
            etymology: None,
            synonyms: vec!["nostalgia".to_string()],
            antonyms: Vec::new(),
            did_you_mean: None,
        };

        cache.store(&dictionary_key("Saudade "), &entry);
        let loaded: DictionaryEntry = cache.load(&dictionary_key(" saudade")).unwrap();

        assert_eq!(loaded, entry);
    }

    #[test]
    fn missing_entries_are_a_clean_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());

        assert!(cache.load::<DictionaryEntry>(&dictionary_key("nada")).is_none());
    }

    #[test]
    fn corrupt_entries_are_treated_as_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        cache.store(&rhyme_key("mar"), &"não é uma planilha de rimas");

        assert!(cache.load::<crate::advisory::RhymeSheet>(&rhyme_key("mar")).is_none());
    }

    #[test]
    fn keys_normalize_case_and_padding() {
        assert_eq!(dictionary_key("  Palavra "), "dict_palavra");
        assert_eq!(literary_key("Machado DE Assis"), "lit_machado de assis_v3");
    }
}
