// Shared lyric language crate.
//
// Provides the English-lyrics side of Lyricsmith as a programmatic
// resource for `lyricsmith_music`: a word lexicon carrying sentiment
// weights and known stress patterns, and the orthographic syllable rules
// used to align one note per syllable.
//
// Architecture:
// - `types.rs`: `LexEntry` (JSON word entry) and `TableError`
// - `syllables.rs`: vowel-run syllable counting/splitting, default stress
// - `lib.rs` (this file): `Lexicon`, which loads and queries entries
//
// The lexicon is loaded from `data/lyric_lexicon.json` via
// `Lexicon::from_json()` (JSON string in, validated struct out). The
// `default_lexicon()` convenience function embeds the default file at
// compile time with `include_str!`.
//
// Lookups never fail: unknown words are neutral (sentiment 0.0) and get
// the default stress pattern for their syllable count.

pub mod syllables;
pub mod types;

pub use syllables::{count_syllables, default_stress, normalize_word, split_syllables};
pub use types::{LexEntry, TableError};

use std::collections::BTreeMap;

/// The top-level JSON structure for the lexicon file.
#[derive(Debug, serde::Deserialize)]
struct LexiconFile {
    words: Vec<LexEntry>,
}

/// A validated, immutable word lexicon.
///
/// Preserves file order in `all()` and indexes entries by their lookup
/// form for O(log n) queries.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<LexEntry>,
    index: BTreeMap<String, usize>,
}

impl Lexicon {
    /// Parse and validate a lexicon from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let file: LexiconFile = serde_json::from_str(json)?;
        Self::from_entries(file.words)
    }

    /// Build a lexicon from entries, normalizing and validating each one.
    ///
    /// Rejects empty words, sentiments outside [-1, 1] (or non-finite),
    /// empty stress patterns, and two entries with the same lookup form.
    pub fn from_entries(entries: Vec<LexEntry>) -> Result<Self, TableError> {
        let mut normalized = Vec::with_capacity(entries.len());
        let mut index = BTreeMap::new();

        for mut entry in entries {
            let key = normalize_word(&entry.word);
            if key.is_empty() {
                return Err(TableError::invalid("lexicon", entry.word, "word is empty"));
            }
            if !entry.sentiment.is_finite() || !(-1.0..=1.0).contains(&entry.sentiment) {
                return Err(TableError::invalid(
                    "lexicon",
                    key,
                    format!("sentiment {} is outside [-1, 1]", entry.sentiment),
                ));
            }
            if entry.stress.as_ref().is_some_and(|s| s.is_empty()) {
                return Err(TableError::invalid("lexicon", key, "stress pattern is empty"));
            }
            if index.contains_key(&key) {
                return Err(TableError::Duplicate {
                    table: "lexicon",
                    entry: key,
                });
            }
            index.insert(key.clone(), normalized.len());
            entry.word = key;
            normalized.push(entry);
        }

        Ok(Lexicon {
            entries: normalized,
            index,
        })
    }

    /// All entries, in file order.
    pub fn all(&self) -> &[LexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a word in any case, with or without surrounding punctuation.
    pub fn entry(&self, word: &str) -> Option<&LexEntry> {
        self.index
            .get(&normalize_word(word))
            .and_then(|&i| self.entries.get(i))
    }

    /// Sentiment weight, 0.0 for unknown words.
    pub fn sentiment(&self, word: &str) -> f64 {
        self.entry(word).map_or(0.0, |e| e.sentiment)
    }

    /// Stress pattern of exactly `syllable_count` flags.
    ///
    /// Uses the lexicon's pattern only when its length matches; otherwise
    /// falls back to [`default_stress`].
    pub fn stress_pattern(&self, word: &str, syllable_count: usize) -> Vec<bool> {
        let count = syllable_count.max(1);
        match self.entry(word).and_then(|e| e.stress.as_ref()) {
            Some(pattern) if pattern.len() == count => pattern.clone(),
            _ => default_stress(count),
        }
    }
}

/// Load the default lexicon embedded at compile time.
///
/// Panics if the embedded JSON is malformed (should never happen in a
/// released build; `test_default_lexicon_loads` guards it).
pub fn default_lexicon() -> Lexicon {
    let json = include_str!("../../data/lyric_lexicon.json");
    Lexicon::from_json(json).expect("embedded lyric_lexicon.json is malformed")
}
