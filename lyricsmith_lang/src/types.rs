// Lexicon data types and the table loading error.
//
// `LexEntry` is the JSON shape of one word in `data/lyric_lexicon.json`:
// a sentiment weight plus an optional per-syllable stress pattern. Entries
// are validated when a `Lexicon` is built (see `lib.rs`), so code holding a
// `Lexicon` can trust every weight is finite and inside [-1, 1].
//
// `TableError` is shared with `lyricsmith_music`, whose style tables load
// through the same JSON-in, validated-struct-out path.

use serde::{Deserialize, Serialize};

/// One word of the sentiment/stress lexicon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexEntry {
    /// Lookup form: lowercase, no surrounding punctuation.
    pub word: String,
    /// Emotional weight in [-1, 1]. Negative is dark, positive is bright.
    #[serde(default)]
    pub sentiment: f64,
    /// Stressed/unstressed flag per syllable, if the word has a known
    /// pattern. A pattern whose length disagrees with the word's
    /// orthographic syllable count is ignored at lookup time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<Vec<bool>>,
}

/// Failure to load or validate a static table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("malformed table JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {table} entry `{entry}`: {reason}")]
    Invalid {
        table: &'static str,
        entry: String,
        reason: String,
    },

    #[error("duplicate {table} entry `{entry}`")]
    Duplicate { table: &'static str, entry: String },
}

impl TableError {
    pub fn invalid(
        table: &'static str,
        entry: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        TableError::Invalid {
            table,
            entry: entry.into(),
            reason: reason.into(),
        }
    }
}
