// Data-driven genre and mood tables.
//
// Everything the engine knows about style lives here in `StyleTables`,
// loaded from JSON (`data/style_tables.json` by default). Moods map to a
// scale, a tempo multiplier, and an energy level; genres map to a default
// tempo range, a section structure, a vocal articulation style, and a
// partial audio-feature override.
//
// Tables are validated once at load and are immutable afterwards, so one
// `StyleTables` can be shared by every concurrent `generate` call.
//
// Lookups are case-insensitive. Unknown moods and genres are not errors:
// callers decide the fallback (key.rs falls back to sentiment, features.rs
// skips the override, the orchestrator uses the default genre profile).

use crate::scale::ScaleName;
use lyricsmith_lang::TableError;
use lyricsmith_prng::SongRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Slowest tempo the engine accepts, in BPM.
pub const MIN_TEMPO_BPM: f64 = 20.0;
/// Fastest tempo the engine accepts, in BPM.
pub const MAX_TEMPO_BPM: f64 = 300.0;

fn tempo_range_ok((low, high): (u32, u32)) -> bool {
    low <= high && f64::from(low) >= MIN_TEMPO_BPM && f64::from(high) <= MAX_TEMPO_BPM
}

/// Musical parameters implied by a mood tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodProfile {
    /// Scale used whenever this mood is requested, regardless of sentiment.
    pub scale: ScaleName,
    /// Relative tempo feel (1.0 = neutral). Informational: default tempo
    /// comes from the genre range unscaled.
    pub tempo_multiplier: f64,
    /// Energy in [0, 1]; also drives valence in features.rs.
    pub energy: f64,
}

/// Fields a genre overrides on top of the baseline audio features.
/// Absent fields leave the baseline (or mood-adjusted) value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danceability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acousticness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrumentalness: Option<f64>,
}

impl FeatureOverrides {
    fn fields(&self) -> [(&'static str, Option<f64>); 5] {
        [
            ("energy", self.energy),
            ("valence", self.valence),
            ("danceability", self.danceability),
            ("acousticness", self.acousticness),
            ("instrumentalness", self.instrumentalness),
        ]
    }
}

/// Style defaults for one genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreProfile {
    /// Inclusive BPM range the default tempo is drawn from.
    pub tempo_range: (u32, u32),
    /// Section names, in song order.
    pub structure: Vec<String>,
    /// Articulation style for default vocal settings.
    pub vocal_style: String,
    #[serde(default)]
    pub features: FeatureOverrides,
}

/// A genre profile whose tempo range cannot be sampled.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("tempo range ({low}, {high}) is empty or outside 20-300 BPM")]
pub struct TempoRangeError {
    pub low: u32,
    pub high: u32,
}

impl GenreProfile {
    /// Draw a whole-number tempo uniformly from `tempo_range`.
    pub fn draw_tempo(&self, rng: &mut SongRng) -> Result<f64, TempoRangeError> {
        let (low, high) = self.tempo_range;
        if !tempo_range_ok(self.tempo_range) {
            return Err(TempoRangeError { low, high });
        }
        Ok(rng.range_inclusive(low as i64, high as i64) as f64)
    }

    fn validate(&self, name: &str) -> Result<(), TableError> {
        let (low, high) = self.tempo_range;
        if !tempo_range_ok(self.tempo_range) {
            return Err(TableError::invalid(
                "genre",
                name,
                format!("tempo range ({low}, {high}) is empty or outside 20-300 BPM"),
            ));
        }
        if self.structure.is_empty() {
            return Err(TableError::invalid("genre", name, "structure is empty"));
        }
        if self.vocal_style.trim().is_empty() {
            return Err(TableError::invalid("genre", name, "vocal style is empty"));
        }
        for (field, value) in self.features.fields() {
            if let Some(v) = value {
                check_unit(v).map_err(|reason| {
                    TableError::invalid("genre", name, format!("{field}: {reason}"))
                })?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct StyleTablesFile {
    default_genre: String,
    moods: BTreeMap<String, MoodProfile>,
    genres: BTreeMap<String, GenreProfile>,
}

/// Validated, immutable mood and genre tables.
#[derive(Debug, Clone)]
pub struct StyleTables {
    moods: BTreeMap<String, MoodProfile>,
    genres: BTreeMap<String, GenreProfile>,
    default_genre: String,
    fallback: GenreProfile,
}

impl StyleTables {
    /// Parse and validate tables from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let file: StyleTablesFile = serde_json::from_str(json)?;
        Self::new(file.moods, file.genres, &file.default_genre)
    }

    /// Build tables from parts. Keys are case-folded; `default_genre` must
    /// name one of the genres.
    pub fn new(
        moods: BTreeMap<String, MoodProfile>,
        genres: BTreeMap<String, GenreProfile>,
        default_genre: &str,
    ) -> Result<Self, TableError> {
        let mut folded_moods = BTreeMap::new();
        for (name, mood) in moods {
            let key = fold(&name);
            check_unit(mood.energy).map_err(|reason| {
                TableError::invalid("mood", key.clone(), format!("energy: {reason}"))
            })?;
            if !(mood.tempo_multiplier.is_finite() && mood.tempo_multiplier > 0.0) {
                return Err(TableError::invalid(
                    "mood",
                    key,
                    format!("tempo multiplier {} must be positive", mood.tempo_multiplier),
                ));
            }
            if folded_moods.insert(key.clone(), mood).is_some() {
                return Err(TableError::Duplicate {
                    table: "mood",
                    entry: key,
                });
            }
        }

        let mut folded_genres = BTreeMap::new();
        for (name, genre) in genres {
            let key = fold(&name);
            genre.validate(&key)?;
            if folded_genres.insert(key.clone(), genre).is_some() {
                return Err(TableError::Duplicate {
                    table: "genre",
                    entry: key,
                });
            }
        }

        let default_genre = fold(default_genre);
        let fallback = folded_genres
            .get(&default_genre)
            .cloned()
            .ok_or_else(|| {
                TableError::invalid("genre", default_genre.clone(), "default genre is not defined")
            })?;

        Ok(StyleTables {
            moods: folded_moods,
            genres: folded_genres,
            default_genre,
            fallback,
        })
    }

    /// Load the default tables embedded at compile time.
    ///
    /// Panics if the embedded JSON is malformed; `test_default_tables_load`
    /// guards it.
    pub fn default_tables() -> Self {
        let json = include_str!("../../data/style_tables.json");
        Self::from_json(json).expect("embedded style_tables.json is malformed")
    }

    pub fn mood(&self, name: &str) -> Option<&MoodProfile> {
        self.moods.get(&fold(name))
    }

    pub fn genre(&self, name: &str) -> Option<&GenreProfile> {
        self.genres.get(&fold(name))
    }

    /// The named genre, or the default genre's profile if unknown.
    pub fn genre_or_default(&self, name: &str) -> &GenreProfile {
        self.genre(name).unwrap_or(&self.fallback)
    }

    pub fn default_genre(&self) -> &str {
        &self.default_genre
    }

    pub fn mood_names(&self) -> impl Iterator<Item = &str> {
        self.moods.keys().map(String::as_str)
    }

    pub fn genre_names(&self) -> impl Iterator<Item = &str> {
        self.genres.keys().map(String::as_str)
    }
}

impl Default for StyleTables {
    fn default() -> Self {
        Self::default_tables()
    }
}

/// Case-folded lookup key.
pub(crate) fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

fn check_unit(value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{value} is outside [0, 1]"))
    }
}
