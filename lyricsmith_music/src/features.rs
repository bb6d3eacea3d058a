// Aggregate audio features for a generated song.
//
// These are descriptive tags for catalogs and presentation layers, not
// measurements of any audio. They start from a fixed baseline, then the
// mood (if its table has one) sets energy and valence, then the genre (if
// known) overrides whichever fields its profile lists. Unknown genre and
// mood names skip their step; there is no error path.

use crate::scale::MusicalKey;
use crate::style::StyleTables;
use serde::{Deserialize, Serialize};

const BASELINE_ENERGY: f64 = 0.7;
const BASELINE_VALENCE: f64 = 0.5;
const BASELINE_DANCEABILITY: f64 = 0.6;
const BASELINE_ACOUSTICNESS: f64 = 0.3;
const BASELINE_INSTRUMENTALNESS: f64 = 0.1;
const TIME_SIGNATURE: &str = "4/4";

/// Mood energy above which valence reads as high.
const HIGH_ENERGY: f64 = 0.6;
const HIGH_VALENCE: f64 = 0.8;
const LOW_VALENCE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub tempo: f64,
    /// Root note name, e.g. "C#4".
    pub key: String,
    pub time_signature: String,
    pub energy: f64,
    pub valence: f64,
    pub danceability: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
}

impl AudioFeatures {
    fn baseline(tempo: f64, key: &MusicalKey) -> Self {
        AudioFeatures {
            tempo,
            key: key.root_name(),
            time_signature: TIME_SIGNATURE.to_string(),
            energy: BASELINE_ENERGY,
            valence: BASELINE_VALENCE,
            danceability: BASELINE_DANCEABILITY,
            acousticness: BASELINE_ACOUSTICNESS,
            instrumentalness: BASELINE_INSTRUMENTALNESS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AudioFeatureDeriver<'a> {
    styles: &'a StyleTables,
}

impl<'a> AudioFeatureDeriver<'a> {
    pub fn new(styles: &'a StyleTables) -> Self {
        AudioFeatureDeriver { styles }
    }

    pub fn derive(&self, genre: &str, mood: &str, tempo: f64, key: &MusicalKey) -> AudioFeatures {
        let mut features = AudioFeatures::baseline(tempo, key);

        if let Some(profile) = self.styles.mood(mood) {
            features.energy = profile.energy;
            features.valence = if profile.energy > HIGH_ENERGY {
                HIGH_VALENCE
            } else {
                LOW_VALENCE
            };
        }

        if let Some(profile) = self.styles.genre(genre) {
            let o = &profile.features;
            if let Some(v) = o.energy {
                features.energy = v;
            }
            if let Some(v) = o.valence {
                features.valence = v;
            }
            if let Some(v) = o.danceability {
                features.danceability = v;
            }
            if let Some(v) = o.acousticness {
                features.acousticness = v;
            }
            if let Some(v) = o.instrumentalness {
                features.instrumentalness = v;
            }
        }

        features
    }
}
