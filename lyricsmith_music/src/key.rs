// Key and scale selection.
//
// A requested mood with a table entry fixes the scale outright. Otherwise
// the scale follows the mean line sentiment: clearly positive lyrics get
// major, clearly negative get minor, mildly positive get mixolydian, and
// everything else dorian.
//
// The root is drawn from a small candidate set picked by the same
// sentiment thresholds (bright, dark, or neutral roots), even when the
// mood fixed the scale. This draw is one of the engine's two randomness
// sources; the other is contour jitter in phrase.rs.

use crate::scale::{MusicalKey, ScaleName};
use crate::style::StyleTables;
use lyricsmith_prng::SongRng;

/// Mean sentiment above which lyrics count as strongly positive.
pub const BRIGHT_THRESHOLD: f64 = 0.3;
/// Mean sentiment below which lyrics count as strongly negative.
pub const DARK_THRESHOLD: f64 = -0.3;

/// C4, D4, E4, G4.
pub const BRIGHT_ROOTS: [i32; 4] = [60, 62, 64, 67];
/// A3, B3, C#4, F4.
pub const DARK_ROOTS: [i32; 4] = [57, 59, 61, 65];
/// C4, D4, F4, G4.
pub const NEUTRAL_ROOTS: [i32; 4] = [60, 62, 65, 67];

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean_sentiment(line_sentiments: &[f64]) -> f64 {
    if line_sentiments.is_empty() {
        0.0
    } else {
        line_sentiments.iter().sum::<f64>() / line_sentiments.len() as f64
    }
}

/// Scale implied by mean sentiment alone.
pub fn scale_for_sentiment(mean: f64) -> ScaleName {
    if mean > BRIGHT_THRESHOLD {
        ScaleName::Major
    } else if mean < DARK_THRESHOLD {
        ScaleName::Minor
    } else if mean > 0.0 {
        ScaleName::Mixolydian
    } else {
        ScaleName::Dorian
    }
}

/// Root candidates for a mean sentiment.
pub fn root_candidates(mean: f64) -> &'static [i32] {
    if mean > BRIGHT_THRESHOLD {
        &BRIGHT_ROOTS
    } else if mean < DARK_THRESHOLD {
        &DARK_ROOTS
    } else {
        &NEUTRAL_ROOTS
    }
}

/// Picks a `MusicalKey` from the emotional arc and mood tag.
#[derive(Debug, Clone, Copy)]
pub struct KeySelector<'a> {
    styles: &'a StyleTables,
}

impl<'a> KeySelector<'a> {
    pub fn new(styles: &'a StyleTables) -> Self {
        KeySelector { styles }
    }

    pub fn select(&self, line_sentiments: &[f64], mood: &str, rng: &mut SongRng) -> MusicalKey {
        let mean = mean_sentiment(line_sentiments);
        let scale = match self.styles.mood(mood) {
            Some(profile) => profile.scale,
            None => scale_for_sentiment(mean),
        };

        let root_pitch = rng
            .choose(root_candidates(mean))
            .copied()
            .unwrap_or(NEUTRAL_ROOTS[0]);

        MusicalKey::new(root_pitch, scale)
    }
}
