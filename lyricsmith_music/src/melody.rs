// The assembled melody of a song.
//
// `GeneratedMelody` owns the phrases plus two aggregates (note count and
// total duration) that are always recomputed from the phrases at
// construction, so they cannot drift. `check_invariants` verifies the
// structural guarantees every generated melody must meet; the orchestrator
// runs it before returning a song.

use crate::error::InvariantViolation;
use crate::features::AudioFeatures;
use crate::phrase::{MelodyNote, MelodyPhrase};
use crate::scale::MusicalKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMelody {
    pub key: MusicalKey,
    pub phrases: Vec<MelodyPhrase>,
    pub audio_features: AudioFeatures,
    /// Per-line sentiment, one entry per phrase.
    pub emotional_arc: Vec<f64>,
    pub total_duration_seconds: f64,
    pub note_count: usize,
}

impl GeneratedMelody {
    pub fn new(
        key: MusicalKey,
        phrases: Vec<MelodyPhrase>,
        audio_features: AudioFeatures,
    ) -> Self {
        let emotional_arc = phrases.iter().map(|p| p.sentiment).collect();
        let notes = phrases.iter().flat_map(|p| &p.notes);
        let total_duration_seconds = notes.clone().map(|n| n.duration_seconds).sum();
        let note_count = notes.count();
        GeneratedMelody {
            key,
            phrases,
            audio_features,
            emotional_arc,
            total_duration_seconds,
            note_count,
        }
    }

    /// All notes in song order.
    pub fn notes(&self) -> impl Iterator<Item = &MelodyNote> {
        self.phrases.iter().flat_map(|p| &p.notes)
    }

    /// When the last note ends.
    pub fn end_seconds(&self) -> f64 {
        self.phrases.last().map_or(0.0, MelodyPhrase::end_seconds)
    }

    /// Lowest and highest pitch, or `None` for an empty melody.
    pub fn pitch_span(&self) -> Option<(i32, i32)> {
        let mut pitches = self.notes().map(|n| n.pitch);
        let first = pitches.next()?;
        Some(pitches.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Check scale membership, positive durations, in-range velocities, and
    /// exact note contiguity within each phrase.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (pi, phrase) in self.phrases.iter().enumerate() {
            let mut expected = phrase.start_seconds;
            for (ni, note) in phrase.notes.iter().enumerate() {
                if !self.key.contains(note.pitch) {
                    return Err(InvariantViolation::OutOfScale {
                        phrase: pi,
                        note: ni,
                        pitch: note.pitch,
                        scale: self.key.scale,
                    });
                }
                if note.duration_seconds.is_nan() || note.duration_seconds <= 0.0 {
                    return Err(InvariantViolation::NonPositiveDuration {
                        phrase: pi,
                        note: ni,
                        duration: note.duration_seconds,
                    });
                }
                if !(1..=127).contains(&note.velocity) {
                    return Err(InvariantViolation::VelocityOutOfRange {
                        phrase: pi,
                        note: ni,
                        velocity: note.velocity,
                    });
                }
                if note.onset_seconds != expected {
                    return Err(InvariantViolation::Discontiguous {
                        phrase: pi,
                        note: ni,
                        onset: note.onset_seconds,
                        expected,
                    });
                }
                expected = note.end_seconds();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::ScaleName;

    fn note(pitch: i32, onset: f64, duration: f64) -> MelodyNote {
        MelodyNote {
            pitch,
            duration_seconds: duration,
            velocity: 80,
            syllable_label: "la".into(),
            onset_seconds: onset,
            stressed: false,
        }
    }

    fn features() -> AudioFeatures {
        AudioFeatures {
            tempo: 120.0,
            key: "C4".into(),
            time_signature: "4/4".into(),
            energy: 0.7,
            valence: 0.5,
            danceability: 0.6,
            acousticness: 0.3,
            instrumentalness: 0.1,
        }
    }

    fn phrase(start: f64, notes: Vec<MelodyNote>) -> MelodyPhrase {
        MelodyPhrase {
            notes,
            start_seconds: start,
            sentiment: 0.25,
            source_line: "la la".into(),
        }
    }

    #[test]
    fn test_aggregates_computed_from_phrases() {
        let key = MusicalKey::new(60, ScaleName::Major);
        let melody = GeneratedMelody::new(
            key,
            vec![
                phrase(0.0, vec![note(72, 0.0, 0.5), note(74, 0.5, 0.75)]),
                phrase(1.25, vec![note(76, 1.25, 0.5)]),
            ],
            features(),
        );
        assert_eq!(melody.note_count, 3);
        assert_eq!(melody.total_duration_seconds, 1.75);
        assert_eq!(melody.end_seconds(), 1.75);
        assert_eq!(melody.emotional_arc, vec![0.25, 0.25]);
        assert_eq!(melody.pitch_span(), Some((72, 76)));
        assert!(melody.check_invariants().is_ok());
    }

    #[test]
    fn test_total_duration_is_plain_note_sum() {
        let key = MusicalKey::new(60, ScaleName::Major);
        let durations = [0.1, 0.2, 0.3, 0.7, 0.35, 0.15];
        let mut notes = Vec::new();
        let mut t = 0.0;
        for d in durations {
            notes.push(note(72, t, d));
            t += d;
        }
        let second = notes.split_off(3);
        let start = second[0].onset_seconds;
        let melody =
            GeneratedMelody::new(key, vec![phrase(0.0, notes), phrase(start, second)], features());
        let sum: f64 = durations.iter().sum();
        assert_eq!(melody.total_duration_seconds, sum);
    }

    #[test]
    fn test_empty_melody() {
        let key = MusicalKey::new(60, ScaleName::Major);
        let melody = GeneratedMelody::new(key, vec![], features());
        assert_eq!(melody.note_count, 0);
        assert_eq!(melody.total_duration_seconds, 0.0);
        assert_eq!(melody.pitch_span(), None);
        assert!(melody.check_invariants().is_ok());
    }

    #[test]
    fn test_detects_out_of_scale_pitch() {
        let key = MusicalKey::new(60, ScaleName::Major);
        let phrases = vec![phrase(0.0, vec![note(61, 0.0, 0.5)])];
        let melody = GeneratedMelody::new(key, phrases, features());
        assert!(matches!(
            melody.check_invariants(),
            Err(InvariantViolation::OutOfScale { pitch: 61, .. })
        ));
    }

    #[test]
    fn test_detects_gap() {
        let key = MusicalKey::new(60, ScaleName::Major);
        let melody = GeneratedMelody::new(
            key,
            vec![phrase(0.0, vec![note(60, 0.0, 0.5), note(62, 0.6, 0.5)])],
            features(),
        );
        assert!(matches!(
            melody.check_invariants(),
            Err(InvariantViolation::Discontiguous { note: 1, .. })
        ));
    }

    #[test]
    fn test_detects_zero_duration_and_velocity() {
        let key = MusicalKey::new(60, ScaleName::Major);
        let phrases = vec![phrase(0.0, vec![note(60, 0.0, 0.0)])];
        let melody = GeneratedMelody::new(key, phrases, features());
        assert!(matches!(
            melody.check_invariants(),
            Err(InvariantViolation::NonPositiveDuration { .. })
        ));

        let mut silent = note(60, 0.0, 0.5);
        silent.velocity = 0;
        let melody = GeneratedMelody::new(key, vec![phrase(0.0, vec![silent])], features());
        assert!(matches!(
            melody.check_invariants(),
            Err(InvariantViolation::VelocityOutOfRange { velocity: 0, .. })
        ));
    }
}
