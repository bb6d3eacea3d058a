// Vocal configuration and symbolic vocal guidance.
//
// `VocalSettings` describe the singer a renderer should imitate. Requests
// may supply their own; otherwise defaults come from the requested voice
// type and the genre's articulation style.
//
// `VocalGuide` is the symbolic input a vocal synthesizer would consume:
// letter-level timing under each note, a sampled pitch contour in Hz with
// small random wobble, a per-note amplitude envelope, and effect settings.
// Contour and dynamics are sampled at 10 points per second of note, with at
// least one and at most 64 points per note, so the guide stays linear in
// the note count whatever the tempo.
//
// Nothing here produces audio. `VocalRenderer` is the seam for a future
// synthesizer; the only implementation reports that rendering is missing.

use crate::error::{RenderError, ValidationError};
use crate::melody::GeneratedMelody;
use crate::style::GenreProfile;
use lyricsmith_prng::SongRng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_VOICE_TYPE: &str = "male_lead";
/// C4 to C6.
pub const DEFAULT_PITCH_RANGE: (i32, i32) = (60, 84);
pub const DEFAULT_VIBRATO: f64 = 0.3;
pub const DEFAULT_BREATH_CONTROL: f64 = 0.7;

/// Contour and dynamics samples per second of note.
const SAMPLES_PER_SECOND: f64 = 10.0;
/// Upper bound on samples for one note. The longest note at 20 BPM is 6 s.
const MAX_SAMPLES_PER_NOTE: usize = 64;
/// Standard deviation of contour wobble, in Hz.
const CONTOUR_WOBBLE_HZ: f64 = 2.0;
/// Fraction of a note spent in attack, and where release begins.
const ATTACK_FRACTION: f64 = 0.1;
const RELEASE_START: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocalSettings {
    pub voice_type: String,
    /// Inclusive MIDI pitch range (low, high).
    pub pitch_range: (i32, i32),
    pub vibrato_intensity: f64,
    pub breath_control: f64,
    pub articulation_style: String,
}

impl VocalSettings {
    /// Defaults for a voice type (or "male_lead") in a genre.
    pub fn defaults_for(voice_type: Option<&str>, genre: &GenreProfile) -> Self {
        let voice_type = voice_type
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_VOICE_TYPE);
        VocalSettings {
            voice_type: voice_type.to_string(),
            pitch_range: DEFAULT_PITCH_RANGE,
            vibrato_intensity: DEFAULT_VIBRATO,
            breath_control: DEFAULT_BREATH_CONTROL,
            articulation_style: genre.vocal_style.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("vibrato_intensity", self.vibrato_intensity),
            ("breath_control", self.breath_control),
        ] {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(ValidationError::VocalSettingOutOfRange { field, value });
            }
        }
        let (low, high) = self.pitch_range;
        if low > high || low < 0 || high > 127 {
            return Err(ValidationError::InvalidPitchRange { low, high });
        }
        Ok(())
    }
}

/// One letter sung over part of a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhonemeEvent {
    pub phoneme: String,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub pitch: i32,
    pub velocity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocalEffects {
    pub reverb: f64,
    pub chorus: f64,
    /// Hz.
    pub vibrato_rate: f64,
    pub vibrato_depth: f64,
    pub breath_noise: f64,
    pub compression: f64,
    pub eq_low: f64,
    pub eq_mid: f64,
    pub eq_high: f64,
}

impl VocalEffects {
    pub fn from_settings(settings: &VocalSettings) -> Self {
        VocalEffects {
            reverb: 0.3,
            chorus: 0.2,
            vibrato_rate: 5.0,
            vibrato_depth: settings.vibrato_intensity,
            breath_noise: 1.0 - settings.breath_control,
            compression: 0.6,
            eq_low: 0.0,
            eq_mid: 0.1,
            eq_high: 0.2,
        }
    }
}

/// Symbolic guidance for a vocal synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocalGuide {
    pub phonemes: Vec<PhonemeEvent>,
    pub pitch_contour_hz: Vec<f64>,
    /// Amplitude in [0, 1], sampled like the contour.
    pub dynamics: Vec<f64>,
    pub effects: VocalEffects,
}

impl VocalGuide {
    pub fn derive(melody: &GeneratedMelody, settings: &VocalSettings, rng: &mut SongRng) -> Self {
        let mut phonemes = Vec::new();
        let mut pitch_contour_hz = Vec::new();
        let mut dynamics = Vec::new();

        for note in melody.notes() {
            let letters: Vec<String> = note
                .syllable_label
                .chars()
                .filter(|c| c.is_alphabetic())
                .flat_map(char::to_lowercase)
                .map(String::from)
                .collect();
            let letters = if letters.is_empty() {
                vec!["-".to_string()]
            } else {
                letters
            };

            let step = note.duration_seconds / letters.len() as f64;
            let mut t = note.onset_seconds;
            for phoneme in letters {
                phonemes.push(PhonemeEvent {
                    phoneme,
                    start_seconds: t,
                    duration_seconds: step,
                    pitch: note.pitch,
                    velocity: note.velocity,
                });
                t += step;
            }

            let points = sample_points(note.duration_seconds);
            let hz = midi_to_hz(note.pitch);
            let amplitude = f64::from(note.velocity) / 127.0;
            for i in 0..points {
                pitch_contour_hz.push(hz + rng.gaussian(0.0, CONTOUR_WOBBLE_HZ));
                dynamics.push(amplitude * envelope(i, points));
            }
        }

        VocalGuide {
            phonemes,
            pitch_contour_hz,
            dynamics,
            effects: VocalEffects::from_settings(settings),
        }
    }
}

/// Equal-tempered frequency, A4 (69) = 440 Hz.
pub fn midi_to_hz(pitch: i32) -> f64 {
    440.0 * 2f64.powf(f64::from(pitch - 69) / 12.0)
}

fn sample_points(duration_seconds: f64) -> usize {
    ((duration_seconds * SAMPLES_PER_SECOND) as usize).clamp(1, MAX_SAMPLES_PER_NOTE)
}

/// Linear attack over the first tenth, flat, then linear release over the
/// last fifth.
fn envelope(i: usize, points: usize) -> f64 {
    let (i, n) = (i as f64, points as f64);
    if i < n * ATTACK_FRACTION {
        i / (n * ATTACK_FRACTION)
    } else if i > n * RELEASE_START {
        (n - i) / (n * (1.0 - RELEASE_START))
    } else {
        1.0
    }
}

/// Turns a vocal guide into audio.
pub trait VocalRenderer {
    /// Render to encoded audio bytes.
    fn render(&self, guide: &VocalGuide, settings: &VocalSettings) -> Result<Vec<u8>, RenderError>;
}

/// Placeholder renderer; always fails with `RenderError::NotImplemented`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnimplementedVocalRenderer;

impl VocalRenderer for UnimplementedVocalRenderer {
    fn render(
        &self,
        _guide: &VocalGuide,
        _settings: &VocalSettings,
    ) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::NotImplemented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::AudioFeatureDeriver;
    use crate::phrase::{MelodyNote, MelodyPhrase};
    use crate::scale::{MusicalKey, ScaleName};
    use crate::style::StyleTables;

    fn melody(notes: Vec<MelodyNote>) -> GeneratedMelody {
        let styles = StyleTables::default_tables();
        let key = MusicalKey::new(57, ScaleName::Minor);
        let features = AudioFeatureDeriver::new(&styles).derive("pop", "", 120.0, &key);
        GeneratedMelody::new(
            key,
            vec![MelodyPhrase {
                notes,
                start_seconds: 0.0,
                sentiment: 0.0,
                source_line: "Ah".into(),
            }],
            features,
        )
    }

    fn note(label: &str, onset: f64, duration: f64) -> MelodyNote {
        MelodyNote {
            pitch: 69,
            duration_seconds: duration,
            velocity: 127,
            syllable_label: label.into(),
            onset_seconds: onset,
            stressed: true,
        }
    }

    fn settings() -> VocalSettings {
        VocalSettings::defaults_for(None, StyleTables::default_tables().genre_or_default("pop"))
    }

    #[test]
    fn test_defaults_follow_genre() {
        let styles = StyleTables::default_tables();
        let rock =
            VocalSettings::defaults_for(Some("female_lead"), styles.genre_or_default("rock"));
        assert_eq!(rock.voice_type, "female_lead");
        assert_eq!(rock.articulation_style, "powerful_raspy");
        assert_eq!(rock.pitch_range, (60, 84));

        let blank = VocalSettings::defaults_for(Some("  "), styles.genre_or_default("zydeco"));
        assert_eq!(blank.voice_type, "male_lead");
        assert_eq!(blank.articulation_style, "clear_melodic");
        assert!(blank.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut s = settings();
        s.vibrato_intensity = 1.5;
        assert_eq!(
            s.validate(),
            Err(ValidationError::VocalSettingOutOfRange {
                field: "vibrato_intensity",
                value: 1.5
            })
        );

        let mut s = settings();
        s.pitch_range = (84, 60);
        assert_eq!(s.validate(), Err(ValidationError::InvalidPitchRange { low: 84, high: 60 }));
    }

    #[test]
    fn test_phonemes_split_note_evenly() {
        let m = melody(vec![note("Night", 0.0, 1.0), note("--", 1.0, 0.5)]);
        let guide = VocalGuide::derive(&m, &settings(), &mut SongRng::new(3));
        let letters: Vec<&str> = guide.phonemes.iter().map(|p| p.phoneme.as_str()).collect();
        assert_eq!(letters, ["n", "i", "g", "h", "t", "-"]);
        assert_eq!(guide.phonemes[1].start_seconds, 0.2);
        assert_eq!(guide.phonemes[5].start_seconds, 1.0);
        assert_eq!(guide.phonemes[5].duration_seconds, 0.5);
    }

    #[test]
    fn test_contour_and_dynamics_sampling() {
        let m = melody(vec![note("ah", 0.0, 1.0), note("oh", 1.0, 0.05)]);
        let guide = VocalGuide::derive(&m, &settings(), &mut SongRng::new(3));
        // 10 points for the first note, 1 for the short one.
        assert_eq!(guide.pitch_contour_hz.len(), 11);
        assert_eq!(guide.dynamics.len(), 11);
        for hz in &guide.pitch_contour_hz {
            assert!((hz - 440.0).abs() < 20.0, "contour {hz} strays too far from A4");
        }
        // Attack starts silent, sustain is full velocity, release tapers.
        assert_eq!(guide.dynamics[0], 0.0);
        assert_eq!(guide.dynamics[5], 1.0);
        assert!((guide.dynamics[9] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sampling_is_bounded_per_note() {
        let m = melody(vec![note("ah", 0.0, 6.0), note("oh", 6.0, 1e6)]);
        let guide = VocalGuide::derive(&m, &settings(), &mut SongRng::new(4));
        assert_eq!(guide.pitch_contour_hz.len(), 60 + MAX_SAMPLES_PER_NOTE);
        assert_eq!(guide.dynamics.len(), guide.pitch_contour_hz.len());
        assert_eq!(sample_points(f64::INFINITY), MAX_SAMPLES_PER_NOTE);
    }

    #[test]
    fn test_effects_from_settings() {
        let mut s = settings();
        s.vibrato_intensity = 0.6;
        s.breath_control = 0.9;
        let fx = VocalEffects::from_settings(&s);
        assert_eq!(fx.vibrato_depth, 0.6);
        assert!((fx.breath_noise - 0.1).abs() < 1e-12);
        assert_eq!(fx.vibrato_rate, 5.0);
    }

    #[test]
    fn test_midi_to_hz() {
        assert_eq!(midi_to_hz(69), 440.0);
        assert!((midi_to_hz(81) - 880.0).abs() < 1e-9);
        assert!((midi_to_hz(60) - 261.6256).abs() < 1e-3);
    }

    #[test]
    fn test_renderer_is_unimplemented() {
        let m = melody(vec![note("ah", 0.0, 1.0)]);
        let s = settings();
        let guide = VocalGuide::derive(&m, &s, &mut SongRng::new(1));
        assert_eq!(
            UnimplementedVocalRenderer.render(&guide, &s),
            Err(RenderError::NotImplemented)
        );
    }
}
