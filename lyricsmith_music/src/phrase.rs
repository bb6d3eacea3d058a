// Phrase synthesis: one melodic phrase per lyric line, one note per syllable.
//
// A running pitch cursor starts an octave above the key root and moves once
// per syllable: up for stressed syllables, down for unstressed ones, pushed
// further by the word's sentiment, plus a small random nudge. Each cursor
// position is snapped into the scale to give the sung pitch; the cursor
// itself keeps the unsnapped value, so snapping never accumulates.
//
// Durations and velocities follow stress and the magnitude of the word's
// sentiment. Durations are written for 120 BPM and scaled by 120 / tempo.
//
// Notes are laid end to end from the caller's start time: each onset is the
// previous onset plus the previous duration, computed by the same running
// sum, so there is never a gap or overlap inside a phrase.

use crate::analysis::LineAnalysis;
use crate::scale::MusicalKey;
use lyricsmith_prng::SongRng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Tempo at which the base durations apply.
pub const REFERENCE_TEMPO: f64 = 120.0;

/// Cursor movement before sentiment and jitter.
const STRESSED_STEP: i32 = 2;
const UNSTRESSED_STEP: i32 = -1;

/// Seconds at the reference tempo.
const STRESSED_DURATION: f64 = 0.75;
const UNSTRESSED_DURATION: f64 = 0.5;
const SENTIMENT_DURATION: f64 = 0.25;

const STRESSED_VELOCITY: i32 = 90;
const UNSTRESSED_VELOCITY: i32 = 70;
const SENTIMENT_VELOCITY: f64 = 20.0;
const MIN_VELOCITY: i32 = 40;
const MAX_VELOCITY: i32 = 127;

/// Weights of the jitter values -1, 0, +1.
const JITTER_WEIGHTS: [f64; 3] = [0.2, 0.6, 0.2];

/// A single sung note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelodyNote {
    /// Absolute MIDI pitch; always in the key's scale.
    pub pitch: i32,
    pub duration_seconds: f64,
    /// MIDI velocity, 40-127.
    pub velocity: u8,
    /// The syllable sung on this note.
    pub syllable_label: String,
    pub onset_seconds: f64,
    pub stressed: bool,
}

impl MelodyNote {
    pub fn end_seconds(&self) -> f64 {
        self.onset_seconds + self.duration_seconds
    }
}

/// The melodic rendering of one lyric line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelodyPhrase {
    pub notes: Vec<MelodyNote>,
    pub start_seconds: f64,
    /// The line's sentiment.
    pub sentiment: f64,
    pub source_line: String,
}

impl MelodyPhrase {
    /// Where the next phrase should start.
    pub fn end_seconds(&self) -> f64 {
        self.notes.last().map_or(self.start_seconds, MelodyNote::end_seconds)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.notes.iter().map(|n| n.duration_seconds).sum()
    }
}

/// Cursor step for one syllable, before jitter.
pub fn contour_step(stressed: bool, word_sentiment: f64) -> i32 {
    let base = if stressed { STRESSED_STEP } else { UNSTRESSED_STEP };
    base + (2.0 * word_sentiment).round() as i32
}

/// Note length in seconds at `tempo` BPM.
pub fn note_duration(stressed: bool, word_sentiment: f64, tempo: f64) -> f64 {
    let base = if stressed { STRESSED_DURATION } else { UNSTRESSED_DURATION };
    (base + SENTIMENT_DURATION * word_sentiment.abs()) * (REFERENCE_TEMPO / tempo)
}

pub fn note_velocity(stressed: bool, word_sentiment: f64) -> u8 {
    let base = if stressed { STRESSED_VELOCITY } else { UNSTRESSED_VELOCITY };
    let v = base + (SENTIMENT_VELOCITY * word_sentiment.abs()).round() as i32;
    v.clamp(MIN_VELOCITY, MAX_VELOCITY) as u8
}

/// Random cursor nudge in {-1, 0, +1}, weighted toward 0.
fn jitter(rng: &mut SongRng) -> i32 {
    match rng.weighted_index(&JITTER_WEIGHTS) {
        Some(0) => -1,
        Some(2) => 1,
        _ => 0,
    }
}

/// Turns analyzed lyric lines into melodic phrases.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhraseSynthesizer;

impl PhraseSynthesizer {
    pub fn new() -> Self {
        PhraseSynthesizer
    }

    /// Synthesize the phrase for `line`, starting at `cursor_seconds`.
    ///
    /// `tempo` must be positive; the orchestrator validates it before any
    /// phrase is built.
    pub fn synthesize(
        &self,
        line: &LineAnalysis,
        key: &MusicalKey,
        tempo: f64,
        cursor_seconds: f64,
        rng: &mut SongRng,
    ) -> MelodyPhrase {
        let mut notes = Vec::with_capacity(line.syllable_count);
        let mut pitch_cursor = key.root_pitch + 12;
        let mut time_cursor = cursor_seconds;

        for word in &line.words {
            for (syllable, &stressed) in word.syllables.iter().zip(&word.stress) {
                pitch_cursor += contour_step(stressed, word.sentiment) + jitter(rng);
                let pitch = key.quantize(pitch_cursor);
                let duration_seconds = note_duration(stressed, word.sentiment, tempo);

                notes.push(MelodyNote {
                    pitch,
                    duration_seconds,
                    velocity: note_velocity(stressed, word.sentiment),
                    syllable_label: syllable.clone(),
                    onset_seconds: time_cursor,
                    stressed,
                });
                time_cursor += duration_seconds;
            }
        }

        trace!(
            line = %line.text,
            notes = notes.len(),
            start = cursor_seconds,
            end = time_cursor,
            "synthesized phrase"
        );

        MelodyPhrase {
            notes,
            start_seconds: cursor_seconds,
            sentiment: line.sentiment,
            source_line: line.text.clone(),
        }
    }
}
