// Scales, keys, and pitch quantization.
//
// Melodies are built on one of seven scales (major, natural minor, dorian,
// mixolydian, both pentatonics, and the six-note blues scale), each a fixed
// set of semitone offsets from the key root. A `MusicalKey` pairs a scale
// with an absolute MIDI root.
//
// This module provides:
// - Scale degree tables and membership checks
// - Snapping a chromatic pitch to the nearest in-scale pitch
// - Note-name display ("C#4") for keys and pitches
//
// Used by key.rs (key selection), phrase.rs (contour quantization), and
// features.rs (key display name).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sharps-only note names, indexed by pitch class.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// The scales a melody can be quantized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleName {
    /// W W H W W W H
    Major,
    /// Natural minor (aeolian).
    Minor,
    /// Minor with a raised 6th.
    Dorian,
    /// Major with a lowered 7th.
    Mixolydian,
    /// Major without the 4th and 7th.
    PentatonicMajor,
    /// Minor without the 2nd and 6th.
    PentatonicMinor,
    /// Minor pentatonic plus the flat 5th.
    Blues,
}

impl ScaleName {
    pub const ALL: [ScaleName; 7] = [
        ScaleName::Major,
        ScaleName::Minor,
        ScaleName::Dorian,
        ScaleName::Mixolydian,
        ScaleName::PentatonicMajor,
        ScaleName::PentatonicMinor,
        ScaleName::Blues,
    ];

    /// Semitone offsets from the root, ascending.
    pub fn degrees(self) -> &'static [u8] {
        match self {
            ScaleName::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleName::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleName::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleName::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleName::PentatonicMajor => &[0, 2, 4, 7, 9],
            ScaleName::PentatonicMinor => &[0, 3, 5, 7, 10],
            ScaleName::Blues => &[0, 3, 5, 6, 7, 10],
        }
    }

    /// The 12 pitch classes that are in the scale, indexed by offset from
    /// the root.
    pub fn pitch_classes(self) -> [bool; 12] {
        let mut pcs = [false; 12];
        for &degree in self.degrees() {
            pcs[degree as usize] = true;
        }
        pcs
    }

    /// Snap a root-relative pitch class (0-11) to a scale degree.
    ///
    /// Distance is the plain absolute difference, not wrapped around the
    /// octave, and ties go to the first degree met in ascending order. So
    /// in C pentatonic major, B (11) snaps down to A (9) rather than up to
    /// C (12).
    pub fn nearest_degree(self, pitch_class: u8) -> u8 {
        let mut best = 0;
        let mut best_distance = u8::MAX;
        for &degree in self.degrees() {
            let distance = degree.abs_diff(pitch_class);
            if distance < best_distance {
                best = degree;
                best_distance = distance;
            }
        }
        best
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScaleName::Major => "major",
            ScaleName::Minor => "minor",
            ScaleName::Dorian => "dorian",
            ScaleName::Mixolydian => "mixolydian",
            ScaleName::PentatonicMajor => "pentatonic_major",
            ScaleName::PentatonicMinor => "pentatonic_minor",
            ScaleName::Blues => "blues",
        }
    }
}

impl fmt::Display for ScaleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scale anchored at an absolute MIDI root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicalKey {
    /// MIDI pitch of the root (60 = middle C).
    pub root_pitch: i32,
    pub scale: ScaleName,
}

impl MusicalKey {
    pub fn new(root_pitch: i32, scale: ScaleName) -> Self {
        MusicalKey { root_pitch, scale }
    }

    /// Pitch class of `pitch` relative to the root, in 0..12.
    pub fn relative_pitch_class(&self, pitch: i32) -> u8 {
        (pitch - self.root_pitch).rem_euclid(12) as u8
    }

    /// Check if a pitch (any octave) belongs to this key's scale.
    pub fn contains(&self, pitch: i32) -> bool {
        self.scale.pitch_classes()[self.relative_pitch_class(pitch) as usize]
    }

    /// Snap a chromatic pitch into the scale, keeping its octave relative
    /// to the root.
    ///
    /// The octave is `floor((pitch - root) / 12)`, so pitches below the
    /// root stay below it.
    pub fn quantize(&self, pitch: i32) -> i32 {
        let offset = pitch - self.root_pitch;
        let octave = offset.div_euclid(12);
        let degree = self.scale.nearest_degree(offset.rem_euclid(12) as u8);
        self.root_pitch + octave * 12 + degree as i32
    }

    /// Display name of the root, e.g. "D4".
    pub fn root_name(&self) -> String {
        note_name(self.root_pitch)
    }
}

impl fmt::Display for MusicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root_name(), self.scale)
    }
}

/// Note name with octave, where octave = floor(pitch / 12) - 1
/// (MIDI 60 is "C4").
pub fn note_name(pitch: i32) -> String {
    let name = NOTE_NAMES[pitch.rem_euclid(12) as usize];
    format!("{}{}", name, pitch.div_euclid(12) - 1)
}
