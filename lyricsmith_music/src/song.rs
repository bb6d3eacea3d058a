// Song requests and finished song records.
//
// `SongGenerationRequest` is the whole input surface of the engine. Only
// title and lyrics are required; genre defaults to "pop", mood to none, and
// tempo, vocals, vocal settings and structure are filled from the genre
// profile when absent. Requests deserialize from JSON with the same
// defaults.
//
// `Song` is an immutable value. Edits (`retitled`, `with_vocals`) return a
// new `Song` and leave the original untouched.

use crate::analysis::{LyricsSummary, content_lines};
use crate::error::ValidationError;
use crate::melody::GeneratedMelody;
use crate::style::{MAX_TEMPO_BPM, MIN_TEMPO_BPM};
use crate::vocals::{VocalEffects, VocalGuide, VocalSettings};
use chrono::{DateTime, Utc};
use lyricsmith_prng::SongRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_GENRE: &str = "pop";

fn default_genre() -> String {
    DEFAULT_GENRE.to_string()
}

/// Input to `SongOrchestrator::generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongGenerationRequest {
    pub title: String,
    pub lyrics: String,
    #[serde(default = "default_genre")]
    pub genre: String,
    /// Mood tag; empty or unknown means "infer from the lyrics".
    #[serde(default)]
    pub mood: String,
    /// BPM, within 20-300. Drawn from the genre's range when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,
    /// Voice type for default vocal settings, e.g. "female_lead".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocals: Option<String>,
    /// Full vocal settings; wins over `vocals` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocal_settings: Option<VocalSettings>,
    /// Section list; the genre's structure when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Vec<String>>,
}

impl SongGenerationRequest {
    pub fn new(title: impl Into<String>, lyrics: impl Into<String>) -> Self {
        SongGenerationRequest {
            title: title.into(),
            lyrics: lyrics.into(),
            genre: default_genre(),
            mood: String::new(),
            tempo: None,
            vocals: None,
            vocal_settings: None,
            structure: None,
        }
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = mood.into();
        self
    }

    pub fn tempo(mut self, tempo: f64) -> Self {
        self.tempo = Some(tempo);
        self
    }

    pub fn vocals(mut self, voice_type: impl Into<String>) -> Self {
        self.vocals = Some(voice_type.into());
        self
    }

    pub fn vocal_settings(mut self, settings: VocalSettings) -> Self {
        self.vocal_settings = Some(settings);
        self
    }

    pub fn structure(mut self, sections: Vec<String>) -> Self {
        self.structure = Some(sections);
        self
    }

    /// Reject requests that cannot produce a song, before any work is done.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if content_lines(&self.lyrics).next().is_none() {
            return Err(ValidationError::EmptyLyrics);
        }
        if let Some(tempo) = self.tempo {
            if !(tempo.is_finite() && tempo > 0.0) {
                return Err(ValidationError::InvalidTempo(tempo));
            }
            if !(MIN_TEMPO_BPM..=MAX_TEMPO_BPM).contains(&tempo) {
                return Err(ValidationError::TempoOutOfRange(tempo));
            }
        }
        if let Some(settings) = &self.vocal_settings {
            settings.validate()?;
        }
        Ok(())
    }
}

/// Random UUID v4 identifying a generated song.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SongId([u8; 16]);

impl SongId {
    pub fn new_v4(rng: &mut SongRng) -> Self {
        let mut bytes = rng.next_128_bits();
        // Version 4.
        bytes[6] = (bytes[6] & 0x0F) | 0x40;
        // RFC 4122 variant.
        bytes[8] = (bytes[8] & 0x3F) | 0x80;
        SongId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// A string that is not 32 hex digits (dashes ignored).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid song id: {0:?}")]
pub struct ParseSongIdError(String);

impl FromStr for SongId {
    type Err = ParseSongIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex: String = s.chars().filter(|c| *c != '-').collect();
        if hex.len() != 32 || !hex.is_ascii() {
            return Err(ParseSongIdError(s.to_string()));
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| ParseSongIdError(s.to_string()))?;
        }
        Ok(SongId(bytes))
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SongId({self})")
    }
}

// Serialized as the 8-4-4-4-12 string so ids read naturally in JSON.
impl Serialize for SongId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SongId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Placeholder audio location for a title. No file is written there.
pub fn audio_ref_for(title: &str) -> String {
    format!("/generated/{}.wav", slug(title))
}

/// Lowercase, with runs of anything but letters and digits collapsed to
/// one underscore.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_sep = false;
    for ch in title.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        out.push_str("untitled");
    }
    out
}

/// A finished song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub lyrics: String,
    pub genre: String,
    pub mood: String,
    pub tempo: f64,
    /// Section names, in order.
    pub structure: Vec<String>,
    /// Descriptive stats of the lyrics the melody was built from.
    pub lyrics_summary: LyricsSummary,
    pub melody: GeneratedMelody,
    pub vocals: VocalSettings,
    pub vocal_guide: VocalGuide,
    /// Where rendered audio would live. Never resolved by this crate.
    pub audio_ref: String,
    pub created_at: DateTime<Utc>,
}

impl Song {
    /// A copy with a new title and matching audio reference.
    pub fn retitled(&self, title: impl Into<String>) -> Result<Song, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(Song {
            audio_ref: audio_ref_for(&title),
            title,
            ..self.clone()
        })
    }

    /// A copy with different vocal settings. The guide's timing and
    /// contour are kept; its effects follow the new settings.
    pub fn with_vocals(&self, vocals: VocalSettings) -> Result<Song, ValidationError> {
        vocals.validate()?;
        let mut vocal_guide = self.vocal_guide.clone();
        vocal_guide.effects = VocalEffects::from_settings(&vocals);
        Ok(Song {
            vocals,
            vocal_guide,
            ..self.clone()
        })
    }
}
