// Error types for song generation and its collaborators.
//
// `ValidationError` covers requests rejected before any computation.
// `GenerationError` is what `SongOrchestrator::generate` returns: either a
// validation failure or an internal failure tagged with the pipeline stage
// it happened in, with the original cause kept as `source`.
//
// Export and vocal rendering have their own errors since they run after a
// song already exists.

use crate::export::ExportFormat;
use std::fmt;

/// Pipeline stages of one `generate` call, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Validating,
    AnalyzingLyrics,
    SelectingKey,
    SynthesizingPhrases,
    DerivingFeatures,
    DerivingVocalDefaults,
    Assembled,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GenerationStage::Validating => "validating",
            GenerationStage::AnalyzingLyrics => "analyzing lyrics",
            GenerationStage::SelectingKey => "selecting key",
            GenerationStage::SynthesizingPhrases => "synthesizing phrases",
            GenerationStage::DerivingFeatures => "deriving features",
            GenerationStage::DerivingVocalDefaults => "deriving vocal defaults",
            GenerationStage::Assembled => "assembling",
        };
        f.write_str(s)
    }
}

/// A request that cannot be generated as given.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is empty")]
    EmptyTitle,

    #[error("lyrics contain no non-empty lines")]
    EmptyLyrics,

    #[error("tempo {0} BPM must be a positive, finite number")]
    InvalidTempo(f64),

    #[error("tempo {0} BPM is outside the supported 20-300 BPM")]
    TempoOutOfRange(f64),

    #[error("vocal setting `{field}` = {value} is outside [0, 1]")]
    VocalSettingOutOfRange { field: &'static str, value: f64 },

    #[error("vocal pitch range ({low}, {high}) is inverted or outside MIDI 0-127")]
    InvalidPitchRange { low: i32, high: i32 },
}

/// Failure of a `generate` call. No partial song accompanies it.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid song request: {0}")]
    Validation(#[from] ValidationError),

    #[error("song generation failed while {stage}: {source}")]
    Stage {
        stage: GenerationStage,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl GenerationError {
    pub fn stage(
        stage: GenerationStage,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        GenerationError::Stage {
            stage,
            source: source.into(),
        }
    }

    /// True for requests rejected up front; retrying the same request
    /// cannot succeed.
    pub fn is_validation(&self) -> bool {
        matches!(self, GenerationError::Validation(_))
    }
}

/// A melody that breaks one of the structural guarantees.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("phrase {phrase} note {note}: pitch {pitch} is outside the {scale} scale")]
    OutOfScale {
        phrase: usize,
        note: usize,
        pitch: i32,
        scale: crate::scale::ScaleName,
    },

    #[error("phrase {phrase} note {note}: duration {duration} is not positive")]
    NonPositiveDuration {
        phrase: usize,
        note: usize,
        duration: f64,
    },

    #[error(
        "phrase {phrase} note {note}: onset {onset} does not follow the previous note's end \
         {expected}"
    )]
    Discontiguous {
        phrase: usize,
        note: usize,
        onset: f64,
        expected: f64,
    },

    #[error("phrase {phrase} note {note}: velocity {velocity} is outside 1-127")]
    VelocityOutOfRange {
        phrase: usize,
        note: usize,
        velocity: u8,
    },
}

/// Failure encoding a finished song.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{0} export is not implemented")]
    Unsupported(ExportFormat),

    #[error("MIDI encoding failed: {0}")]
    Midi(String),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("song has no notes to export")]
    Empty,
}

/// Failure producing vocal audio.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("vocal rendering is not implemented")]
    NotImplemented,
}
