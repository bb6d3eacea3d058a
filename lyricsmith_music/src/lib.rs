// Lyricsmith melody engine
//
// Turns song lyrics plus a few style tags (genre, mood, optional tempo) into
// a symbolic song: a scale-quantized melody with one note per syllable, a
// set of descriptive audio features, vocal settings, and a vocal guide.
// There is no learned model and no audio synthesis; everything comes from
// lookup tables, orthographic heuristics, and a seeded random source.
//
// Architecture:
// - scale.rs: Scale degree tables, musical keys, pitch snapping, note names
// - style.rs: Mood and genre tables loaded from JSON
// - analysis.rs: Line/word/syllable segmentation and per-line sentiment
// - key.rs: Key selection from the emotional arc and mood tag
// - phrase.rs: Per-line pitch contour, duration, velocity, and timing
// - features.rs: Audio feature tags from genre and mood
// - melody.rs: The assembled melody and its structural checks
// - vocals.rs: Vocal settings, the symbolic vocal guide, and the renderer seam
// - song.rs: Requests, song ids, and the finished `Song` record
// - orchestrator.rs: The staged pipeline from request to `Song`
// - export.rs: MIDI and JSON export (audio export is a stub)
// - error.rs: Error types shared across the pipeline
//
// Generation is deterministic given the request, the `SongRng` seed, and the
// creation timestamp.

pub mod analysis;
pub mod error;
pub mod export;
pub mod features;
pub mod key;
pub mod melody;
pub mod orchestrator;
pub mod phrase;
pub mod scale;
pub mod song;
pub mod style;
pub mod vocals;

pub use error::{ExportError, GenerationError, GenerationStage, RenderError, ValidationError};
pub use export::{ExportFormat, JsonExporter, MidiExporter, SongExporter, WavExporter};
pub use orchestrator::SongOrchestrator;
pub use song::{Song, SongGenerationRequest, SongId};
