// End-to-end song generation.
//
// `SongOrchestrator` owns the lexicon and style tables and runs one request
// through the pipeline:
//
//   validate -> analyze lyrics -> select key -> synthesize one phrase per
//   line -> derive audio features -> vocal settings and guide -> Song
//
// Each stage is logged at debug level inside a `generate_song` span. A
// failure at any stage aborts the whole call; there is no partial song and
// no internal retry. A caller that wants a different result retries with a
// different seed.
//
// Random draws happen in a fixed order (default tempo, key root, contour
// jitter per syllable, vocal contour wobble, song id), so one seed always
// gives one song.
//
// The orchestrator holds no mutable state. One instance can serve any
// number of threads, each with its own `SongRng`.

use crate::analysis::LyricsAnalyzer;
use crate::error::{GenerationError, GenerationStage};
use crate::features::AudioFeatureDeriver;
use crate::key::KeySelector;
use crate::melody::GeneratedMelody;
use crate::phrase::PhraseSynthesizer;
use crate::song::{Song, SongGenerationRequest, SongId, audio_ref_for};
use crate::style::StyleTables;
use crate::vocals::{VocalGuide, VocalSettings};
use chrono::{DateTime, Utc};
use lyricsmith_lang::{Lexicon, default_lexicon};
use lyricsmith_prng::SongRng;
use tracing::{debug, info, info_span};

#[derive(Debug, Clone)]
pub struct SongOrchestrator {
    lexicon: Lexicon,
    styles: StyleTables,
}

impl SongOrchestrator {
    pub fn new(lexicon: Lexicon, styles: StyleTables) -> Self {
        SongOrchestrator { lexicon, styles }
    }

    /// An orchestrator over the embedded default tables.
    pub fn with_defaults() -> Self {
        Self::new(default_lexicon(), StyleTables::default_tables())
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn styles(&self) -> &StyleTables {
        &self.styles
    }

    /// Generate a song stamped with the current time.
    pub fn generate(
        &self,
        request: &SongGenerationRequest,
        rng: &mut SongRng,
    ) -> Result<Song, GenerationError> {
        self.generate_at(request, rng, Utc::now())
    }

    /// Generate a song with an explicit creation time. Same request, same
    /// seed, and same time give an identical song.
    pub fn generate_at(
        &self,
        request: &SongGenerationRequest,
        rng: &mut SongRng,
        created_at: DateTime<Utc>,
    ) -> Result<Song, GenerationError> {
        let span = info_span!("generate_song", title = %request.title, genre = %request.genre);
        let _enter = span.enter();

        debug!(stage = %GenerationStage::Validating, "stage");
        request.validate()?;
        let genre = self.styles.genre_or_default(&request.genre);
        let tempo = match request.tempo {
            Some(tempo) => tempo,
            None => genre
                .draw_tempo(rng)
                .map_err(|e| GenerationError::stage(GenerationStage::Validating, e))?,
        };

        debug!(stage = %GenerationStage::AnalyzingLyrics, "stage");
        let analysis = LyricsAnalyzer::new(&self.lexicon).analyze(&request.lyrics);
        let arc = analysis.emotional_arc();
        let lyrics_summary = analysis.summary();
        debug!(
            lines = lyrics_summary.line_count,
            words = lyrics_summary.word_count,
            syllables = lyrics_summary.total_syllables,
            sentiment = ?lyrics_summary.sentiment,
            "lyrics analyzed"
        );

        debug!(stage = %GenerationStage::SelectingKey, "stage");
        let key = KeySelector::new(&self.styles).select(&arc, &request.mood, rng);
        debug!(%key, "key selected");

        debug!(stage = %GenerationStage::SynthesizingPhrases, "stage");
        let synth = PhraseSynthesizer::new();
        let mut cursor = 0.0;
        let mut phrases = Vec::with_capacity(analysis.lines.len());
        for line in &analysis.lines {
            let phrase = synth.synthesize(line, &key, tempo, cursor, rng);
            cursor = phrase.end_seconds();
            phrases.push(phrase);
        }

        debug!(stage = %GenerationStage::DerivingFeatures, "stage");
        let features = AudioFeatureDeriver::new(&self.styles).derive(
            &request.genre,
            &request.mood,
            tempo,
            &key,
        );
        let melody = GeneratedMelody::new(key, phrases, features);

        debug!(stage = %GenerationStage::DerivingVocalDefaults, "stage");
        let vocals = match &request.vocal_settings {
            Some(settings) => settings.clone(),
            None => VocalSettings::defaults_for(request.vocals.as_deref(), genre),
        };
        let vocal_guide = VocalGuide::derive(&melody, &vocals, rng);

        debug!(stage = %GenerationStage::Assembled, "stage");
        melody
            .check_invariants()
            .map_err(|e| GenerationError::stage(GenerationStage::Assembled, e))?;

        let structure = request
            .structure
            .clone()
            .unwrap_or_else(|| genre.structure.clone());

        info!(
            notes = melody.note_count,
            duration_seconds = melody.total_duration_seconds,
            key = %melody.key,
            tempo,
            "song generated"
        );

        Ok(Song {
            id: SongId::new_v4(rng),
            title: request.title.clone(),
            lyrics: request.lyrics.clone(),
            genre: request.genre.clone(),
            mood: request.mood.clone(),
            tempo,
            structure,
            lyrics_summary,
            melody,
            vocals,
            vocal_guide,
            audio_ref: audio_ref_for(&request.title),
            created_at,
        })
    }
}

impl Default for SongOrchestrator {
    fn default() -> Self {
        Self::with_defaults()
    }
}
