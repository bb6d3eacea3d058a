// End-to-end tests for song generation through `SongOrchestrator`.
//
// These exercise the public API only: request in, `Song` out, then the
// structural guarantees every song must meet and the two reference
// scenarios (bright pop lyrics and dark lyrics with no mood).

use chrono::{TimeZone, Utc};
use lyricsmith_music::analysis::{Complexity, SentimentLabel, content_lines};
use lyricsmith_music::key::DARK_ROOTS;
use lyricsmith_music::scale::ScaleName;
use lyricsmith_music::style::MIN_TEMPO_BPM;
use lyricsmith_music::vocals::{UnimplementedVocalRenderer, VocalRenderer};
use lyricsmith_music::{
    ExportError, ExportFormat, JsonExporter, MidiExporter, Song, SongExporter,
    SongGenerationRequest, SongOrchestrator, ValidationError, WavExporter,
};
use lyricsmith_music::error::RenderError;
use lyricsmith_prng::SongRng;
use pretty_assertions::assert_eq;

const BRIGHT: &str = "Love is all we need\nHold me close tonight";
const DARK: &str = "Tears fall in the dark\nI am lost and cold";
const LONG: &str = "\
Digital dreams are calling my name
Neon lights in the rain, beautiful and strange

We dance together forever tonight
Remember the sunshine, believe in the light
";

fn generate(request: &SongGenerationRequest, seed: u64) -> Song {
    SongOrchestrator::with_defaults()
        .generate(request, &mut SongRng::new(seed))
        .expect("generation should succeed")
}

fn assert_well_formed(song: &Song) {
    let melody = &song.melody;
    let key = melody.key;
    for phrase in &melody.phrases {
        let mut expected = phrase.start_seconds;
        for note in &phrase.notes {
            assert!(key.contains(note.pitch), "pitch {} outside {key}", note.pitch);
            assert!(note.duration_seconds > 0.0);
            assert!((1..=127).contains(&note.velocity));
            assert!(note.onset_seconds >= 0.0);
            assert_eq!(note.onset_seconds, expected);
            expected = note.onset_seconds + note.duration_seconds;
        }
    }

    let notes: usize = melody.phrases.iter().map(|p| p.notes.len()).sum();
    let duration: f64 = melody
        .phrases
        .iter()
        .flat_map(|p| &p.notes)
        .map(|n| n.duration_seconds)
        .sum();
    assert_eq!(melody.note_count, notes);
    assert_eq!(melody.total_duration_seconds, duration);
    assert!(melody.check_invariants().is_ok());
}

#[test]
fn bright_pop_scenario() {
    let request = SongGenerationRequest::new("Close", BRIGHT).genre("pop").mood("happy");
    for seed in 0..20 {
        let song = generate(&request, seed);
        assert_eq!(song.melody.key.scale, ScaleName::Major);
        assert_eq!(song.melody.phrases.len(), 2);
        assert_eq!(song.melody.phrases[0].notes.len(), 6);
        assert_eq!(song.melody.phrases[1].notes.len(), 6);
        assert!((100.0..=140.0).contains(&song.tempo), "tempo {}", song.tempo);
        assert_eq!(song.tempo.fract(), 0.0);
        assert_well_formed(&song);
    }
}

#[test]
fn dark_scenario_without_mood() {
    let request = SongGenerationRequest::new("Cold", DARK);
    for seed in 0..20 {
        let song = generate(&request, seed);
        assert_eq!(song.melody.key.scale, ScaleName::Minor);
        assert!(DARK_ROOTS.contains(&song.melody.key.root_pitch));
        assert_well_formed(&song);
    }
}

#[test]
fn one_phrase_per_non_empty_line() {
    let song = generate(&SongGenerationRequest::new("Neon", LONG).genre("electronic"), 9);
    let lines: Vec<&str> = content_lines(LONG).collect();
    assert_eq!(song.melody.phrases.len(), lines.len());
    for (phrase, line) in song.melody.phrases.iter().zip(&lines) {
        assert_eq!(phrase.source_line, *line);
    }
    assert_eq!(song.melody.emotional_arc.len(), lines.len());
    assert_well_formed(&song);
}

#[test]
fn phrases_follow_each_other() {
    let song = generate(&SongGenerationRequest::new("Neon", LONG).tempo(90.0), 4);
    assert_eq!(song.melody.phrases[0].start_seconds, 0.0);
    for pair in song.melody.phrases.windows(2) {
        assert_eq!(pair[1].start_seconds, pair[0].end_seconds());
    }
    assert!((song.melody.end_seconds() - song.melody.total_duration_seconds).abs() < 1e-9);
}

#[test]
fn every_mood_and_genre_is_well_formed() {
    let orchestrator = SongOrchestrator::with_defaults();
    let moods: Vec<String> = orchestrator.styles().mood_names().map(String::from).collect();
    let genres: Vec<String> = orchestrator.styles().genre_names().map(String::from).collect();
    for (i, mood) in moods.iter().enumerate() {
        for genre in &genres {
            let request = SongGenerationRequest::new("Grid", LONG).genre(genre).mood(mood);
            let song = orchestrator
                .generate(&request, &mut SongRng::new(i as u64))
                .unwrap();
            let profile = orchestrator.styles().mood(mood).unwrap();
            assert_eq!(song.melody.key.scale, profile.scale, "{mood}/{genre}");
            assert_well_formed(&song);
        }
    }
}

#[test]
fn empty_input_is_rejected() {
    let orchestrator = SongOrchestrator::with_defaults();
    for (title, lyrics, expected) in [
        ("Title", "", ValidationError::EmptyLyrics),
        ("Title", "   \n  ", ValidationError::EmptyLyrics),
        ("", "some words", ValidationError::EmptyTitle),
    ] {
        let err = orchestrator
            .generate(&SongGenerationRequest::new(title, lyrics), &mut SongRng::new(1))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), format!("invalid song request: {expected}"));
    }
}

#[test]
fn same_seed_same_song() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let orchestrator = SongOrchestrator::with_defaults();
    let request = SongGenerationRequest::new("Neon", LONG).mood("dreamy");
    let a = orchestrator.generate_at(&request, &mut SongRng::new(42), at).unwrap();
    let b = orchestrator.generate_at(&request, &mut SongRng::new(42), at).unwrap();
    assert_eq!(a, b);

    let c = orchestrator.generate_at(&request, &mut SongRng::new(43), at).unwrap();
    assert_ne!(a.id, c.id);
}

#[test]
fn unknown_genre_uses_pop_defaults() {
    let song = generate(&SongGenerationRequest::new("Odd", BRIGHT).genre("polka"), 3);
    assert!((100.0..=140.0).contains(&song.tempo));
    assert_eq!(song.vocals.articulation_style, "clear_melodic");
    assert_eq!(song.genre, "polka");
    // No genre override applies, so features stay at baseline.
    assert_eq!(song.melody.audio_features.danceability, 0.6);
    assert_eq!(song.melody.audio_features.acousticness, 0.3);
}

#[test]
fn song_record_fields() {
    let song = generate(
        &SongGenerationRequest::new("Love Song", BRIGHT).genre("rock").vocals("female_lead"),
        11,
    );
    assert_eq!(song.audio_ref, "/generated/love_song.wav");
    assert_eq!(song.vocals.voice_type, "female_lead");
    assert_eq!(song.vocals.pitch_range, (60, 84));
    assert_eq!(song.vocals.articulation_style, "powerful_raspy");
    assert_eq!(song.structure.first().map(String::as_str), Some("intro"));
    assert_eq!(song.id.to_string().len(), 36);
    assert!(!song.vocal_guide.phonemes.is_empty());
    assert_eq!(song.vocal_guide.pitch_contour_hz.len(), song.vocal_guide.dynamics.len());
}

#[test]
fn song_carries_lyrics_summary() {
    let song = generate(&SongGenerationRequest::new("Cold", DARK), 2);
    let summary = &song.lyrics_summary;
    assert_eq!(summary.line_count, song.melody.phrases.len());
    assert_eq!(summary.total_syllables, song.melody.note_count);
    assert_eq!(summary.word_count, 10);
    assert_eq!(summary.sentiment, SentimentLabel::Negative);
    assert_eq!(summary.complexity, Complexity::Low);
}

#[test]
fn slowest_tempo_keeps_vocal_guide_bounded() {
    let request = SongGenerationRequest::new("Drone", "la").tempo(MIN_TEMPO_BPM);
    let song = generate(&request, 1);
    assert_eq!(song.melody.note_count, 1);
    assert!(song.vocal_guide.pitch_contour_hz.len() <= 64);

    let err = SongOrchestrator::with_defaults()
        .generate(&request.clone().tempo(0.01), &mut SongRng::new(1))
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn edits_return_new_songs() {
    let song = generate(&SongGenerationRequest::new("First", BRIGHT), 5);
    let renamed = song.retitled("Second Take").unwrap();
    assert_eq!(renamed.title, "Second Take");
    assert_eq!(renamed.audio_ref, "/generated/second_take.wav");
    assert_eq!(renamed.melody, song.melody);
    assert_eq!(song.title, "First");
    assert!(song.retitled(" ").is_err());

    let mut vocals = song.vocals.clone();
    vocals.breath_control = 0.2;
    let revoiced = song.with_vocals(vocals).unwrap();
    assert!((revoiced.vocal_guide.effects.breath_noise - 0.8).abs() < 1e-12);
    assert_eq!(revoiced.vocal_guide.phonemes, song.vocal_guide.phonemes);
    assert_eq!(song.vocals.breath_control, 0.7);
}

#[test]
fn midi_export_parses_back() {
    let song = generate(&SongGenerationRequest::new("Midi", BRIGHT).tempo(120.0), 6);
    let bytes = MidiExporter.export(&song).unwrap();
    let smf = midly::Smf::parse(&bytes).unwrap();
    assert_eq!(smf.tracks.len(), 2);

    let note_ons = smf.tracks[1]
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                midly::TrackEventKind::Midi {
                    message: midly::MidiMessage::NoteOn { .. },
                    ..
                }
            )
        })
        .count();
    assert_eq!(note_ons, song.melody.note_count);
}

#[test]
fn json_export_round_trips() {
    let song = generate(&SongGenerationRequest::new("Json", DARK), 7);
    let bytes = JsonExporter.export(&song).unwrap();
    let back: Song = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(back.id, song.id);
    assert_eq!(back.melody.note_count, song.melody.note_count);
    assert_eq!(back.melody.key, song.melody.key);
}

#[test]
fn audio_collaborators_are_unimplemented() {
    let song = generate(&SongGenerationRequest::new("Quiet", DARK), 8);
    assert!(matches!(
        WavExporter.export(&song),
        Err(ExportError::Unsupported(ExportFormat::Wav))
    ));
    assert_eq!(
        UnimplementedVocalRenderer.render(&song.vocal_guide, &song.vocals),
        Err(RenderError::NotImplemented)
    );
}
