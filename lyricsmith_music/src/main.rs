// Lyricsmith CLI entry point.
//
// Generates one song from lyrics and writes it as MIDI and/or JSON.
//
// Usage:
//   cargo run -p lyricsmith_music --bin generate -- --lyrics-file song.txt
//     [--title T] [--genre G] [--mood M] [--tempo BPM] [--vocals VOICE]
//     [--seed N] [--midi out.mid] [--json out.json] [--out-dir DIR]
//     [--lexicon words.json] [--styles styles.json]
//
// `--out-dir` writes both MIDI and JSON, named after the title.
//
// Log verbosity follows RUST_LOG (default: info).

use anyhow::{Context, Result, bail};
use clap::Parser;
use lyricsmith_lang::{Lexicon, default_lexicon};
use lyricsmith_music::scale::note_name;
use lyricsmith_music::song::slug;
use lyricsmith_music::style::StyleTables;
use lyricsmith_music::{
    JsonExporter, MidiExporter, Song, SongExporter, SongGenerationRequest, SongOrchestrator,
};
use lyricsmith_prng::SongRng;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "generate")]
#[command(about = "Generate a melody from song lyrics")]
#[command(version)]
struct Cli {
    /// Lyrics text; use newlines to separate lines
    #[arg(long, conflicts_with = "lyrics_file")]
    lyrics: Option<String>,

    /// File containing the lyrics
    #[arg(long)]
    lyrics_file: Option<PathBuf>,

    #[arg(long, default_value = "Untitled")]
    title: String,

    #[arg(long, default_value = "pop")]
    genre: String,

    /// Mood tag (e.g. happy, sad, calm); inferred from the lyrics if omitted
    #[arg(long, default_value = "")]
    mood: String,

    /// Tempo in BPM; drawn from the genre's range if omitted
    #[arg(long)]
    tempo: Option<f64>,

    /// Voice type for default vocal settings (e.g. female_lead)
    #[arg(long)]
    vocals: Option<String>,

    /// Random seed; derived from the clock if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Write a Standard MIDI File here
    #[arg(long)]
    midi: Option<PathBuf>,

    /// Write the song as JSON here
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write MIDI and JSON into this directory, named after the title
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Replacement word lexicon (JSON)
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Replacement mood and genre tables (JSON)
    #[arg(long)]
    styles: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let lyrics = match (&cli.lyrics, &cli.lyrics_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading lyrics from {}", path.display()))?,
        (None, None) => bail!("one of --lyrics or --lyrics-file is required"),
    };

    let orchestrator = SongOrchestrator::new(
        load_lexicon(cli.lexicon.as_deref())?,
        load_styles(cli.styles.as_deref())?,
    );

    let mut request = SongGenerationRequest::new(&cli.title, lyrics)
        .genre(&cli.genre)
        .mood(&cli.mood);
    if let Some(tempo) = cli.tempo {
        request = request.tempo(tempo);
    }
    if let Some(vocals) = &cli.vocals {
        request = request.vocals(vocals);
    }

    let seed = cli.seed.unwrap_or_else(clock_seed);
    let mut rng = SongRng::new(seed);
    let song = orchestrator
        .generate(&request, &mut rng)
        .context("song generation failed")?;

    let melody = &song.melody;
    let features = &melody.audio_features;
    println!("=== {} ===", song.title);
    println!("Id: {}", song.id);
    println!("Seed: {}", seed);
    println!("Key: {}", melody.key);
    println!("Tempo: {} BPM", song.tempo);
    println!("Phrases: {}", melody.phrases.len());
    println!("Notes: {}", melody.note_count);
    println!("Duration: {:.1}s", melody.total_duration_seconds);
    println!(
        "Features: energy {:.2}, valence {:.2}, danceability {:.2}, acousticness {:.2}",
        features.energy, features.valence, features.danceability, features.acousticness
    );
    if let Some((low, high)) = melody.pitch_span() {
        println!("Range: {} - {}", note_name(low), note_name(high));
    }
    for (i, phrase) in melody.phrases.iter().enumerate() {
        println!(
            "  {:>2}. {:5.2}s  {}",
            i + 1,
            phrase.duration_seconds(),
            phrase.source_line
        );
    }
    let summary = &song.lyrics_summary;
    println!(
        "Lyrics: {} lines, {} words, {} syllables, {:?} sentiment, {:?} complexity",
        summary.line_count,
        summary.word_count,
        summary.total_syllables,
        summary.sentiment,
        summary.complexity
    );
    println!("Structure: {}", song.structure.join(" / "));
    println!(
        "Vocals: {} ({}), {} phonemes",
        song.vocals.voice_type,
        song.vocals.articulation_style,
        song.vocal_guide.phonemes.len()
    );

    if let Some(path) = &cli.midi {
        write_export(&MidiExporter, &song, path)?;
    }
    if let Some(path) = &cli.json {
        write_export(&JsonExporter, &song, path)?;
    }
    if let Some(dir) = &cli.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        let exporters: [&dyn SongExporter; 2] = [&MidiExporter, &JsonExporter];
        for exporter in exporters {
            let name = format!("{}.{}", slug(&song.title), exporter.format().extension());
            write_export(exporter, &song, &dir.join(name))?;
        }
    }

    Ok(())
}

fn load_lexicon(path: Option<&Path>) -> Result<Lexicon> {
    let Some(path) = path else {
        return Ok(default_lexicon());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading lexicon {}", path.display()))?;
    Lexicon::from_json(&json).with_context(|| format!("loading lexicon {}", path.display()))
}

fn load_styles(path: Option<&Path>) -> Result<StyleTables> {
    let Some(path) = path else {
        return Ok(StyleTables::default_tables());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading style tables {}", path.display()))?;
    StyleTables::from_json(&json)
        .with_context(|| format!("loading style tables {}", path.display()))
}

fn write_export(exporter: &dyn SongExporter, song: &Song, path: &Path) -> Result<()> {
    let bytes = exporter
        .export(song)
        .with_context(|| format!("encoding {}", exporter.format()))?;
    std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn clock_seed() -> u64 {
    let now = chrono::Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros()) as u64
}
