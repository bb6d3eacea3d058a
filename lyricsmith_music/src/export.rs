// Encoding finished songs for other tools.
//
// Three exporters sit behind the `SongExporter` trait:
// - `MidiExporter`: Standard MIDI File, format 1. Track 0 carries the tempo;
//   track 1 carries the melody, with each syllable attached as a lyric
//   event at its note's onset.
// - `JsonExporter`: the whole `Song` as pretty-printed JSON.
// - `WavExporter`: rendered audio. Audio synthesis does not exist yet, so
//   this always returns `ExportError::Unsupported`.
//
// MIDI timing: seconds convert to ticks with 480 ticks per quarter note, at
// the tempo actually written to the file (MIDI cannot express tempos slower
// than about 3.6 BPM, so the written value may be clamped). Note boundaries
// are rounded from absolute times, not accumulated from durations, so
// rounding error never builds up. Pitches outside MIDI's 0-127 are moved by
// whole octaves into range.

use crate::error::ExportError;
use crate::song::Song;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::fmt;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// Largest value a MIDI tempo meta event can hold.
const MAX_TEMPO_MICROS: u32 = (1 << 24) - 1;

/// General MIDI "Voice Oohs".
const VOICE_PROGRAM: u8 = 53;

const MELODY_CHANNEL: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Midi,
    Json,
    Wav,
}

impl ExportFormat {
    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Midi => "mid",
            ExportFormat::Json => "json",
            ExportFormat::Wav => "wav",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportFormat::Midi => "MIDI",
            ExportFormat::Json => "JSON",
            ExportFormat::Wav => "WAV",
        };
        f.write_str(s)
    }
}

/// Encodes a `Song` into a file format.
pub trait SongExporter {
    fn format(&self) -> ExportFormat;

    fn export(&self, song: &Song) -> Result<Vec<u8>, ExportError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MidiExporter;

impl MidiExporter {
    /// Build the in-memory SMF. Lyric and track-name events borrow from
    /// `song`.
    pub fn build_smf<'a>(&self, song: &'a Song) -> Result<Smf<'a>, ExportError> {
        if song.melody.note_count == 0 {
            return Err(ExportError::Empty);
        }

        let mut smf = Smf::new(Header::new(
            Format::Parallel,
            Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
        ));
        let micros = quarter_micros(song.tempo);
        smf.tracks.push(tempo_track(micros));
        smf.tracks.push(melody_track(song, micros));
        Ok(smf)
    }
}

impl SongExporter for MidiExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Midi
    }

    fn export(&self, song: &Song) -> Result<Vec<u8>, ExportError> {
        let smf = self.build_smf(song)?;
        let mut buf = Vec::new();
        smf.write(&mut buf).map_err(|e| ExportError::Midi(e.to_string()))?;
        Ok(buf)
    }
}

/// Microseconds per quarter note for `tempo`, clamped to what a tempo meta
/// event can hold.
fn quarter_micros(tempo: f64) -> u32 {
    (60_000_000.0 / tempo).round().clamp(1.0, MAX_TEMPO_MICROS as f64) as u32
}

fn tempo_track(micros: u32) -> Track<'static> {
    vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ]
}

/// Event at an absolute tick. At equal ticks, note-offs sort before lyrics
/// and lyrics before note-ons, so back-to-back notes never overlap.
struct Timed<'a> {
    tick: u32,
    order: u8,
    kind: TrackEventKind<'a>,
}

fn melody_track(song: &Song, micros: u32) -> Track<'_> {
    let channel = u4::new(MELODY_CHANNEL);
    let ticks_per_second = f64::from(TICKS_PER_QUARTER) * 1_000_000.0 / f64::from(micros);
    let to_tick = |seconds: f64| (seconds * ticks_per_second).round().max(0.0) as u32;

    let mut timed: Vec<Timed<'_>> = Vec::with_capacity(song.melody.note_count * 3);
    for note in song.melody.notes() {
        let key = u7::new(midi_key(note.pitch));
        let start = to_tick(note.onset_seconds);
        let end = to_tick(note.end_seconds()).max(start.saturating_add(1));

        timed.push(Timed {
            tick: start,
            order: 1,
            kind: TrackEventKind::Meta(MetaMessage::Lyric(note.syllable_label.as_bytes())),
        });
        timed.push(Timed {
            tick: start,
            order: 2,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(note.velocity.clamp(1, 127)),
                },
            },
        });
        timed.push(Timed {
            tick: end,
            order: 0,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff { key, vel: u7::new(0) },
            },
        });
    }
    timed.sort_by_key(|t| (t.tick, t.order));

    let mut track: Track<'_> = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(song.title.as_bytes())),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(VOICE_PROGRAM),
                },
            },
        },
    ];

    let mut last_tick = 0;
    for event in timed {
        track.push(TrackEvent {
            delta: u28::new(event.tick - last_tick),
            kind: event.kind,
        });
        last_tick = event.tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}

/// Shift `pitch` by the fewest octaves that land it in 0..=127.
pub fn midi_key(pitch: i32) -> u8 {
    let folded = if pitch < 0 {
        pitch.rem_euclid(12)
    } else if pitch > 127 {
        127 - (127 - pitch).rem_euclid(12)
    } else {
        pitch
    };
    folded as u8
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl SongExporter for JsonExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn export(&self, song: &Song) -> Result<Vec<u8>, ExportError> {
        Ok(serde_json::to_vec_pretty(song)?)
    }
}

/// Audio export. Always unsupported: the crate produces symbolic notes only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavExporter;

impl SongExporter for WavExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Wav
    }

    fn export(&self, _song: &Song) -> Result<Vec<u8>, ExportError> {
        Err(ExportError::Unsupported(ExportFormat::Wav))
    }
}
