// Lyrics structural analysis.
//
// Breaks raw lyrics into lines, words, and orthographic syllables, and
// scores each line's sentiment from the word lexicon. The result is the
// single input to key selection (the emotional arc) and phrase synthesis
// (one note per syllable, stress per syllable).
//
// Rules:
// - Lines split on line breaks; blank and whitespace-only lines vanish.
// - Words split on whitespace. Lexicon lookups use the lowercased word with
//   surrounding punctuation trimmed; the label keeps the original spelling.
// - Line sentiment is the plain mean of word weights, unknown words
//   counting as 0. It is a bag-of-words score, not sentiment analysis.
//
// Analysis has no failure mode. Empty lyrics give an empty analysis, and
// the orchestrator rejects that before generating.

use lyricsmith_lang::syllables::trim_word;
use lyricsmith_lang::{Lexicon, count_syllables, normalize_word, split_syllables};
use serde::{Deserialize, Serialize};

/// Word count above which lyrics are considered highly complex.
const HIGH_COMPLEXITY_WORDS: usize = 100;
/// Word count above which lyrics are considered moderately complex.
const MEDIUM_COMPLEXITY_WORDS: usize = 50;

/// One word of a lyric line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordAnalysis {
    /// The word as written, including punctuation.
    pub text: String,
    /// Lexicon lookup form.
    pub key: String,
    /// Orthographic syllables; never empty.
    pub syllables: Vec<String>,
    /// Lexicon sentiment, 0.0 if unknown.
    pub sentiment: f64,
    /// One stress flag per syllable.
    pub stress: Vec<bool>,
}

impl WordAnalysis {
    pub fn syllable_count(&self) -> usize {
        self.syllables.len()
    }
}

/// Analysis of one non-empty lyric line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAnalysis {
    /// The line with surrounding whitespace trimmed.
    pub text: String,
    pub words: Vec<WordAnalysis>,
    /// Total syllables across words; at least 1.
    pub syllable_count: usize,
    /// Mean word sentiment in [-1, 1].
    pub sentiment: f64,
}

/// Overall sentiment label for a whole lyric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// Rough lyric complexity bucket by word count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// Quick descriptive stats for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsSummary {
    pub line_count: usize,
    pub word_count: usize,
    pub total_syllables: usize,
    /// Counts positive against negative lexicon words.
    pub sentiment: SentimentLabel,
    pub complexity: Complexity,
}

/// Full analysis of a lyric, immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricsAnalysis {
    pub lines: Vec<LineAnalysis>,
    pub total_syllables: usize,
}

impl LyricsAnalysis {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Per-line sentiment, in line order.
    pub fn emotional_arc(&self) -> Vec<f64> {
        self.lines.iter().map(|l| l.sentiment).collect()
    }

    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.words.len()).sum()
    }

    pub fn summary(&self) -> LyricsSummary {
        let words = self.lines.iter().flat_map(|l| &l.words);
        let (mut positive, mut negative) = (0usize, 0usize);
        for word in words {
            if word.sentiment > 0.0 {
                positive += 1;
            } else if word.sentiment < 0.0 {
                negative += 1;
            }
        }
        let sentiment = match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => SentimentLabel::Positive,
            std::cmp::Ordering::Less => SentimentLabel::Negative,
            std::cmp::Ordering::Equal => SentimentLabel::Neutral,
        };

        let word_count = self.word_count();
        let complexity = if word_count > HIGH_COMPLEXITY_WORDS {
            Complexity::High
        } else if word_count > MEDIUM_COMPLEXITY_WORDS {
            Complexity::Medium
        } else {
            Complexity::Low
        };

        LyricsSummary {
            line_count: self.lines.len(),
            word_count,
            total_syllables: self.total_syllables,
            sentiment,
            complexity,
        }
    }
}

/// Non-empty lines of `lyrics`, trimmed, in order.
///
/// Shared with request validation so "has content" means exactly "would
/// produce at least one phrase".
pub fn content_lines(lyrics: &str) -> impl Iterator<Item = &str> {
    lyrics.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Segments lyrics and scores them against a lexicon.
#[derive(Debug, Clone, Copy)]
pub struct LyricsAnalyzer<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> LyricsAnalyzer<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        LyricsAnalyzer { lexicon }
    }

    pub fn analyze(&self, lyrics: &str) -> LyricsAnalysis {
        let lines: Vec<LineAnalysis> =
            content_lines(lyrics).map(|l| self.analyze_line(l)).collect();
        let total_syllables = lines.iter().map(|l| l.syllable_count).sum();
        LyricsAnalysis {
            lines,
            total_syllables,
        }
    }

    /// Analyze a single line. `line` should already be non-empty; a blank
    /// line yields no words and a syllable count clamped to 1.
    pub fn analyze_line(&self, line: &str) -> LineAnalysis {
        let words: Vec<WordAnalysis> =
            line.split_whitespace().map(|w| self.analyze_word(w)).collect();

        let syllable_count = words.iter().map(|w| w.syllable_count()).sum::<usize>().max(1);
        let sentiment = if words.is_empty() {
            0.0
        } else {
            words.iter().map(|w| w.sentiment).sum::<f64>() / words.len() as f64
        };

        LineAnalysis {
            text: line.trim().to_string(),
            words,
            syllable_count,
            sentiment,
        }
    }

    fn analyze_word(&self, raw: &str) -> WordAnalysis {
        let key = normalize_word(raw);
        let trimmed = trim_word(raw);
        // Pure punctuation ("--") still takes a note; label it as written.
        let spelling = if trimmed.is_empty() { raw } else { trimmed };

        let syllables = split_syllables(spelling);
        debug_assert_eq!(syllables.len(), count_syllables(spelling));
        let stress = self.lexicon.stress_pattern(&key, syllables.len());

        WordAnalysis {
            text: raw.to_string(),
            sentiment: self.lexicon.sentiment(&key),
            key,
            syllables,
            stress,
        }
    }
}
