// Orthographic syllabification and default stress patterns.
//
// Syllables are counted from spelling alone: one syllable per run of the
// vowel letters a, e, i, o, u, with a floor of one. "need" has one run
// ("ee"), "close" has two ("o", "e"). This overcounts silent-e words and
// undercounts "y" vowels; it is a crude estimate that the
// melody engine relies on being stable, not accurate.
//
// `split_syllables` cuts a word at the end of each vowel run so every note
// can carry a readable label ("tonight" -> "to", "night"). The number of
// pieces always equals `count_syllables` for the same input.

/// True for the five orthographic vowels, either case.
pub fn is_vowel(ch: char) -> bool {
    matches!(ch.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Strip surrounding punctuation, keeping the original case.
pub fn trim_word(raw: &str) -> &str {
    raw.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Lookup key for the lexicon: punctuation trimmed, lowercased.
pub fn normalize_word(raw: &str) -> String {
    trim_word(raw).to_lowercase()
}

/// Number of vowel-letter runs in `word`, at least 1.
pub fn count_syllables(word: &str) -> usize {
    let mut runs = 0;
    let mut prev_vowel = false;
    for ch in word.chars() {
        let v = is_vowel(ch);
        if v && !prev_vowel {
            runs += 1;
        }
        prev_vowel = v;
    }
    runs.max(1)
}

/// Split `word` into `count_syllables(word)` pieces.
///
/// Each piece is leading consonants plus one vowel run; consonants after
/// the last vowel run join the final piece. A word with no vowels is a
/// single piece.
pub fn split_syllables(word: &str) -> Vec<String> {
    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_vowel = false;

    for ch in word.chars() {
        let v = is_vowel(ch);
        if prev_vowel && !v {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(ch);
        prev_vowel = v;
    }

    let tail_has_vowel = current.chars().any(is_vowel);
    if tail_has_vowel || pieces.is_empty() {
        pieces.push(current);
    } else if let Some(last) = pieces.last_mut() {
        last.push_str(&current);
    }
    pieces
}

/// Stress pattern used when the lexicon has none for a word.
///
/// One syllable is stressed, two are trochaic (stressed, unstressed), and
/// longer words alternate starting stressed.
pub fn default_stress(syllable_count: usize) -> Vec<bool> {
    match syllable_count {
        0 | 1 => vec![true],
        2 => vec![true, false],
        n => (0..n).map(|i| i % 2 == 0).collect(),
    }
}
