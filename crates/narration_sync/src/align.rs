//! Approximate alignment of target sentences against the recognized word
//! sequence.
//!
//! Recognition is never verbatim-perfect, so each sentence is matched
//! against every candidate window of recognized words whose length is
//! within a tolerance of the sentence's own token count, scored with a
//! longest-matching-blocks similarity ratio. The best window wins if it
//! clears the acceptance threshold; otherwise the sentence gets a null
//! interval and downstream stages fall back.

use std::collections::HashMap;

use crate::{SentenceInterval, WordTiming};

#[derive(Debug, Clone)]
pub struct AlignerConfig {
    /// How many tokens a candidate window may be shorter or longer than
    /// the sentence itself.
    pub tolerance: usize,
    /// Minimum similarity ratio (exclusive) for a match to be accepted.
    pub threshold: f64,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        AlignerConfig {
            tolerance: 9,
            threshold: 0.6,
        }
    }
}

fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '*')
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            c => c,
        })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Normalizes text the way the aligner compares it: emphasis markers
/// stripped, curly quotes straightened, lowercased, whitespace-tokenized.
pub fn normalize_tokens(text: &str) -> Vec<String> {
    normalize_text(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Splits narration text into sentences on terminal punctuation,
/// keeping the punctuation with its sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

/// Longest block of consecutive equal tokens between `a[alo..ahi]` and
/// `b[blo..bhi]`. Ties go to the earliest start in `a`, then in `b`.
fn longest_match(
    a: &[String],
    alo: usize,
    ahi: usize,
    b: &[String],
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best_i = alo;
    let mut best_j = blo;
    let mut best_size = 0;

    // j2len[j] = length of the longest run of equal tokens ending at
    // (i - 1, j) for the previous row i - 1.
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for i in alo..ahi {
        let mut new_j2len = HashMap::new();
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = if j == blo {
                    1
                } else {
                    j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                };
                new_j2len.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = new_j2len;
    }
    (best_i, best_j, best_size)
}

fn matched_tokens(
    a: &[String],
    alo: usize,
    ahi: usize,
    b: &[String],
    blo: usize,
    bhi: usize,
) -> usize {
    let (i, j, size) = longest_match(a, alo, ahi, b, blo, bhi);
    if size == 0 {
        return 0;
    }
    size + matched_tokens(a, alo, i, b, blo, j) + matched_tokens(a, i + size, ahi, b, j + size, bhi)
}

/// Similarity of two token sequences in `[0, 1]`: twice the number of
/// tokens covered by matching blocks, over the total token count.
fn sequence_ratio(a: &[String], b: &[String]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_tokens(a, 0, a.len(), b, 0, b.len()) as f64 / total as f64
}

/// Locates, for each target sentence, the contiguous run of recognized
/// words that most plausibly corresponds to it.
///
/// For a sentence of `m` tokens, every window of length
/// `max(1, m - tolerance) ..= m + tolerance` at every offset is scored;
/// the scan goes window length ascending, then offset ascending, and only
/// a strictly better ratio replaces the current best, so ties keep the
/// first candidate found. The result preserves sentence input order.
pub fn align_sentences(
    sentences: &[String],
    words: &[WordTiming],
    config: &AlignerConfig,
) -> Vec<SentenceInterval> {
    let word_tokens: Vec<String> = words.iter().map(|w| normalize_text(&w.word)).collect();

    sentences
        .iter()
        .map(|sentence| {
            let span = best_window(sentence, words, &word_tokens, config);
            SentenceInterval {
                sentence: sentence.clone(),
                span,
            }
        })
        .collect()
}

fn best_window(
    sentence: &str,
    words: &[WordTiming],
    word_tokens: &[String],
    config: &AlignerConfig,
) -> Option<(f64, f64)> {
    let tokens = normalize_tokens(sentence);
    let m = tokens.len();
    if m == 0 || words.is_empty() {
        return None;
    }

    let mut best: Option<(f64, usize, usize)> = None;
    let min_w = m.saturating_sub(config.tolerance).max(1);
    let max_w = (m + config.tolerance).min(word_tokens.len());

    for w in min_w..=max_w {
        for start in 0..=(word_tokens.len() - w) {
            let ratio = sequence_ratio(&tokens, &word_tokens[start..start + w]);
            if best.map_or(true, |(best_ratio, _, _)| ratio > best_ratio) {
                best = Some((ratio, start, start + w - 1));
            }
        }
    }

    match best {
        Some((ratio, first, last)) if ratio > config.threshold => {
            tracing::debug!(sentence, ratio, first, last, "aligned sentence");
            Some((words[first].start, words[last].end))
        }
        Some((ratio, ..)) => {
            tracing::debug!(sentence, ratio, "no window above threshold");
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(entries: &[(&str, f64, f64)]) -> Vec<WordTiming> {
        entries
            .iter()
            .map(|(w, s, e)| WordTiming::new(*w, *s, *e))
            .collect()
    }

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn normalization_strips_markers_and_straightens_quotes() {
        assert_eq!(
            normalize_tokens("  **NVIDIA\u{2019}s** \u{201C}Record\u{201D} Quarter  "),
            strings(&["nvidia's", "\"record\"", "quarter"])
        );
    }

    #[test]
    fn split_sentences_keeps_terminal_punctuation() {
        assert_eq!(
            split_sentences("Markets rallied. Will it last? Stay tuned"),
            strings(&["Markets rallied.", "Will it last?", "Stay tuned"])
        );
    }

    #[test]
    fn ratio_is_one_for_identical_sequences() {
        let a = strings(&["hello", "world"]);
        assert!((sequence_ratio(&a, &a) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ratio_counts_split_matching_blocks() {
        // "a b c d" vs "a x c d": blocks "a" and "c d" match, 2*3/8.
        let a = strings(&["a", "b", "c", "d"]);
        let b = strings(&["a", "x", "c", "d"]);
        assert!((sequence_ratio(&a, &b) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn ratio_of_disjoint_sequences_is_zero() {
        let a = strings(&["goodbye", "moon"]);
        let b = strings(&["hello", "world"]);
        assert_eq!(sequence_ratio(&a, &b), 0.0);
    }

    #[test]
    fn verbatim_sentence_matches_exactly() {
        // Spec property: a perfect transcript aligns at ratio 1.0 with the
        // first/last word timestamps verbatim.
        let words = words(&[("hello", 0.0, 0.5), ("world", 0.5, 1.0), ("today", 1.0, 1.5)]);
        let intervals = align_sentences(
            &strings(&["hello world"]),
            &words,
            &AlignerConfig::default(),
        );
        assert_eq!(intervals[0].span, Some((0.0, 1.0)));
    }

    #[test]
    fn unrelated_sentence_gets_null_interval() {
        let words = words(&[("hello", 0.0, 0.5), ("world", 0.5, 1.0), ("today", 1.0, 1.5)]);
        let intervals = align_sentences(
            &strings(&["goodbye moon"]),
            &words,
            &AlignerConfig::default(),
        );
        assert_eq!(intervals[0].span, None);
    }

    #[test]
    fn tolerates_recognizer_substitutions() {
        let words = words(&[
            ("the", 0.0, 0.2),
            ("stock", 0.2, 0.6),
            ("closed", 0.6, 1.0),
            ("hire", 1.0, 1.4), // misrecognized "higher"
            ("today.", 1.4, 1.8),
        ]);
        let intervals = align_sentences(
            &strings(&["The stock closed higher today."]),
            &words,
            &AlignerConfig::default(),
        );
        // 4 of 5 tokens match: ratio 0.8, well above threshold.
        assert_eq!(intervals[0].span, Some((0.0, 1.8)));
    }

    #[test]
    fn empty_word_sequence_yields_all_null_intervals() {
        let intervals = align_sentences(
            &strings(&["anything at all", "and more"]),
            &[],
            &AlignerConfig::default(),
        );
        assert_eq!(intervals.len(), 2);
        assert!(intervals.iter().all(|i| i.span.is_none()));
    }

    #[test]
    fn output_preserves_sentence_input_order() {
        let words = words(&[
            ("second", 0.0, 0.5),
            ("part", 0.5, 1.0),
            ("first", 1.0, 1.5),
            ("part", 1.5, 2.0),
        ]);
        let intervals = align_sentences(
            &strings(&["first part", "second part"]),
            &words,
            &AlignerConfig::default(),
        );
        assert_eq!(intervals[0].sentence, "first part");
        assert_eq!(intervals[0].span, Some((1.0, 2.0)));
        assert_eq!(intervals[1].sentence, "second part");
        assert_eq!(intervals[1].span, Some((0.0, 1.0)));
    }

    #[test]
    fn alignment_is_deterministic() {
        let words = words(&[
            ("markets", 0.0, 0.4),
            ("opened", 0.4, 0.8),
            ("sharply", 0.8, 1.2),
            ("lower", 1.2, 1.6),
        ]);
        let sentences = strings(&["markets opened lower", "sharply lower"]);
        let first = align_sentences(&sentences, &words, &AlignerConfig::default());
        let second = align_sentences(&sentences, &words, &AlignerConfig::default());
        assert_eq!(first, second);
    }
}
