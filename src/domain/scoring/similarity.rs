use serde::Serialize;
use std::collections::HashSet;

/// Words shorter than this are too ambiguous to score.
const MIN_SCORED_WORD_LEN: usize = 3;

/// Edit distance allowed for a partial match, as a fraction of the shorter word.
const PARTIAL_DISTANCE_RATIO: f64 = 0.3;

const PARTIAL_MATCH_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub value: f64,
    pub matched_words: usize,
    pub total_words: usize,
}

/// Lexical similarity between an expected line and a learner's transcript.
///
/// Lenient on purpose: transcription near-misses ("treatmen", "wuld") still
/// earn partial credit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScorer;

impl SimilarityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, expected: &str, actual: &str) -> ScoreResult {
        let expected = normalize(expected);
        let actual = normalize(actual);

        let expected_tokens: Vec<&str> = expected.split_whitespace().collect();
        let actual_tokens: Vec<&str> = actual.split_whitespace().collect();
        let total_words = expected_tokens.len().max(actual_tokens.len());

        if total_words == 0 {
            return ScoreResult {
                value: 0.0,
                matched_words: 0,
                total_words: 0,
            };
        }

        if expected == actual {
            return ScoreResult {
                value: 1.0,
                matched_words: total_words,
                total_words,
            };
        }

        let expected_set: HashSet<&str> = expected_tokens.iter().copied().collect();
        let mut points = 0.0;
        let mut matched_words = 0;

        for word in actual_tokens
            .iter()
            .filter(|word| word.chars().count() >= MIN_SCORED_WORD_LEN)
        {
            if expected_set.contains(word) {
                points += 1.0;
                matched_words += 1;
            } else if expected_tokens.iter().any(|candidate| is_partial_match(word, candidate)) {
                points += PARTIAL_MATCH_WEIGHT;
                matched_words += 1;
            }
        }

        ScoreResult {
            value: (points / total_words as f64).clamp(0.0, 1.0),
            matched_words,
            total_words,
        }
    }
}

/// Lowercase, strip `. , ? !`, and collapse whitespace to single spaces.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '?' | '!'))
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_partial_match(a: &str, b: &str) -> bool {
    if a.contains(b) || b.contains(a) {
        return true;
    }

    let shorter = a.chars().count().min(b.chars().count());
    levenshtein(a, b) as f64 <= PARTIAL_DISTANCE_RATIO * shorter as f64
}

/// Unit-cost Levenshtein distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
