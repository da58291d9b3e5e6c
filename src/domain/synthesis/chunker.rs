use regex::Regex;
use std::sync::OnceLock;

/// Default provider-safe chunk length, in characters.
pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 300;

fn sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?。！？]+\s*").expect("sentence pattern is valid"))
}

/// Splits long text into chunks a synthesis provider accepts in one request.
///
/// Lengths are counted in characters, never bytes, so Japanese and English
/// text are sliced the same way.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_length: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHUNK_LENGTH)
    }
}

impl TextChunker {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        split(text, self.max_length)
    }
}

/// Split `text` into ordered chunks of at most `max_length` characters.
///
/// Sentences (terminator included) are packed greedily. A sentence that is
/// longer than `max_length` on its own is hard-sliced.
pub fn split(text: &str, max_length: usize) -> Vec<String> {
    let max_length = max_length.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences(text) {
        let sentence_len = sentence.chars().count();

        if current_len + sentence_len <= max_length {
            current.push_str(sentence);
            current_len += sentence_len;
            continue;
        }

        flush(&mut chunks, &mut current);
        current_len = 0;

        if sentence_len > max_length {
            let chars: Vec<char> = sentence.trim().chars().collect();
            for piece in chars.chunks(max_length) {
                chunks.push(piece.iter().collect());
            }
        } else {
            current.push_str(sentence);
            current_len = sentence_len;
        }
    }

    flush(&mut chunks, &mut current);
    chunks
}

/// Join per-chunk audio byte-for-byte in chunk order.
pub fn concatenate(parts: Vec<Vec<u8>>) -> Vec<u8> {
    let total: usize = parts.iter().map(Vec::len).sum();
    let mut merged = Vec::with_capacity(total);
    for part in parts {
        merged.extend(part);
    }
    merged
}

fn sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last_end = 0;

    for mat in sentence_pattern().find_iter(text) {
        sentences.push(&text[last_end..mat.end()]);
        last_end = mat.end();
    }
    if last_end < text.len() {
        sentences.push(&text[last_end..]);
    }

    sentences.retain(|sentence| !sentence.trim().is_empty());
    sentences
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}
