//! Oversized-input chunking
//!
//! Splits sanitized text into ordered, bounded segments on blank-line
//! paragraph boundaries. Pure function; invalid sizes are rejected at
//! configuration time (`Config::validate`), not here.

use crate::config::ChunkingConfig;

/// Split `text` into ordered chunks
///
/// At or below `trigger_chars` the input stays a single chunk. Above it,
/// paragraphs are greedily packed into segments of at most
/// `chunk_size_chars`; a single paragraph longer than the limit is
/// hard-split at fixed character offsets.
pub fn chunk(text: &str, config: &ChunkingConfig) -> Vec<String> {
    if char_len(text) <= config.trigger_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for paragraph in text.split("\n\n") {
        let para_len = char_len(paragraph);

        if para_len > config.chunk_size_chars {
            flush(&mut chunks, &mut current, &mut current_len);
            chunks.extend(hard_split(paragraph, config.chunk_size_chars));
            continue;
        }

        // +2 accounts for the rejoined paragraph separator
        let joined_len = if current.is_empty() {
            para_len
        } else {
            current_len + 2 + para_len
        };
        if joined_len > config.chunk_size_chars {
            flush(&mut chunks, &mut current, &mut current_len);
            current.push_str(paragraph);
            current_len = para_len;
        } else {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(paragraph);
            current_len = joined_len;
        }
    }
    flush(&mut chunks, &mut current, &mut current_len);
    chunks
}

fn flush(chunks: &mut Vec<String>, current: &mut String, current_len: &mut usize) {
    if !current.is_empty() {
        chunks.push(std::mem::take(current));
        *current_len = 0;
    }
}

/// Split one over-long paragraph at fixed character offsets
fn hard_split(paragraph: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = paragraph.chars().collect();
    chars
        .chunks(size)
        .map(|piece| piece.iter().collect())
        .collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
