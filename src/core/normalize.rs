//! Request normalization
//!
//! Sanitizes raw caller input and derives the canonical cache key. Pure
//! string processing: always succeeds, never touches I/O. Over-long input
//! is truncated rather than rejected so editors pasting a whole article
//! still get an answer.

use crate::core::cache::CacheKey;
use crate::core::types::GenerationOptions;

/// A normalized request ready for the pipeline
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// Sanitized, clamped input text
    pub input: String,
    /// Canonical cache key for this input + discriminating options
    pub key: CacheKey,
    pub options: GenerationOptions,
}

/// Strip control characters and collapse excess whitespace
///
/// Newlines survive (paragraph structure feeds the chunker); runs of
/// spaces and tabs collapse to one space; three or more consecutive
/// newlines collapse to a single blank line.
pub fn sanitize(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\n' => cleaned.push('\n'),
            '\r' => {}
            c if c.is_control() => cleaned.push(' '),
            c => cleaned.push(c),
        }
    }

    let mut out = String::with_capacity(cleaned.len());
    let mut blank_run = 0usize;
    for line in cleaned.split('\n') {
        let mut collapsed = String::with_capacity(line.len());
        let mut in_space = false;
        for ch in line.trim().chars() {
            if ch.is_whitespace() {
                if !in_space {
                    collapsed.push(' ');
                }
                in_space = true;
            } else {
                collapsed.push(ch);
                in_space = false;
            }
        }

        if collapsed.is_empty() {
            blank_run += 1;
            // At most one blank line in a row
            if blank_run == 1 && !out.is_empty() {
                out.push('\n');
            }
        } else {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&collapsed);
            blank_run = 0;
        }
    }
    out.trim().to_string()
}

/// Truncate to at most `max_chars` characters, on a char boundary
pub fn clamp(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Sanitize, clamp and key one raw request
pub fn normalize(raw: &str, options: GenerationOptions, max_input_chars: usize) -> RequestSpec {
    let input = clamp(&sanitize(raw), max_input_chars);
    let key = CacheKey::derive(options.task, options.target_lang.as_deref(), &input);
    RequestSpec {
        input,
        key,
        options,
    }
}
