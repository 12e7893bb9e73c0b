//! Response assembly
//!
//! Turns raw provider text into a structured result. Malformed model
//! output is never an error: strict JSON parsing first, then the largest
//! balanced `{...}` substring, then degrade to raw text with a note so
//! callers can pattern-match instead of catching failures.

use serde_json::Value;

/// Note attached when structured parsing gave up
pub const PARSE_FAILED_NOTE: &str = "JSON parse failed";

/// Result of assembling provider text against an expected shape
#[derive(Debug, Clone, PartialEq)]
pub enum Assembled {
    /// The expected structured value (an object, or a plain string for
    /// free-text tasks)
    Structured(Value),
    /// Degraded-but-successful: the raw text with a parse note
    Raw { text: String, note: &'static str },
}

/// Tidy free-text output (trim, drop a surrounding markdown code fence)
pub fn clean_text(raw: &str) -> String {
    strip_code_fence(raw.trim()).trim().to_string()
}

/// Assemble text expected to contain a JSON object
pub fn assemble_structured(raw: &str) -> Assembled {
    let candidate = strip_code_fence(raw.trim());

    if let Ok(value) = serde_json::from_str::<Value>(candidate.trim()) {
        if value.is_object() {
            return Assembled::Structured(value);
        }
    }

    if let Some(substring) = largest_balanced_object(candidate) {
        if let Ok(value) = serde_json::from_str::<Value>(substring) {
            if value.is_object() {
                return Assembled::Structured(value);
            }
        }
    }

    Assembled::Raw {
        text: raw.trim().to_string(),
        note: PARSE_FAILED_NOTE,
    }
}

/// Models love wrapping JSON in ```json fences; unwrap one if present
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let Some(first_newline) = trimmed.find('\n') else {
        return trimmed;
    };
    let body = &trimmed[first_newline + 1..];
    match body.rfind("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

/// Largest balanced `{...}` region, aware of string literals and escapes
fn largest_balanced_object(text: &str) -> Option<&str> {
    let mut best: Option<(usize, usize)> = None;
    let mut start: Option<usize> = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(idx);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(s) = start.take() {
                            let end = idx + ch.len_utf8();
                            let longer = best.map_or(true, |(bs, be)| end - s > be - bs);
                            if longer {
                                best = Some((s, end));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    best.map(|(s, e)| &text[s..e])
}
