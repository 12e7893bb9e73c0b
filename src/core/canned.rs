//! Canned-response fast path
//!
//! Trivial greetings get a fixed answer without touching the cache or any
//! provider. Purely an optimization: callers can bypass it per request,
//! and anything that is not obviously a greeting falls through.

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
    "howdy",
];

/// The longest input still considered a possible greeting, in chars
const MAX_GREETING_LEN: usize = 40;

const CANNED_GREETING: &str = "Hello! I'm the NewsDesk editorial assistant. Ask me about drafting, \
     headlines, summaries, translations, or style questions.";

/// Return a fixed reply for trivial greetings, `None` otherwise
pub fn match_canned(input: &str) -> Option<&'static str> {
    let trimmed = input.trim().trim_end_matches(['!', '.', '?', ',']);
    if trimmed.is_empty() || trimmed.chars().count() > MAX_GREETING_LEN {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    let matched = GREETINGS
        .iter()
        .any(|g| lowered == *g || lowered.starts_with(&format!("{g} ")));
    matched.then_some(CANNED_GREETING)
}
