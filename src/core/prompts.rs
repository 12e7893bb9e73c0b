//! Task instruction templates
//!
//! Every prompt the orchestrator sends is built here, so the executor and
//! providers never know which editorial task they are serving.

use crate::core::types::TaskKind;

const ASSISTANT_PREAMBLE: &str = "You are the editorial assistant of a news desk. \
     Answer concisely and follow newsroom style.";

/// Free-form assistant prompt with the newsroom persona
pub fn chat(prompt: &str) -> String {
    format!("{ASSISTANT_PREAMBLE}\n\n{prompt}")
}

/// Single-pass summary of text that fits in one chunk
pub fn summary(text: &str, bullets: usize) -> String {
    format!(
        "Summarize the following article in exactly {bullets} short bullet points. \
         Respond with the bullet points only.\n\n{text}"
    )
}

/// Per-chunk instruction for map-reduce summarization
pub fn partial_summary(chunk: &str) -> String {
    format!(
        "This is one section of a longer article. Summarize only this section \
         in two or three plain sentences.\n\n{chunk}"
    )
}

/// Synthesis instruction over the collected partial summaries
pub fn synthesis(partials: &[String], bullets: usize) -> String {
    format!(
        "The following are partial summaries of consecutive sections of one \
         article. Synthesize them into exactly {bullets} final bullet points \
         covering the whole article. Respond with the bullet points only.\n\n{}",
        partials.join("\n\n")
    )
}

/// Structured-extraction and rewrite tasks
pub fn task(kind: TaskKind, text: &str, title: Option<&str>, target_lang: Option<&str>) -> String {
    let title_line = title
        .map(|t| format!("Article title: {t}\n\n"))
        .unwrap_or_default();
    match kind {
        TaskKind::FiveWOneH => format!(
            "Extract the who, what, when, where, why and how from the article \
             below. Respond with only a JSON object with the string keys \
             \"who\", \"what\", \"when\", \"where\", \"why\", \"how\". Use an \
             empty string for anything the article does not state.\n\n{title_line}{text}"
        ),
        TaskKind::Headline => format!(
            "Write one concise news headline for the article below, at most 80 \
             characters, no quotation marks, active voice. Respond with the \
             headline only.\n\n{title_line}{text}"
        ),
        TaskKind::SeoMeta => format!(
            "Produce SEO metadata for the article below. Respond with only a \
             JSON object with keys \"title\" (max 60 chars), \"description\" \
             (max 155 chars) and \"keywords\" (array of 5-8 strings).\n\n{title_line}{text}"
        ),
        TaskKind::Translate => {
            let lang = target_lang.unwrap_or("English");
            format!(
                "Translate the text below into {lang}. Preserve paragraph \
                 breaks and names. Respond with the translation only.\n\n{text}"
            )
        }
        // Chat and Summarize have dedicated builders
        TaskKind::Chat => chat(text),
        TaskKind::Summarize => summary(text, 5),
    }
}
