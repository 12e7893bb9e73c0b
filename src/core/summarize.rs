//! Map-reduce summarization
//!
//! Used only when the chunker produced more than one chunk: one executor
//! run per chunk collecting partial summaries in chunk order, then one
//! synthesis run over the joined partials. Any per-chunk failure aborts
//! the whole operation; a missing partial would otherwise produce a
//! misleading synthesis.

use crate::core::assemble::clean_text;
use crate::core::classify::ClassifiedError;
use crate::core::executor::ChainExecutor;
use crate::core::prompts;
use crate::core::types::{Candidate, GenerationCall, Usage};
use tracing::debug;

/// Output size bound for each per-chunk partial summary
const PARTIAL_MAX_TOKENS: u32 = 256;
/// Output size bound for the final synthesis
const SYNTHESIS_MAX_TOKENS: u32 = 512;

/// Result of a complete map-reduce run
#[derive(Debug, Clone)]
pub struct MapReduceOutcome {
    /// Final synthesized summary
    pub text: String,
    /// Candidate that produced the synthesis call
    pub candidate: Candidate,
    /// Usage accumulated across all per-chunk calls and the synthesis
    pub usage: Usage,
    /// Number of executor runs performed (chunks + 1)
    pub calls: u32,
}

/// Summarize each chunk, then synthesize the partials into `bullets` points
pub async fn map_reduce(
    executor: &ChainExecutor,
    chain: &[Candidate],
    chunks: &[String],
    bullets: usize,
    temperature: f32,
) -> Result<MapReduceOutcome, ClassifiedError> {
    debug_assert!(chunks.len() > 1, "map-reduce requires multiple chunks");

    let mut partials = Vec::with_capacity(chunks.len());
    let mut usage = Usage::default();

    for (index, chunk) in chunks.iter().enumerate() {
        let call = GenerationCall::new(prompts::partial_summary(chunk))
            .with_temperature(temperature)
            .with_max_output_tokens(PARTIAL_MAX_TOKENS);
        let outcome = executor.execute(chain, &call).await?;
        debug!(chunk = index, attempts = outcome.attempts, "partial summary produced");
        usage.add(&outcome.usage);
        partials.push(clean_text(&outcome.text));
    }

    let call = GenerationCall::new(prompts::synthesis(&partials, bullets))
        .with_temperature(temperature)
        .with_max_output_tokens(SYNTHESIS_MAX_TOKENS);
    let outcome = executor.execute(chain, &call).await?;
    usage.add(&outcome.usage);

    Ok(MapReduceOutcome {
        text: clean_text(&outcome.text),
        candidate: outcome.candidate,
        usage,
        calls: chunks.len() as u32 + 1,
    })
}
