//! Ticket extraction: turning free text into a structured [`Ticket`].
//!
//! The extractor sends a fixed instruction embedding the user's text to the
//! model as a single-shot request, then scrapes the reply for a JSON object.
//! The scraping order is a behavior contract: first the substring from the
//! first `{` to the last `}` inclusive, then the whole string, then failure.

use tracing::{instrument, warn};

use crate::{
    base::{
        prompts,
        types::{ExtractionFailure, ExtractionOutcome, Res, Ticket},
    },
    service::llm::LlmClient,
};

/// Maximum number of characters of raw model output carried in a failure.
const RAW_OUTPUT_SAMPLE_LEN: usize = 500;

/// Converts free text into a structured ticket via a single model call.
#[derive(Clone)]
pub struct TicketExtractor {
    llm: LlmClient,
}

impl TicketExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Extract a ticket from free text.
    ///
    /// Parse and validation failures are part of the outcome, not errors:
    /// callers get an [`ExtractionOutcome::Failed`] carrying a message and a
    /// sample of the raw model output. Only a failed model call itself (a
    /// dependency failure) surfaces as `Err`. No retry is made.
    #[instrument(name = "TicketExtractor::extract", skip_all)]
    pub async fn extract(&self, free_text: &str) -> Res<ExtractionOutcome> {
        let prompt = prompts::ticket_extraction_prompt(free_text);

        // Capture the raw output before any parse attempt so the failure
        // branch always has it.
        let raw = self.llm.complete(&prompt).await?;

        match parse_ticket(&raw) {
            Ok(ticket) => Ok(ExtractionOutcome::Ticket(ticket)),
            Err(err) => {
                warn!("Ticket extraction failed: {err}");

                Ok(ExtractionOutcome::Failed(ExtractionFailure {
                    error: format!("Failed to create ticket: {err}"),
                    raw_output: truncate_raw_output(&raw),
                }))
            }
        }
    }
}

/// Parse a ticket out of raw model text.
///
/// Locates the first `{` and the last `}` and parses the substring between
/// them, inclusive; this tolerates commentary the model may wrap around the
/// JSON. If no such pair exists, the whole string is tried instead. The parsed
/// object must conform to the [`Ticket`] shape, including the strict priority
/// vocabulary.
pub fn parse_ticket(raw: &str) -> Res<Ticket> {
    let payload = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw,
    };

    Ok(serde_json::from_str(payload)?)
}

/// Take at most the first [`RAW_OUTPUT_SAMPLE_LEN`] characters of raw output.
fn truncate_raw_output(raw: &str) -> String {
    raw.chars().take(RAW_OUTPUT_SAMPLE_LEN).collect()
}
