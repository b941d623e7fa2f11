//! The conversational agent: one LLM turn, with ticket extraction on offer.

use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    base::{
        prompts,
        types::{AgentStep, AgentTurn, HistoryRecord, Res, ToolInvocation},
    },
    service::llm::LlmClient,
};

use super::ticket::TicketExtractor;

/// Arguments the model supplies when invoking the extraction tool.
#[derive(Debug, Deserialize)]
struct CreateTicketArgs {
    query: String,
}

/// Wraps the LLM with the system directive and the ticket extraction tool.
///
/// Per turn, the model decides whether to answer directly or to invoke
/// extraction; that decision is non-deterministic and model-dependent, and
/// this type only makes the outcome explicit.
#[derive(Clone)]
pub struct ConversationalAgent {
    llm: LlmClient,
    extractor: TicketExtractor,
}

impl ConversationalAgent {
    pub fn new(llm: LlmClient) -> Self {
        let extractor = TicketExtractor::new(llm.clone());
        Self { llm, extractor }
    }

    /// Run one turn against the supplied history.
    ///
    /// When the model invokes the extraction tool, the tool short-circuits the
    /// turn: its serialized outcome (ticket or failure) becomes the reply, and
    /// the invocation is recorded on the returned turn.
    #[instrument(name = "ConversationalAgent::respond", skip_all)]
    pub async fn respond(&self, user_message: &str, history: &[HistoryRecord]) -> Res<AgentTurn> {
        let step = self.llm.converse(history, user_message).await?;

        match step {
            AgentStep::Reply { text } => Ok(AgentTurn {
                reply: text,
                tool_invocations: Vec::new(),
            }),
            AgentStep::ToolCall { tool, arguments } if tool == prompts::CREATE_TICKET_TOOL => {
                info!("Ticket extraction tool invoked.");

                // Malformed arguments do not lose the turn: fall back to the
                // user's message as the query.
                let query = match serde_json::from_str::<CreateTicketArgs>(&arguments) {
                    Ok(args) => args.query,
                    Err(err) => {
                        warn!("Could not parse tool arguments, falling back to the user message: {err}");
                        user_message.to_string()
                    }
                };

                let outcome = self.extractor.extract(&query).await?;
                let reply = serde_json::to_string_pretty(&outcome)?;

                Ok(AgentTurn {
                    reply,
                    tool_invocations: vec![ToolInvocation {
                        tool,
                        result: outcome,
                    }],
                })
            }
            AgentStep::ToolCall { tool, .. } => {
                warn!("Unknown tool call: {tool}");
                Err(anyhow::anyhow!("Unknown tool call: {tool}"))
            }
        }
    }
}
