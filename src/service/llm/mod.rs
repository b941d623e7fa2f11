pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{AgentStep, HistoryRecord, Res};

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the two ways the helpdesk-bot talks to a language model:
/// a plain single-shot completion (used by ticket extraction) and a tool-using
/// conversational turn. Implementing this trait allows different LLM providers
/// to be used with the helpdesk-bot.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Send a single-shot prompt with no conversational memory and return the
    /// model's raw text output.
    async fn complete(&self, prompt: &str) -> Res<String>;

    /// Run one conversational turn: the system directive, the prior history as
    /// role-tagged context, and the current message as the new turn, with the
    /// ticket extraction tool on offer.
    ///
    /// Whether the model answers directly or invokes the tool is the model's
    /// call; the returned [`AgentStep`] makes that decision explicit.
    async fn converse(&self, history: &[HistoryRecord], user_message: &str) -> Res<AgentStep>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}
