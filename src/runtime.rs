//! Runtime services and shared state for the helpdesk-bot.

use tracing::instrument;

use crate::{
    base::{config::Config, types::Res},
    service::{history::HistoryStore, llm::LlmClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the history store, the LLM client, and configuration.
/// Dependencies are constructed once at startup and passed in explicitly, so
/// tests can substitute fakes. It is designed to be trivially cloneable,
/// allowing it to be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The history store instance.
    pub history: HistoryStore,
    /// The LLM client instance.
    pub llm: LlmClient,
}

impl Runtime {
    /// Create a new runtime instance with the default backends.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the history store.
        let history = HistoryStore::redis(&config).await?;

        // Initialize the LLM client.
        let llm = LlmClient::openai(&config);

        Ok(Self { config, history, llm })
    }
}
