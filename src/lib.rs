//! Library root for `helpdesk-bot`.
//!
//! Helpdesk-bot is an OpenAI-powered conversational helpdesk assistant designed to:
//! - Hold a rolling conversation with each user
//! - Extract structured support tickets from free-text issue reports
//! - Keep a bounded per-user history window in Redis
//!
//! The bot exposes a single HTTP chat endpoint, stores conversation history in
//! Redis, and uses OpenAI for responses and ticket extraction. The architecture
//! is built around extensible traits that allow for different implementations
//! of each service.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod server;
pub mod service;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the helpdesk-bot server:
/// - Creates the runtime context with the history store and LLM client
/// - Binds the HTTP listener and serves until shutdown
pub async fn start(config: Config) -> Void {
    info!("Starting helpdesk-bot ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Serve the HTTP surface.
    server::serve(runtime).await?;

    Ok(())
}
