//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the helpdesk-bot:
//! - History stores (e.g., Redis)
//! - LLM services (e.g., OpenAI)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod history;
pub mod llm;
