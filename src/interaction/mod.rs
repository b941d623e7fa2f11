//! Conversation orchestration for the helpdesk-bot.
//!
//! This module holds the logic between the HTTP surface and the services:
//! - Running a conversational turn and dispatching the model's decision
//! - Extracting structured tickets from free text

pub mod chat;
pub mod ticket;
