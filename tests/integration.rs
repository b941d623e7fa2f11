#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{Json, extract::State};
use helpdesk_bot::{
    base::{
        config::{Config, ConfigInner},
        prompts,
        types::{AgentStep, ChatRequest, ExtractionOutcome, HistoryRecord, Priority, Res, Role},
    },
    interaction::ticket::TicketExtractor,
    runtime::Runtime,
    server,
    service::{
        history::{HistoryStore, WINDOW_SIZE},
        llm::{GenericLlmClient, LlmClient},
    },
};
use mockall::mock;

// Mocks.

// Mock LLM client for testing.

mock! {
    pub Llm {}

    #[async_trait]
    impl GenericLlmClient for Llm {
        async fn complete(&self, prompt: &str) -> Res<String>;
        async fn converse(&self, history: &[HistoryRecord], user_message: &str) -> Res<AgentStep>;
    }
}

const TICKET_JSON: &str = r#"{
    "title": "Printer jammed on floor 3",
    "description": "The printer on floor 3 is jammed and needs to be fixed by Friday.",
    "priority": "high",
    "tags": ["printer", "hardware"],
    "assigned_to": null,
    "due_date": "2026-08-28",
    "metadata": {"floor": "3"}
}"#;

fn get_test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| "test_key".to_string()),
            openai_model: "gpt-4.1-mini".to_string(),
            openai_temperature: 0.2,
            system_directive: prompts::SYSTEM_DIRECTIVE.to_string(),
            redis_url: "redis://localhost:6379/0".to_string(),
            bind_address: "127.0.0.1:0".to_string(),
        }),
    }
}

/// Helper function to setup the test environment with a mocked LLM and an
/// in-memory history store.
fn setup_test_environment(llm: MockLlm) -> Runtime {
    Runtime {
        config: get_test_config(),
        history: HistoryStore::memory(),
        llm: LlmClient::new(Arc::new(llm)),
    }
}

fn has_openai_api_key() -> bool {
    std::env::var("OPENAI_API_KEY").map(|key| !key.is_empty()).unwrap_or(false)
}

// Offline tests (mocked LLM).

#[tokio::test]
async fn test_conversational_turn_yields_no_ticket() {
    let mut llm = MockLlm::new();
    llm.expect_converse().returning(|_, _| {
        Ok(AgentStep::Reply {
            text: "Hello! How can I help you today?".to_string(),
        })
    });

    let runtime = setup_test_environment(llm);

    let req = ChatRequest {
        user_id: "u1".to_string(),
        message: "hi".to_string(),
    };

    let Json(response) = server::chat(State(runtime.clone()), Json(req)).await.expect("chat request should succeed");

    assert!(response.ticket.is_none());
    assert!(!response.reply.is_empty());

    // Exactly two new records: the user turn, then the assistant turn.
    let window = runtime.history.read("u1").await.unwrap();
    assert_eq!(window.len(), 2);
    assert_eq!(window[0].role, Role::User);
    assert_eq!(window[0].content, "hi");
    assert_eq!(window[1].role, Role::Assistant);
    assert_eq!(window[1].content, response.reply);
}

#[tokio::test]
async fn test_ticket_turn_yields_structured_ticket() {
    let mut llm = MockLlm::new();
    llm.expect_converse().returning(|_, _| {
        Ok(AgentStep::ToolCall {
            tool: prompts::CREATE_TICKET_TOOL.to_string(),
            arguments: r#"{"query": "My printer on floor 3 is jammed, need it fixed by Friday"}"#.to_string(),
        })
    });
    llm.expect_complete().returning(|_| Ok(TICKET_JSON.to_string()));

    let runtime = setup_test_environment(llm);

    let req = ChatRequest {
        user_id: "u2".to_string(),
        message: "My printer on floor 3 is jammed, need it fixed by Friday".to_string(),
    };

    let Json(response) = server::chat(State(runtime.clone()), Json(req)).await.expect("chat request should succeed");

    let Some(ExtractionOutcome::Ticket(ticket)) = response.ticket else {
        panic!("Expected a structured ticket, got {:?}", response.ticket);
    };

    assert!(!ticket.title.is_empty());
    assert!(!ticket.description.is_empty());
    assert_eq!(ticket.priority, Priority::High);
    assert_eq!(ticket.due_date.as_deref(), Some("2026-08-28"));

    // The tool short-circuits the turn: the reply carries the outcome.
    assert!(response.reply.contains("Printer jammed on floor 3"));

    let window = runtime.history.read("u2").await.unwrap();
    assert_eq!(window.len(), 2);
}

#[tokio::test]
async fn test_failed_extraction_degrades_to_error_payload() {
    let prose = "I'm sorry, I could not turn that into a ticket.".to_string();
    let prose_clone = prose.clone();

    let mut llm = MockLlm::new();
    llm.expect_converse().returning(|_, _| {
        Ok(AgentStep::ToolCall {
            tool: prompts::CREATE_TICKET_TOOL.to_string(),
            arguments: r#"{"query": "something vague"}"#.to_string(),
        })
    });
    llm.expect_complete().returning(move |_| Ok(prose_clone.clone()));

    let runtime = setup_test_environment(llm);

    let req = ChatRequest {
        user_id: "u3".to_string(),
        message: "something vague".to_string(),
    };

    // The request still succeeds: extraction failures are values, not errors.
    let Json(response) = server::chat(State(runtime.clone()), Json(req)).await.expect("chat request should succeed");

    let Some(ExtractionOutcome::Failed(failure)) = response.ticket else {
        panic!("Expected an extraction failure, got {:?}", response.ticket);
    };

    assert!(failure.error.starts_with("Failed to create ticket:"));
    assert!(failure.raw_output.len() <= 500);
    assert!(prose.starts_with(&failure.raw_output));

    // The two-record history update happens regardless of extraction success.
    let window = runtime.history.read("u3").await.unwrap();
    assert_eq!(window.len(), 2);
}

#[tokio::test]
async fn test_malformed_tool_arguments_fall_back_to_user_message() {
    let mut llm = MockLlm::new();
    llm.expect_converse().returning(|_, _| {
        Ok(AgentStep::ToolCall {
            tool: prompts::CREATE_TICKET_TOOL.to_string(),
            arguments: "not json at all".to_string(),
        })
    });
    // The extraction prompt must embed the original user message.
    llm.expect_complete()
        .withf(|prompt| prompt.contains("my laptop will not boot"))
        .returning(|_| Ok(TICKET_JSON.to_string()));

    let runtime = setup_test_environment(llm);

    let req = ChatRequest {
        user_id: "u4".to_string(),
        message: "my laptop will not boot".to_string(),
    };

    let Json(response) = server::chat(State(runtime), Json(req)).await.expect("chat request should succeed");

    assert!(matches!(response.ticket, Some(ExtractionOutcome::Ticket(_))));
}

#[tokio::test]
async fn test_unknown_tool_call_fails_the_request() {
    let mut llm = MockLlm::new();
    llm.expect_converse().returning(|_, _| {
        Ok(AgentStep::ToolCall {
            tool: "reboot_datacenter".to_string(),
            arguments: "{}".to_string(),
        })
    });

    let runtime = setup_test_environment(llm);

    let req = ChatRequest {
        user_id: "u5".to_string(),
        message: "hi".to_string(),
    };

    let result = server::chat(State(runtime), Json(req)).await;

    assert!(result.is_err(), "An unknown tool call should abort the request");
}

#[tokio::test]
async fn test_agent_sees_pre_update_history() {
    let mut llm = MockLlm::new();
    // The incoming message is appended *after* the history snapshot the agent
    // receives, so the first turn sees an empty window.
    llm.expect_converse()
        .withf(|history, _| history.is_empty())
        .returning(|_, _| {
            Ok(AgentStep::Reply {
                text: "First reply.".to_string(),
            })
        });

    let runtime = setup_test_environment(llm);

    let req = ChatRequest {
        user_id: "u6".to_string(),
        message: "hello".to_string(),
    };

    server::chat(State(runtime), Json(req)).await.expect("chat request should succeed");
}

#[tokio::test]
async fn test_history_stays_bounded_across_requests() {
    let mut llm = MockLlm::new();
    llm.expect_converse().returning(|_, _| {
        Ok(AgentStep::Reply {
            text: "ack".to_string(),
        })
    });

    let runtime = setup_test_environment(llm);

    // Pre-fill the window right up to the bound.
    for i in 0..WINDOW_SIZE {
        runtime.history.append("u7", Role::User, &format!("old {i}")).await.unwrap();
    }

    let req = ChatRequest {
        user_id: "u7".to_string(),
        message: "newest".to_string(),
    };

    server::chat(State(runtime.clone()), Json(req)).await.expect("chat request should succeed");

    let window = runtime.history.read("u7").await.unwrap();

    assert_eq!(window.len(), WINDOW_SIZE);
    // Oldest records dropped; the latest exchange survives at the tail.
    assert_eq!(window[WINDOW_SIZE - 2].content, "newest");
    assert_eq!(window[WINDOW_SIZE - 1].content, "ack");
}

#[tokio::test]
async fn test_health_reports_stable_model() {
    let runtime = setup_test_environment(MockLlm::new());

    let Json(first) = server::health(State(runtime.clone())).await;
    let Json(second) = server::health(State(runtime)).await;

    assert_eq!(first.status, "ok");
    assert_eq!(first.model, second.model);
    assert_eq!(first.model, "gpt-4.1-mini");
}

// Live tests (real OpenAI; skipped when no API key is configured).

#[tokio::test]
async fn test_live_ticket_extraction_shape() {
    if !has_openai_api_key() {
        eprintln!("OPENAI_API_KEY not set, skipping live extraction test.");
        return;
    }

    let config = get_test_config();
    let extractor = TicketExtractor::new(LlmClient::openai(&config));

    let outcome = extractor.extract("My printer on floor 3 is jammed, need it fixed by Friday").await.unwrap();

    let ExtractionOutcome::Ticket(ticket) = outcome else {
        panic!("Expected a ticket from a well-formed issue report, got {outcome:?}");
    };

    assert!(!ticket.title.is_empty());
    assert!(!ticket.description.is_empty());

    if let Some(due_date) = &ticket.due_date {
        assert!(chrono::NaiveDate::parse_from_str(due_date, "%Y-%m-%d").is_ok(), "due_date should be a valid ISO-8601 date: {due_date}");
    }
}

#[tokio::test]
async fn test_live_conversational_turn() {
    if !has_openai_api_key() {
        eprintln!("OPENAI_API_KEY not set, skipping live conversational test.");
        return;
    }

    let config = get_test_config();
    let llm = LlmClient::openai(&config);

    let step = llm.converse(&[], "Hello! Just saying hi, no issues today.").await.unwrap();

    match step {
        AgentStep::Reply { text } => assert!(!text.is_empty()),
        AgentStep::ToolCall { tool, .. } => assert_eq!(tool, prompts::CREATE_TICKET_TOOL),
    }
}
