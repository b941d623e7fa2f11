//! Thin wrapper around async-openai for OpenAI LLM calls.

use std::sync::{Arc, OnceLock};

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage, ChatCompletionRequestSystemMessageContent,
        ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent, ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        FunctionObjectArgs,
    },
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    prompts,
    types::{AgentStep, HistoryRecord, Res, Role},
};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    model: String,
    system_directive: String,
    temperature: f32,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            model: config.openai_model.clone(),
            system_directive: config.system_directive.clone(),
            temperature: config.openai_temperature,
        }
    }

    /// Build the role-tagged message list for a conversational turn.
    #[instrument(name = "OpenAiLlmClient::build_turn_messages", skip_all)]
    fn build_turn_messages(&self, history: &[HistoryRecord], user_message: &str) -> Res<Vec<ChatCompletionRequestMessage>> {
        let mut messages = vec![ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(self.system_directive.clone()),
            name: Some("System".to_string()),
        })];

        for record in history {
            let message = match record.role {
                Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(record.content.clone()),
                    name: None,
                }),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default().content(record.content.clone()).build()?.into(),
            };

            messages.push(message);
        }

        messages.push(ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(user_message.to_string()),
            name: Some("User".to_string()),
        }));

        Ok(messages)
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    /// Send a single-shot prompt and return the raw text output.
    #[instrument(name = "OpenAiLlmClient::complete", skip_all)]
    async fn complete(&self, prompt: &str) -> Res<String> {
        debug!("Sending single-shot completion request");

        let messages = vec![ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
            name: None,
        })];

        let request = CreateChatCompletionRequestArgs::default().model(&self.model).messages(messages).temperature(self.temperature).build()?;

        // One call per invocation: transient model errors are not retried.
        let response = self.client.chat().create(request).await?;
        let content = response.choices.first().and_then(|choice| choice.message.content.clone()).unwrap_or_default();

        Ok(content)
    }

    /// Run one tool-using conversational turn.
    #[instrument(name = "OpenAiLlmClient::converse", skip_all)]
    async fn converse(&self, history: &[HistoryRecord], user_message: &str) -> Res<AgentStep> {
        debug!("Sending conversational turn with {} history records", history.len());

        let messages = self.build_turn_messages(history, user_message)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .tools(get_openai_agent_tools().clone())
            .build()?;

        let response = self.client.chat().create(request).await?;

        let Some(choice) = response.choices.into_iter().next() else {
            return Err(anyhow::anyhow!("LLM returned no choices."));
        };

        // A tool call, if present, wins over the text content for the turn.
        if let Some(tool_call) = choice.message.tool_calls.and_then(|calls| calls.into_iter().next()) {
            return Ok(AgentStep::ToolCall {
                tool: tool_call.function.name,
                arguments: tool_call.function.arguments,
            });
        }

        Ok(AgentStep::Reply {
            text: choice.message.content.unwrap_or_default(),
        })
    }
}

// Statics.

static OPENAI_AGENT_TOOLS: OnceLock<Vec<ChatCompletionTool>> = OnceLock::new();

/// Get the tools offered to the conversational agent.
fn get_openai_agent_tools() -> &'static Vec<ChatCompletionTool> {
    OPENAI_AGENT_TOOLS.get_or_init(|| {
        vec![
            ChatCompletionToolArgs::default()
                .r#type(ChatCompletionToolType::Function)
                .function(
                    FunctionObjectArgs::default()
                        .name(prompts::CREATE_TICKET_TOOL)
                        .description("Parse a user query into a structured helpdesk ticket.  Call this whenever the user describes an issue, a bug, or a request that should be tracked.")
                        .parameters(serde_json::json!({
                            "type": "object",
                            "properties": {
                                "query": {"type": "string", "description": "The user's request, verbatim, to convert into a ticket."},
                            },
                            "required": ["query"],
                            "additionalProperties": false
                        }))
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        ]
    })
}
