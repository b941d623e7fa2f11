use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Crate-wide error type.
pub type Err = anyhow::Error;
/// Crate-wide result type.
pub type Res<T> = Result<T, Err>;
/// Result with no success value.
pub type Void = Res<()>;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user.
    User,
    /// The assistant.
    Assistant,
}

/// One stored conversation turn.
///
/// Records are immutable once written; the store keys them by user id and
/// preserves insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Author of the turn.
    pub role: Role,
    /// Text of the turn.
    pub content: String,
    /// When the turn was recorded.
    pub ts: DateTime<Utc>,
}

impl HistoryRecord {
    /// Create a record stamped with the current UTC time.
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            ts: Utc::now(),
        }
    }
}

/// Ticket priority vocabulary.
///
/// Deserialization is strict: anything other than the lowercase literals
/// `low`, `medium`, or `high` is a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
}

/// Structured support ticket extracted from free text.
///
/// Constructed transiently per extraction call; this system does not persist
/// tickets. Unset optional fields are omitted from serialized output rather
/// than emitted as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Short summary of the issue.
    pub title: String,
    /// Full description of the issue.
    pub description: String,
    /// Ticket priority.
    pub priority: Priority,
    /// Free-form labels.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Assignee, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Due date, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Additional structured data.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A failed ticket extraction, returned as a value rather than an error.
///
/// `raw_output` holds at most the first 500 characters of the model's text so
/// callers (and end users) can see what the model actually said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    /// Why the extraction failed.
    pub error: String,
    /// Truncated raw model output.
    pub raw_output: String,
}

/// The result of one extraction tool run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionOutcome {
    /// A successfully extracted ticket.
    Ticket(Ticket),
    /// A failed extraction.
    Failed(ExtractionFailure),
}

/// The model's per-turn decision: answer directly, or invoke a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentStep {
    /// Answer the user directly.
    Reply {
        /// The reply text.
        text: String,
    },
    /// Invoke a tool.
    ToolCall {
        /// Name of the tool to invoke.
        tool: String,
        /// JSON-encoded tool arguments.
        arguments: String,
    },
}

/// A capability call the agent made mid-turn, with its typed result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInvocation {
    /// Name of the tool invoked.
    pub tool: String,
    /// Result of the invocation.
    pub result: ExtractionOutcome,
}

/// The agent's completed turn: the reply text plus any tool invocations made
/// while producing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentTurn {
    /// The reply text.
    pub reply: String,
    /// Tool invocations made during the turn.
    pub tool_invocations: Vec<ToolInvocation>,
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Identifier of the user sending the message.
    pub user_id: String,
    /// The user's message text.
    pub message: String,
}

/// Response of `POST /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// The assistant's reply text.
    pub reply: String,
    /// Ticket extraction outcome, if an extraction ran.
    pub ticket: Option<ExtractionOutcome>,
    /// When the reply was produced.
    pub timestamp: DateTime<Utc>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status string.
    pub status: String,
    /// Configured model name.
    pub model: String,
}
