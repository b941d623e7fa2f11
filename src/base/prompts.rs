//! Prompt templates for LLM usage.

/// System directive for the conversational agent.
///
/// Establishes the assistant persona and the one rule that matters: issues,
/// bugs, and requests get routed through the `create_ticket` tool.
pub const SYSTEM_DIRECTIVE: &str = "You are a helpful helpdesk assistant. \
Respond conversationally to user queries. \
If the user describes an issue, bug, or request, \
call the create_ticket tool to structure it.";

/// Name of the ticket extraction tool as offered to the model.
pub const CREATE_TICKET_TOOL: &str = "create_ticket";

/// Build the single-shot ticket extraction prompt, embedding the user's text
/// verbatim.
pub fn ticket_extraction_prompt(query: &str) -> String {
    format!(
        r#"Convert the following user request into a JSON helpdesk ticket with these fields:
- title: short summary
- description: detailed description
- priority: low, medium, or high
- tags: list of strings
- assigned_to: string or null
- due_date: ISO-8601 date string or null
- metadata: free-form object

Return ONLY valid JSON, nothing else.

User query:
"""{query}"""
"#
    )
}
