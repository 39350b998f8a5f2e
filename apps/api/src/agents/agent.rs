use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::decode::decode_response;
use super::errors::{AgentError, AgentResult};
use super::llm::{ChatMessage, CompletionClient};
use super::prompts::{library, PromptTemplate};

/// Output shape an agent role is instructed to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSchema {
    Plan,
    SubtaskResult,
}

impl OutputSchema {
    pub fn name(&self) -> &'static str {
        match self {
            OutputSchema::Plan => "plan",
            OutputSchema::SubtaskResult => "subtask_result",
        }
    }
}

impl std::fmt::Display for OutputSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration that distinguishes one agent role from another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRole {
    pub name: String,
    pub description: String,
    pub prompt: PromptTemplate,
    pub schema: OutputSchema,
}

impl AgentRole {
    pub fn planner() -> Self {
        Self {
            name: "TaskPlanner".to_string(),
            description: "Breaks down complex tasks into manageable subtasks".to_string(),
            prompt: library::task_planning(),
            schema: OutputSchema::Plan,
        }
    }

    pub fn executor() -> Self {
        Self {
            name: "ExecutionAgent".to_string(),
            description: "Executes specific tasks and provides detailed results".to_string(),
            prompt: library::task_execution(),
            schema: OutputSchema::SubtaskResult,
        }
    }
}

/// A role bound to a completion client
///
/// Every call to `process` issues exactly one completion request:
/// the role's system instruction followed by the input as the user message.
#[derive(Clone)]
pub struct Agent {
    role: AgentRole,
    client: Arc<dyn CompletionClient>,
}

impl Agent {
    pub fn new(role: AgentRole, client: Arc<dyn CompletionClient>) -> Self {
        Self { role, client }
    }

    pub fn role(&self) -> &AgentRole {
        &self.role
    }

    pub fn name(&self) -> &str {
        &self.role.name
    }

    /// Messages sent for a given input
    pub fn messages(&self, input: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.role.prompt.system.clone()),
            ChatMessage::user(input),
        ]
    }

    /// Run one completion for `input` and decode it into `T`
    ///
    /// Decode failures name the role's expected schema in their reason.
    pub async fn process<T: DeserializeOwned>(&self, input: &str) -> AgentResult<T> {
        tracing::info!(
            agent = %self.role.name,
            prompt = %self.role.prompt.name,
            prompt_version = %self.role.prompt.version,
            schema = %self.role.schema,
            "Agent received input"
        );

        let raw = self.client.complete(&self.messages(input)).await?;
        let output = decode_response(&raw).map_err(|err| match err {
            AgentError::MalformedResponse { reason, raw } => AgentError::MalformedResponse {
                reason: format!("expected {}: {}", self.role.schema, reason),
                raw,
            },
            other => other,
        })?;

        tracing::info!(agent = %self.role.name, "Agent produced output");
        Ok(output)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent").field("role", &self.role).finish()
    }
}
