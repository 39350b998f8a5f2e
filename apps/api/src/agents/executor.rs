use std::sync::Arc;

use super::agent::{Agent, AgentRole};
use super::errors::AgentResult;
use super::llm::CompletionClient;
use super::types::{Subtask, SubtaskResult};

/// Execution Agent: produces a structured result for one subtask
#[derive(Debug, Clone)]
pub struct ExecutionAgent {
    agent: Agent,
}

impl ExecutionAgent {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            agent: Agent::new(AgentRole::executor(), client),
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Execute a single subtask; the subtask is sent to the model as JSON
    pub async fn execute(&self, subtask: &Subtask) -> AgentResult<SubtaskResult> {
        tracing::debug!(subtask = %subtask.id, description = %subtask.description, "Executing subtask");

        let input = serde_json::to_string(subtask)?;
        self.agent.process(&input).await
    }
}
