use std::sync::Arc;

use super::agent::{Agent, AgentRole};
use super::errors::AgentResult;
use super::llm::CompletionClient;
use super::types::Plan;

/// Planning Agent: decomposes a task into subtasks
///
/// Returns the decoded plan as-is; structural validation is left to the
/// coordinator.
#[derive(Debug, Clone)]
pub struct PlanningAgent {
    agent: Agent,
}

impl PlanningAgent {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            agent: Agent::new(AgentRole::planner(), client),
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Decompose `task` into a plan with one completion call
    pub async fn plan(&self, task: &str) -> AgentResult<Plan> {
        self.agent.process(task).await
    }
}
