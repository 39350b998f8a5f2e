use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use super::errors::{AgentError, AgentResult};
use super::events::{EventSink, NoopSink, ProgressEvent};
use super::executor::ExecutionAgent;
use super::llm::CompletionClient;
use super::planner::PlanningAgent;
use super::state::PipelineState;
use super::types::{FinalReport, SubtaskResult, SubtaskStatus};

/// One entry in the coordinator's execution log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub run_id: Uuid,
    /// Subtask id, or `None` for a record describing the whole run
    pub task_id: Option<String>,
    pub status: SubtaskStatus,
    pub result: String,
    pub timestamp: DateTime<Utc>,
}

/// Coordinator driving the plan -> execute pipeline
///
/// Owns one planning agent and one execution agent. A run plans the task,
/// executes every subtask strictly one after another in the order the plan
/// lists them, and aggregates the results into a `FinalReport`. The first
/// failure at any stage aborts the run.
///
/// Declared dependencies and `execution_order` are not used for scheduling.
#[derive(Debug)]
pub struct Coordinator {
    planner: PlanningAgent,
    executor: ExecutionAgent,
    history: Vec<ExecutionRecord>,
}

impl Coordinator {
    pub fn new(planner: PlanningAgent, executor: ExecutionAgent) -> Self {
        Self {
            planner,
            executor,
            history: Vec::new(),
        }
    }

    /// Build both agents on top of one completion client
    pub fn from_client(client: Arc<dyn CompletionClient>) -> Self {
        Self::new(
            PlanningAgent::new(client.clone()),
            ExecutionAgent::new(client),
        )
    }

    /// Run the full pipeline for `task`, reporting progress to `sink`
    ///
    /// # Returns
    /// * `Ok(FinalReport)` - after a `final` event has been emitted
    /// * `Err(AgentError)` - after exactly one `error` event has been emitted
    pub async fn process_task<S>(&mut self, task: &str, sink: &mut S) -> AgentResult<FinalReport>
    where
        S: EventSink + ?Sized,
    {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("process_task", %run_id);

        self.run(run_id, task, sink).instrument(span).await
    }

    /// Run the pipeline without observing progress
    pub async fn process_task_silent(&mut self, task: &str) -> AgentResult<FinalReport> {
        self.process_task(task, &mut NoopSink).await
    }

    /// Timestamped log of every subtask outcome and failed run so far
    pub fn execution_history(&self) -> &[ExecutionRecord] {
        &self.history
    }

    async fn run<S>(&mut self, run_id: Uuid, task: &str, sink: &mut S) -> AgentResult<FinalReport>
    where
        S: EventSink + ?Sized,
    {
        let mut state = PipelineState::Idle;

        match self.run_pipeline(run_id, task, &mut state, sink).await {
            Ok(report) => {
                tracing::info!(subtasks = report.results.len(), "Task completed");
                Ok(report)
            }
            Err(err) => {
                if state.can_transition_to(PipelineState::Errored) {
                    state = PipelineState::Errored;
                }
                tracing::error!(error = %err, state = %state, "Task failed");

                self.history.push(ExecutionRecord {
                    run_id,
                    task_id: None,
                    status: SubtaskStatus::Failed,
                    result: err.to_string(),
                    timestamp: Utc::now(),
                });
                sink.emit(ProgressEvent::Error {
                    error: err.public_message(),
                });
                Err(err)
            }
        }
    }

    async fn run_pipeline<S>(
        &mut self,
        run_id: Uuid,
        task: &str,
        state: &mut PipelineState,
        sink: &mut S,
    ) -> AgentResult<FinalReport>
    where
        S: EventSink + ?Sized,
    {
        advance(state, PipelineState::Planning)?;
        sink.emit(ProgressEvent::planning_start());

        let plan = self.planner.plan(task).await?;
        plan.validate()?;
        tracing::info!(subtasks = plan.subtasks.len(), "Plan accepted");

        advance(state, PipelineState::Executing(0))?;
        sink.emit(ProgressEvent::PlanningComplete { plan: plan.clone() });

        let mut results: Vec<SubtaskResult> = Vec::with_capacity(plan.subtasks.len());
        for (index, subtask) in plan.subtasks.iter().enumerate() {
            if index > 0 {
                advance(state, PipelineState::Executing(index))?;
            }
            sink.emit(ProgressEvent::ExecutionStart {
                subtask: subtask.description.clone(),
            });

            let result = self.executor.execute(subtask).await?;
            tracing::info!(subtask = %subtask.id, status = %result.status, "Subtask finished");

            self.history.push(ExecutionRecord {
                run_id,
                task_id: Some(subtask.id.clone()),
                status: result.status,
                result: result.findings_text(),
                timestamp: Utc::now(),
            });
            sink.emit(ProgressEvent::ExecutionComplete {
                result: result.clone(),
            });
            results.push(result);
        }

        advance(state, PipelineState::Aggregating)?;
        let report = FinalReport::new(task, plan, results);

        advance(state, PipelineState::Done)?;
        sink.emit(ProgressEvent::Final {
            result: report.clone(),
        });

        Ok(report)
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) -> AgentResult<()> {
    if !state.can_transition_to(next) {
        return Err(AgentError::InvalidStateTransition {
            from: state.to_string(),
            to: next.to_string(),
        });
    }

    tracing::debug!(from = %state, to = %next, "Pipeline transition");
    *state = next;
    Ok(())
}
