// Progress events pushed to the caller while a task runs
//
// Each event serializes to a JSON object tagged with `type`. Sinks receive
// events strictly in emission order.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use super::types::{FinalReport, Plan, SubtaskResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Emitted by the transport when the stream opens
    Connection { message: String },
    PlanningStart { message: String },
    PlanningComplete { plan: Plan },
    /// Carries the description of the subtask about to run
    ExecutionStart { subtask: String },
    ExecutionComplete { result: SubtaskResult },
    Error { error: String },
    Final { result: FinalReport },
}

impl ProgressEvent {
    pub fn connection() -> Self {
        ProgressEvent::Connection {
            message: "Connected to agent system".to_string(),
        }
    }

    pub fn planning_start() -> Self {
        ProgressEvent::PlanningStart {
            message: "Starting task planning...".to_string(),
        }
    }

    /// The `type` tag this event serializes with
    pub fn kind(&self) -> &'static str {
        match self {
            ProgressEvent::Connection { .. } => "connection",
            ProgressEvent::PlanningStart { .. } => "planning_start",
            ProgressEvent::PlanningComplete { .. } => "planning_complete",
            ProgressEvent::ExecutionStart { .. } => "execution_start",
            ProgressEvent::ExecutionComplete { .. } => "execution_complete",
            ProgressEvent::Error { .. } => "error",
            ProgressEvent::Final { .. } => "final",
        }
    }

    /// `final` and `error` end a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Error { .. } | ProgressEvent::Final { .. })
    }
}

/// Receiver of progress events
pub trait EventSink: Send {
    fn emit(&mut self, event: ProgressEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&mut self, _event: ProgressEvent) {}
}

impl EventSink for Vec<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

impl EventSink for UnboundedSender<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        // Receiver gone means the client disconnected; the run keeps going.
        if self.send(event).is_err() {
            tracing::debug!("Progress event dropped, receiver closed");
        }
    }
}

/// Adapts a callback into a sink
pub struct FnSink<F>(pub F);

impl<F> EventSink for FnSink<F>
where
    F: FnMut(ProgressEvent) + Send,
{
    fn emit(&mut self, event: ProgressEvent) {
        (self.0)(event)
    }
}
