// Agent pipeline modules
//
// A planning agent decomposes a task into subtasks, an execution agent
// works through them one at a time, and the coordinator drives the run and
// streams progress events to the caller.

pub mod agent;
pub mod coordinator;
pub mod decode;
pub mod errors;
pub mod events;
pub mod executor;
pub mod llm;
pub mod planner;
pub mod prompts;
pub mod state;
pub mod types;

// Re-export main types
pub use coordinator::{Coordinator, ExecutionRecord};
pub use errors::{AgentError, AgentResult};
pub use events::{EventSink, ProgressEvent};
pub use executor::ExecutionAgent;
pub use llm::{ClientFactory, CompletionClient, OpenAiClient, OpenAiClientFactory};
pub use planner::PlanningAgent;
pub use types::{FinalReport, Plan, Subtask, SubtaskResult};
