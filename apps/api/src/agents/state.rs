/// Lifecycle of a single pipeline run
///
/// # Status Transitions
/// ```text
/// Idle -> Planning -> Executing(0) -> ... -> Executing(n) -> Aggregating -> Done
///   \_________\______________\_____________________\______________\--> Errored
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Planning,
    /// Running the subtask at this position in the plan
    Executing(usize),
    Aggregating,
    Done,
    Errored,
}

impl PipelineState {
    /// Checks if a transition from current state to next state is valid
    ///
    /// # Example
    /// ```
    /// use taskpilot_api::agents::state::PipelineState;
    ///
    /// assert!(PipelineState::Planning.can_transition_to(PipelineState::Executing(0)));
    /// assert!(!PipelineState::Executing(0).can_transition_to(PipelineState::Executing(2)));
    /// ```
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (*self, next) {
            (Idle, Planning) => true,
            (Planning, Executing(0)) => true,
            (Executing(i), Executing(j)) => j == i + 1,
            (Executing(_), Aggregating) => true,
            (Aggregating, Done) => true,
            (from, Errored) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Errored)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Planning => write!(f, "planning"),
            PipelineState::Executing(i) => write!(f, "executing({})", i),
            PipelineState::Aggregating => write!(f, "aggregating"),
            PipelineState::Done => write!(f, "done"),
            PipelineState::Errored => write!(f, "errored"),
        }
    }
}
