use thiserror::Error;

/// Errors that can occur in the agent pipeline
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Completion request failed: {0}")]
    Completion(String),

    #[error("Malformed response from agent: {reason}")]
    MalformedResponse {
        reason: String,
        /// Raw completion text, kept for diagnostics only
        raw: String,
    },

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The caller-supplied credential cannot be used for a request
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),
}

impl AgentError {
    /// Message safe to show to the end caller.
    ///
    /// Never includes raw model output.
    pub fn public_message(&self) -> String {
        match self {
            AgentError::Completion(msg) => format!("Completion request failed: {}", msg),
            AgentError::MalformedResponse { .. } => "Invalid JSON response from agent".to_string(),
            AgentError::InvalidPlan(msg) => format!("Invalid plan: {}", msg),
            AgentError::InvalidStateTransition { .. } | AgentError::JsonError(_) => {
                "Internal pipeline error".to_string()
            }
            AgentError::ConfigError(_) => "Server configuration error".to_string(),
            AgentError::InvalidCredential(_) => "Invalid API key".to_string(),
        }
    }

    /// Whether the error stems from caller input rather than a server fault
    pub fn is_caller_error(&self) -> bool {
        matches!(self, AgentError::InvalidCredential(_))
    }

    pub(crate) fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        AgentError::MalformedResponse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
