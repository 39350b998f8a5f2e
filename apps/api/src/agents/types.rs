use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::errors::{AgentError, AgentResult};

/// One unit of decomposed work inside a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub description: String,
    /// Ids of subtasks that should conceptually come first (not enforced)
    #[serde(default, deserialize_with = "id_strings")]
    pub dependencies: Vec<String>,
    /// Advisory effort estimate, never used for scheduling
    #[serde(default, deserialize_with = "opt_text", skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

/// Decomposition of a task produced by the planning agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub subtasks: Vec<Subtask>,
    /// Declared order; execution follows `subtasks` order regardless
    #[serde(default, deserialize_with = "id_strings")]
    pub execution_order: Vec<String>,
}

impl Plan {
    /// Check the structural invariants of a decoded plan
    ///
    /// # Business Rules Enforced
    /// - At least one subtask
    /// - Subtask ids are unique
    /// - Every execution-order id names a subtask in the plan
    ///
    /// Dependency ids are not checked; unknown ones are only logged.
    pub fn validate(&self) -> AgentResult<()> {
        if self.subtasks.is_empty() {
            return Err(AgentError::InvalidPlan("plan contains no subtasks".to_string()));
        }

        let mut ids = HashSet::with_capacity(self.subtasks.len());
        for subtask in &self.subtasks {
            if !ids.insert(subtask.id.as_str()) {
                return Err(AgentError::InvalidPlan(format!(
                    "duplicate subtask id '{}'",
                    subtask.id
                )));
            }
        }

        if let Some(unknown) = self
            .execution_order
            .iter()
            .find(|id| !ids.contains(id.as_str()))
        {
            return Err(AgentError::InvalidPlan(format!(
                "execution order references unknown subtask '{}'",
                unknown
            )));
        }

        for subtask in &self.subtasks {
            for dep in subtask.dependencies.iter().filter(|d| !ids.contains(d.as_str())) {
                tracing::warn!(
                    subtask = %subtask.id,
                    dependency = %dep,
                    "Subtask declares a dependency on an unknown subtask"
                );
            }
        }

        Ok(())
    }
}

/// Outcome status reported by the execution agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtaskStatus {
    Completed,
    InProgress,
    Failed,
}

impl std::fmt::Display for SubtaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubtaskStatus::Completed => write!(f, "completed"),
            SubtaskStatus::InProgress => write!(f, "in_progress"),
            SubtaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Free-form findings for one subtask; each field may be text or nested data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub main_findings: Value,
    #[serde(default)]
    pub supporting_data: Value,
    #[serde(default)]
    pub recommendations: Value,
}

/// Structured result of executing one subtask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtaskResult {
    #[serde(deserialize_with = "id_string")]
    pub task_id: String,
    pub status: SubtaskStatus,
    pub results: ResultBundle,
    #[serde(default, deserialize_with = "opt_text", skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<String>,
    #[serde(default, deserialize_with = "id_strings")]
    pub issues: Vec<String>,
}

impl SubtaskResult {
    /// Main findings rendered as text
    pub fn findings_text(&self) -> String {
        value_text(&self.results.main_findings)
    }
}

/// Aggregated output of a completed pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub original_task: String,
    pub plan: Plan,
    pub results: Vec<SubtaskResult>,
    pub summary: String,
}

impl FinalReport {
    pub fn new(original_task: impl Into<String>, plan: Plan, results: Vec<SubtaskResult>) -> Self {
        let summary = build_summary(&results);
        Self {
            original_task: original_task.into(),
            plan,
            results,
            summary,
        }
    }
}

/// Digest of all results: "Task k: status\nfindings", blank-line separated
///
/// # Example
/// ```
/// use taskpilot_api::agents::types::{build_summary, ResultBundle, SubtaskResult, SubtaskStatus};
///
/// let result = SubtaskResult {
///     task_id: "t1".to_string(),
///     status: SubtaskStatus::Completed,
///     results: ResultBundle {
///         main_findings: "Done".into(),
///         supporting_data: serde_json::Value::Null,
///         recommendations: serde_json::Value::Null,
///     },
///     execution_time: None,
///     issues: vec![],
/// };
///
/// assert_eq!(build_summary(&[result]), "Task 1: completed\nDone");
/// ```
pub fn build_summary(results: &[SubtaskResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| format!("Task {}: {}\n{}", i + 1, result.status, result.findings_text()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Models emit ids and estimates as either strings or bare numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawText> for String {
    fn from(raw: RawText) -> Self {
        match raw {
            RawText::Text(s) => s,
            RawText::Number(n) => n.to_string(),
        }
    }
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawText::deserialize(deserializer).map(String::from)
}

/// Lists may be missing, `null`, or contain numbers
fn id_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let ids = Option::<Vec<RawText>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(ids.into_iter().map(String::from).collect())
}

fn opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<RawText>::deserialize(deserializer).map(|raw| raw.map(String::from))
}
