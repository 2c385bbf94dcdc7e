//! Task descriptors for the orchestrator.

use crate::agent::AgentId;
use serde::Serialize;
use std::path::PathBuf;

/// A unit of work assigned to one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDescriptor {
    pub id: String,
    /// What to do; may contain `{{placeholders}}` filled at kickoff.
    pub description: String,
    /// What the final answer must look like.
    pub expected_output: String,
    /// The agent that runs this task.
    pub agent: AgentId,
    /// When set, the task's output is written here (overwriting).
    pub output_file: Option<PathBuf>,
}

impl TaskDescriptor {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: AgentId,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            output_file: None,
        }
    }

    /// Persist this task's output to `path`.
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }
}

/// Output of one completed task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutput {
    pub task_id: String,
    pub agent: AgentId,
    /// Description after placeholder interpolation.
    pub description: String,
    pub raw: String,
}
