//! Sequential task orchestrator for Tubeblog.
//!
//! Runs a fixed list of tasks, each on its assigned agent, feeding every
//! completed output forward as context for the next task.

use crate::agent::{AgentCapability, AgentId};
use crate::config::{Prompts, TaskPrompts};
use crate::error::{Result, TubeblogError};
use crate::task::{TaskDescriptor, TaskOutput};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Separator between earlier task outputs in the context handed forward.
const CONTEXT_SEPARATOR: &str = "\n\n----------\n\n";

/// How tasks are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// One task at a time, in declared order.
    #[default]
    Sequential,
}

/// How much of the run is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Detailed,
}

impl Verbosity {
    /// Map a slider level (0..=2).
    pub fn from_level(level: u8) -> Result<Self> {
        match level {
            0 => Ok(Verbosity::Quiet),
            1 => Ok(Verbosity::Normal),
            2 => Ok(Verbosity::Detailed),
            _ => Err(TubeblogError::InvalidInput(format!(
                "Verbosity must be 0, 1 or 2, got {}",
                level
            ))),
        }
    }
}

/// Lifecycle of one orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Running { task_index: usize, task_id: String },
    Complete,
    Failed,
}

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    TaskStarted { task_id: String, agent_role: String },
    ToolUsed { agent_role: String, tool: String, arguments: String },
    TaskCompleted { task_id: String, agent_role: String },
    TaskFailed { task_id: String, agent_role: String, error: String },
}

impl PipelineEvent {
    /// Lowest verbosity at which the event is shown.
    pub fn min_verbosity(&self) -> Verbosity {
        match self {
            PipelineEvent::ToolUsed { .. } => Verbosity::Detailed,
            _ => Verbosity::Normal,
        }
    }
}

impl std::fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineEvent::TaskStarted { task_id, agent_role } => {
                write!(f, "{} started task '{}'", agent_role, task_id)
            }
            PipelineEvent::ToolUsed { agent_role, tool, arguments } => {
                write!(f, "{} used {}({})", agent_role, tool, arguments)
            }
            PipelineEvent::TaskCompleted { task_id, agent_role } => {
                write!(f, "{} completed task '{}'", agent_role, task_id)
            }
            PipelineEvent::TaskFailed { task_id, agent_role, error } => {
                write!(f, "{} failed task '{}': {}", agent_role, task_id, error)
            }
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Output of the last task.
    pub content: String,
    pub task_outputs: Vec<TaskOutput>,
    pub events: Vec<PipelineEvent>,
    /// Last file written by a task, if any.
    pub output_file: Option<PathBuf>,
    pub completed_at: DateTime<Utc>,
}

impl PipelineResult {
    /// A result carrying only final content.
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            task_outputs: Vec::new(),
            events: Vec::new(),
            output_file: None,
            completed_at: Utc::now(),
        }
    }

    /// Events visible at the given verbosity.
    pub fn visible_events(&self, verbosity: Verbosity) -> Vec<&PipelineEvent> {
        self.events
            .iter()
            .filter(|e| verbosity != Verbosity::Quiet && e.min_verbosity() <= verbosity)
            .collect()
    }
}

/// Composes agents and tasks into a pipeline and runs it once.
pub struct Orchestrator {
    agents: Vec<Arc<dyn AgentCapability>>,
    tasks: Vec<TaskDescriptor>,
    process: Process,
    verbosity: Verbosity,
    task_template: String,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl Orchestrator {
    /// Create an orchestrator.
    ///
    /// Fails if there are no tasks, if two agents share an id, or if a task
    /// references an agent that is not part of the pipeline.
    pub fn new(
        agents: Vec<Arc<dyn AgentCapability>>,
        tasks: Vec<TaskDescriptor>,
        process: Process,
    ) -> Result<Self> {
        if tasks.is_empty() {
            return Err(TubeblogError::Config("Pipeline has no tasks".to_string()));
        }

        let mut ids = HashSet::new();
        for agent in &agents {
            if !ids.insert(agent.descriptor().id.clone()) {
                return Err(TubeblogError::Config(format!(
                    "Duplicate agent id: {}",
                    agent.descriptor().id
                )));
            }
        }

        if let Some(task) = tasks.iter().find(|t| !ids.contains(&t.agent)) {
            return Err(TubeblogError::Config(format!(
                "Task '{}' references unknown agent '{}'",
                task.id, task.agent
            )));
        }

        Ok(Self {
            agents,
            tasks,
            process,
            verbosity: Verbosity::default(),
            task_template: TaskPrompts::default().task_template,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        })
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Template wrapping each task description; sees `{{description}}` and `{{expected_output}}`.
    pub fn with_task_template(mut self, template: &str) -> Self {
        self.task_template = template.to_string();
        self
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Run every task and return the final output.
    ///
    /// `inputs` fill `{{key}}` placeholders in task descriptions. An
    /// orchestrator runs once; calling this again is an error.
    #[instrument(skip_all, fields(run_id = %uuid::Uuid::new_v4(), process = ?self.process, tasks = self.tasks.len()))]
    pub async fn kickoff(&mut self, inputs: &HashMap<String, String>) -> Result<PipelineResult> {
        if self.state != PipelineState::Idle {
            return Err(TubeblogError::InvalidInput(format!(
                "Pipeline already ran (state: {:?})",
                self.state
            )));
        }

        match self.process {
            Process::Sequential => self.run_sequential(inputs).await,
        }
    }

    /// Run tasks one at a time, handing every earlier output forward.
    async fn run_sequential(&mut self, inputs: &HashMap<String, String>) -> Result<PipelineResult> {
        let tasks = self.tasks.clone();
        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(tasks.len());
        let mut events = Vec::new();
        let mut output_file = None;

        for (index, task) in tasks.iter().enumerate() {
            self.transition(PipelineState::Running {
                task_index: index,
                task_id: task.id.clone(),
            });

            let agent = self.agent(&task.agent)?;
            let role = agent.descriptor().role.clone();
            events.push(PipelineEvent::TaskStarted {
                task_id: task.id.clone(),
                agent_role: role.clone(),
            });
            self.report(&format!("{} started task '{}'", role, task.id));

            let description = Prompts::render(&task.description, inputs);
            let prompt = self.task_prompt(&description, &task.expected_output);
            let context = (!outputs.is_empty()).then(|| {
                outputs
                    .iter()
                    .map(|o| o.raw.as_str())
                    .collect::<Vec<_>>()
                    .join(CONTEXT_SEPARATOR)
            });

            let response = match agent.invoke(&prompt, context.as_deref()).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Task '{}' failed: {}", task.id, e);
                    events.push(PipelineEvent::TaskFailed {
                        task_id: task.id.clone(),
                        agent_role: role,
                        error: e.to_string(),
                    });
                    self.transition(PipelineState::Failed);
                    return Err(e);
                }
            };

            for call in &response.tool_calls {
                events.push(PipelineEvent::ToolUsed {
                    agent_role: role.clone(),
                    tool: call.name.clone(),
                    arguments: call.arguments.clone(),
                });
            }

            if let Some(path) = &task.output_file {
                if let Err(e) = write_output(path, &response.content) {
                    warn!("Failed to write {}: {}", path.display(), e);
                    self.transition(PipelineState::Failed);
                    return Err(e);
                }
                output_file = Some(path.clone());
            }

            events.push(PipelineEvent::TaskCompleted {
                task_id: task.id.clone(),
                agent_role: role.clone(),
            });
            self.report(&format!(
                "{} completed task '{}' in {} iteration(s)",
                role, task.id, response.iterations
            ));

            outputs.push(TaskOutput {
                task_id: task.id.clone(),
                agent: task.agent.clone(),
                description,
                raw: response.content,
            });
        }

        self.transition(PipelineState::Complete);

        let content = outputs
            .last()
            .map(|o| o.raw.clone())
            .unwrap_or_default();

        Ok(PipelineResult {
            content,
            task_outputs: outputs,
            events,
            output_file,
            completed_at: Utc::now(),
        })
    }

    fn agent(&self, id: &AgentId) -> Result<Arc<dyn AgentCapability>> {
        self.agents
            .iter()
            .find(|a| &a.descriptor().id == id)
            .cloned()
            .ok_or_else(|| TubeblogError::Config(format!("Unknown agent '{}'", id)))
    }

    fn task_prompt(&self, description: &str, expected_output: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("description".to_string(), description.to_string());
        vars.insert("expected_output".to_string(), expected_output.to_string());
        Prompts::render(&self.task_template, &vars)
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("Pipeline state: {:?} -> {:?}", self.state, next);
        self.state = next.clone();
        self.history.push(next);
    }

    fn report(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }
}

/// Write task output, creating parent directories as needed.
fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
