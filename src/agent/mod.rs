//! Agent system for task execution with tool calling.
//!
//! An agent is a declarative persona (role, goal, backstory) bound to a chat
//! model and the channel search tool. The orchestrator only sees agents
//! through the [`AgentCapability`] trait.

mod runner;
mod tools;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use tools::{parse_tool_call, ToolCall, ToolContext, SEARCH_TOOL_NAME};

use crate::error::Result;
use crate::llm::ToolSpec;
use async_trait::async_trait;
use serde::Serialize;

/// Stable identifier tasks use to reference their agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declarative description of an agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentDescriptor {
    pub id: AgentId,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Whether the agent may hand work to other agents. Recorded only; no
    /// delegation tool is offered.
    pub allow_delegation: bool,
    pub verbose: bool,
}

/// What the orchestrator can do with an agent.
#[async_trait]
pub trait AgentCapability: Send + Sync {
    fn descriptor(&self) -> &AgentDescriptor;

    /// Tools this agent may call.
    fn list_tools(&self) -> Vec<ToolSpec>;

    /// Run the agent on a prompt, with the output of earlier tasks as context.
    async fn invoke(&self, prompt: &str, context: Option<&str>) -> Result<AgentResponse>;
}
