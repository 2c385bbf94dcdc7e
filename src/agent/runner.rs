//! Agent runner with tool calling loop.

use super::tools::{parse_tool_call, ToolContext};
use super::{AgentCapability, AgentDescriptor};
use crate::config::Prompts;
use crate::error::{Result, TubeblogError};
use crate::llm::{ChatMessage, ChatModel, ToolInvocation, ToolSpec};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Default cap on model calls per invocation.
const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Agent that answers a task by calling the model and its tools.
pub struct Agent {
    descriptor: AgentDescriptor,
    model: Arc<dyn ChatModel>,
    tools: ToolContext,
    max_iterations: usize,
    system_prompt: String,
}

impl Agent {
    /// Create a new agent; the system prompt is rendered from `system_template`.
    pub fn new(
        descriptor: AgentDescriptor,
        model: Arc<dyn ChatModel>,
        tools: ToolContext,
        system_template: &str,
    ) -> Self {
        let mut vars = HashMap::new();
        vars.insert("role".to_string(), descriptor.role.clone());
        vars.insert("goal".to_string(), descriptor.goal.clone());
        vars.insert("backstory".to_string(), descriptor.backstory.clone());
        let system_prompt = Prompts::render(system_template, &vars);

        Self {
            descriptor,
            model,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_prompt,
        }
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// The rendered system prompt.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Run the agent on a task prompt.
    pub async fn run(&self, task: &str, context: Option<&str>) -> Result<AgentResponse> {
        let user_message = match context {
            Some(ctx) => format!(
                "{}\n\nThis is the context you're working with:\n{}",
                task, ctx
            ),
            None => task.to_string(),
        };

        let mut messages = vec![
            ChatMessage::System(self.system_prompt.clone()),
            ChatMessage::User(user_message),
        ];
        let tool_specs = self.tools.definitions();

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(TubeblogError::ContractUnmet(format!(
                    "{} gave no final answer within {} iterations",
                    self.descriptor.role, self.max_iterations
                )));
            }

            debug!("{} iteration {}", self.descriptor.role, iterations);

            let reply = self.model.complete(&messages, &tool_specs).await?;

            if reply.tool_calls.is_empty() {
                return build_response(&self.descriptor, reply.content, tool_calls_made, iterations);
            }

            messages.push(ChatMessage::Assistant {
                content: reply.content.clone(),
                tool_calls: reply.tool_calls.clone(),
            });

            for tool_call in &reply.tool_calls {
                let record = self.execute_tool_call(tool_call).await?;

                messages.push(ChatMessage::Tool {
                    call_id: tool_call.id.clone(),
                    content: record.result.clone(),
                });

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    ///
    /// Malformed calls become the tool result so the model can correct them.
    /// Search failures end the run.
    async fn execute_tool_call(&self, tool_call: &ToolInvocation) -> Result<ToolCallRecord> {
        let name = &tool_call.name;
        let arguments = &tool_call.arguments;

        info!("{} calling tool: {} with args: {}", self.descriptor.role, name, arguments);

        let result = match parse_tool_call(name, arguments) {
            Ok(tool) => self.tools.execute(&tool).await?,
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        Ok(ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        })
    }
}

#[async_trait]
impl AgentCapability for Agent {
    fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    fn list_tools(&self) -> Vec<ToolSpec> {
        self.tools.definitions()
    }

    async fn invoke(&self, prompt: &str, context: Option<&str>) -> Result<AgentResponse> {
        self.run(prompt, context).await
    }
}

/// Build the final agent response; an empty answer does not satisfy any task.
fn build_response(
    descriptor: &AgentDescriptor,
    content: Option<String>,
    tool_calls: Vec<ToolCallRecord>,
    iterations: usize,
) -> Result<AgentResponse> {
    let content = content.unwrap_or_default();
    if content.trim().is_empty() {
        return Err(TubeblogError::ContractUnmet(format!(
            "{} returned an empty answer",
            descriptor.role
        )));
    }

    Ok(AgentResponse {
        content,
        tool_calls,
        iterations,
    })
}

/// Response from an agent run.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
