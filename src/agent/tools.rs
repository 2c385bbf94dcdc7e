//! Tool definitions and implementations for the agent system.

use crate::error::{Result, TubeblogError};
use crate::llm::ToolSpec;
use crate::search::{format_results, ContentSearch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the channel search tool as exposed to the model.
pub const SEARCH_TOOL_NAME: &str = "search_channel_videos";

/// Available tools for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Search the bound channel's videos.
    SearchChannelVideos { query: String },
}

/// Tool execution context shared by the agents of one request.
#[derive(Clone)]
pub struct ToolContext {
    search: Arc<dyn ContentSearch>,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(search: Arc<dyn ContentSearch>) -> Self {
        Self { search }
    }

    /// Tool definitions offered to the model.
    pub fn definitions(&self) -> Vec<ToolSpec> {
        vec![ToolSpec {
            name: SEARCH_TOOL_NAME.to_string(),
            description: format!(
                "Search the videos of the YouTube channel {} and return matching titles, \
                descriptions and transcripts. Use this whenever you need facts from the channel.",
                self.search.channel()
            ),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to look for in the channel's videos"
                    }
                },
                "required": ["query"]
            }),
        }]
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::SearchChannelVideos { query } => {
                let items = self.search.search(query).await?;
                Ok(format_results(self.search.channel(), &items))
            }
        }
    }
}

/// Parse a tool call from the model's response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| TubeblogError::Agent(format!("Invalid tool arguments: {}", e)))?;

    match name {
        SEARCH_TOOL_NAME => {
            let query = args["query"]
                .as_str()
                .ok_or_else(|| TubeblogError::Agent("Missing 'query' argument".to_string()))?
                .to_string();
            Ok(ToolCall::SearchChannelVideos { query })
        }
        _ => Err(TubeblogError::Agent(format!("Unknown tool: {}", name))),
    }
}
