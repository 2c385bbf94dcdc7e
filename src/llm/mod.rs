//! Chat model abstraction for the hosted completion API.
//!
//! Agents talk to the model through the [`ChatModel`] trait so the pipeline
//! can run against the real API or a test double.

mod openai;

pub use openai::{create_client, OpenAiChatModel, SAMPLING_TEMPERATURE};

use crate::error::{Result, TubeblogError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Secret used to authorize calls to the model API.
///
/// Never logged, serialized or written to disk, so there is no `Display`
/// or `Serialize` implementation.
#[derive(Clone, Default)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Access the raw secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Supported model identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ModelChoice {
    #[default]
    #[serde(rename = "llama3-70b-8192")]
    Llama3_70b,
    #[serde(rename = "mixtral-8x7b-32768")]
    Mixtral8x7b,
    #[serde(rename = "gemma-7b-it")]
    Gemma7b,
}

impl ModelChoice {
    /// All selectable models, default first.
    pub const ALL: [ModelChoice; 3] = [
        ModelChoice::Llama3_70b,
        ModelChoice::Mixtral8x7b,
        ModelChoice::Gemma7b,
    ];

    /// Model name as sent to the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelChoice::Llama3_70b => "llama3-70b-8192",
            ModelChoice::Mixtral8x7b => "mixtral-8x7b-32768",
            ModelChoice::Gemma7b => "gemma-7b-it",
        }
    }
}

impl std::str::FromStr for ModelChoice {
    type Err = TubeblogError;

    fn from_str(s: &str) -> Result<Self> {
        ModelChoice::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| TubeblogError::InvalidInput(format!("Unknown model: {}", s)))
    }
}

impl std::fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a chat conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolInvocation>,
    },
    Tool {
        call_id: String,
        content: String,
    },
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments.
    pub arguments: String,
}

/// Description of a tool offered to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: serde_json::Value,
}

/// One reply from the model: final text, tool calls, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
}

impl ModelReply {
    /// A plain text reply with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }
}

/// Trait for chat completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Name of the bound model.
    fn model_name(&self) -> &str;

    /// Send the conversation and return the model's next reply.
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ModelReply>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("gsk_secret");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
        assert_eq!(credential.expose(), "gsk_secret");
    }

    #[test]
    fn test_blank_credential_is_empty() {
        assert!(Credential::new("   ").is_empty());
        assert!(!Credential::new("key").is_empty());
    }

    #[test]
    fn test_model_choice_parse() {
        assert_eq!(
            "mixtral-8x7b-32768".parse::<ModelChoice>().unwrap(),
            ModelChoice::Mixtral8x7b
        );
        assert!("gpt-4".parse::<ModelChoice>().is_err());
        assert_eq!(ModelChoice::default().as_str(), "llama3-70b-8192");
    }

    #[test]
    fn test_model_choice_serde_matches_api_name() {
        let json = serde_json::to_string(&ModelChoice::Gemma7b).unwrap();
        assert_eq!(json, "\"gemma-7b-it\"");
    }
}
