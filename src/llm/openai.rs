//! OpenAI-compatible chat client (Groq by default).

use super::{ChatMessage, ChatModel, Credential, ModelChoice, ModelReply, ToolInvocation, ToolSpec};
use crate::config::LlmSettings;
use crate::error::{Result, TubeblogError};
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
    FunctionObject,
};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Sampling temperature for every request.
pub const SAMPLING_TEMPERATURE: f32 = 0.3;

/// Create an API client bound to the given credential.
///
/// The credential is not checked here; an invalid key only fails on first use.
pub fn create_client(credential: &Credential, settings: &LlmSettings) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?;

    let config = OpenAIConfig::new()
        .with_api_base(&settings.api_base)
        .with_api_key(credential.expose());

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Chat model backed by an OpenAI-compatible completions endpoint.
pub struct OpenAiChatModel {
    client: Client<OpenAIConfig>,
    model: ModelChoice,
    temperature: f32,
}

impl OpenAiChatModel {
    /// Build a client for the selected model.
    pub fn new(credential: &Credential, model: ModelChoice, settings: &LlmSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(credential, settings)?,
            model,
            temperature: SAMPLING_TEMPERATURE,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    fn model_name(&self) -> &str {
        self.model.as_str()
    }

    #[instrument(skip_all, fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ModelReply> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(self.model.as_str())
            .messages(request_messages)
            .temperature(self.temperature);

        // Some providers reject an empty tools array
        if !tools.is_empty() {
            builder.tools(tools.iter().map(to_tool).collect::<Vec<_>>());
        }

        let request = builder
            .build()
            .map_err(|e| TubeblogError::Model(format!("Failed to build request: {}", e)))?;

        let response = self.client.chat().create(request).await.map_err(classify_error)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TubeblogError::Model("No response from model".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolInvocation {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect::<Vec<_>>();

        debug!("Model replied with {} tool call(s)", tool_calls.len());

        Ok(ModelReply {
            content: choice.message.content,
            tool_calls,
        })
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message {
        ChatMessage::System(content) => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(build_error)?
            .into(),
        ChatMessage::User(content) => ChatCompletionRequestUserMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(build_error)?
            .into(),
        ChatMessage::Assistant { content, tool_calls } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(content) = content {
                args.content(content.clone());
            }
            if !tool_calls.is_empty() {
                args.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            args.build().map_err(build_error)?.into()
        }
        ChatMessage::Tool { call_id, content } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call_id.clone())
            .content(content.clone())
            .build()
            .map_err(build_error)?
            .into(),
    };
    Ok(built)
}

fn to_tool(spec: &ToolSpec) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: spec.name.clone(),
            description: Some(spec.description.clone()),
            parameters: Some(spec.parameters.clone()),
            strict: None,
        },
    }
}

fn build_error(e: OpenAIError) -> TubeblogError {
    TubeblogError::Model(format!("Failed to build message: {}", e))
}

/// Map a client error onto the crate's error taxonomy.
fn classify_error(err: OpenAIError) -> TubeblogError {
    match err {
        OpenAIError::Reqwest(e) => TubeblogError::Network(e.to_string()),
        OpenAIError::ApiError(api) => {
            let detail = format!("{} {:?} {:?}", api.message, api.r#type, api.code);
            classify_api_failure(&detail, api.message)
        }
        other => TubeblogError::Model(other.to_string()),
    }
}

/// Classify an API error body by its type/code markers.
fn classify_api_failure(detail: &str, message: String) -> TubeblogError {
    let detail = detail.to_lowercase();
    if detail.contains("invalid_api_key")
        || detail.contains("invalid api key")
        || detail.contains("authentication")
        || detail.contains("unauthorized")
    {
        TubeblogError::Authentication(message)
    } else if detail.contains("rate_limit") || detail.contains("rate limit") {
        TubeblogError::RateLimited(message)
    } else {
        TubeblogError::Model(message)
    }
}
