//! The research → writing blog pipeline.
//!
//! Turns one validated request into a two-agent, two-task orchestrator and
//! runs it. Everything here is built fresh per request.

use crate::agent::{Agent, AgentCapability, AgentDescriptor, AgentId, ToolContext};
use crate::config::{Prompts, Settings};
use crate::error::{Result, TubeblogError};
use crate::llm::{ChatModel, Credential, ModelChoice, OpenAiChatModel};
use crate::orchestrator::{Orchestrator, PipelineResult, Process, Verbosity};
use crate::search::{ChannelHandle, ContentSearch, SearchConfig, YoutubeChannelSearch};
use crate::task::TaskDescriptor;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

pub const RESEARCHER_ID: &str = "researcher";
pub const WRITER_ID: &str = "writer";

/// Raw inputs of one generate action.
#[derive(Debug, Clone, Default)]
pub struct BlogRequest {
    pub credential: Credential,
    pub channel_handle: String,
    pub topic: String,
    pub model: String,
    pub verbosity: u8,
}

/// A request whose required fields are present and well-formed.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub credential: Credential,
    pub channel: ChannelHandle,
    pub topic: String,
    pub model: ModelChoice,
    pub verbosity: Verbosity,
}

impl BlogRequest {
    /// Check required fields before any external call is made.
    pub fn validate(&self) -> Result<ValidatedRequest> {
        if self.credential.is_empty() {
            return Err(TubeblogError::MissingInput(
                "Please enter your API key!".to_string(),
            ));
        }
        if self.topic.trim().is_empty() || self.channel_handle.trim().is_empty() {
            return Err(TubeblogError::MissingInput(
                "Please fill in both topic and channel handle!".to_string(),
            ));
        }

        let model = if self.model.trim().is_empty() {
            ModelChoice::default()
        } else {
            self.model.parse()?
        };

        Ok(ValidatedRequest {
            credential: self.credential.clone(),
            channel: ChannelHandle::parse(&self.channel_handle)?,
            topic: self.topic.trim().to_string(),
            model,
            verbosity: Verbosity::from_level(self.verbosity)?,
        })
    }
}

/// Builds the external collaborators for a request.
pub trait Collaborators: Send + Sync {
    fn model(&self, credential: &Credential, model: ModelChoice) -> Result<Arc<dyn ChatModel>>;

    fn search(&self, channel: &ChannelHandle) -> Result<Arc<dyn ContentSearch>>;
}

/// Hosted model API plus yt-dlp channel search, configured from settings.
pub struct LiveCollaborators {
    settings: Settings,
}

impl LiveCollaborators {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl Collaborators for LiveCollaborators {
    fn model(&self, credential: &Credential, model: ModelChoice) -> Result<Arc<dyn ChatModel>> {
        Ok(Arc::new(OpenAiChatModel::new(credential, model, &self.settings.llm)?))
    }

    fn search(&self, channel: &ChannelHandle) -> Result<Arc<dyn ContentSearch>> {
        let search = &self.settings.search;
        let config = SearchConfig::new(search.max_results, search.transcription_depth)?;
        Ok(Arc::new(
            YoutubeChannelSearch::new(channel.clone(), config)
                .with_caption_language(&search.caption_language)
                .with_max_transcript_chars(search.max_transcript_chars),
        ))
    }
}

/// Something that can turn a validated request into a blog post.
#[async_trait]
pub trait BlogGenerator: Send + Sync {
    async fn generate(&self, request: &ValidatedRequest) -> Result<PipelineResult>;
}

/// The researcher/writer pipeline.
pub struct BlogPipeline {
    settings: Settings,
    prompts: Prompts,
    collaborators: Arc<dyn Collaborators>,
}

impl BlogPipeline {
    /// Create a pipeline using live collaborators.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let collaborators = Arc::new(LiveCollaborators::new(settings.clone()));
        Ok(Self::with_collaborators(settings, prompts, collaborators))
    }

    /// Create a pipeline with custom collaborators.
    pub fn with_collaborators(
        settings: Settings,
        prompts: Prompts,
        collaborators: Arc<dyn Collaborators>,
    ) -> Self {
        Self {
            settings,
            prompts,
            collaborators,
        }
    }

    /// Declare the researcher and writer agents for a channel.
    pub fn agent_descriptors(&self, channel: &ChannelHandle) -> [AgentDescriptor; 2] {
        let agents = &self.prompts.agents;
        let mut vars = HashMap::new();
        vars.insert("channel".to_string(), channel.to_string());
        let render = |template: &str| self.prompts.render_with_custom(template, &vars);

        [
            AgentDescriptor {
                id: AgentId::new(RESEARCHER_ID),
                role: render(&agents.researcher_role),
                goal: render(&agents.researcher_goal),
                backstory: render(&agents.researcher_backstory),
                allow_delegation: false,
                verbose: true,
            },
            AgentDescriptor {
                id: AgentId::new(WRITER_ID),
                role: render(&agents.writer_role),
                goal: render(&agents.writer_goal),
                backstory: render(&agents.writer_backstory),
                allow_delegation: true,
                verbose: true,
            },
        ]
    }

    /// Declare the research and writing tasks. `{{topic}}` is left for kickoff.
    pub fn task_descriptors(&self, channel: &ChannelHandle) -> [TaskDescriptor; 2] {
        let tasks = &self.prompts.tasks;
        let mut vars = HashMap::new();
        vars.insert("channel".to_string(), channel.to_string());

        [
            TaskDescriptor::new(
                "research",
                Prompts::render(&tasks.research_description, &vars),
                tasks.research_expected_output.clone(),
                AgentId::new(RESEARCHER_ID),
            ),
            TaskDescriptor::new(
                "writing",
                Prompts::render(&tasks.writing_description, &vars),
                tasks.writing_expected_output.clone(),
                AgentId::new(WRITER_ID),
            )
            .with_output_file(self.settings.output_file()),
        ]
    }

    /// Build the orchestrator for one request.
    pub fn build(&self, request: &ValidatedRequest) -> Result<Orchestrator> {
        let search = self.collaborators.search(&request.channel)?;
        let model = self.collaborators.model(&request.credential, request.model)?;
        let tools = ToolContext::new(search);

        let agents: Vec<Arc<dyn AgentCapability>> = self
            .agent_descriptors(&request.channel)
            .into_iter()
            .map(|descriptor| {
                Arc::new(
                    Agent::new(descriptor, model.clone(), tools.clone(), &self.prompts.agents.system)
                        .with_max_iterations(self.settings.pipeline.max_iterations),
                ) as Arc<dyn AgentCapability>
            })
            .collect();

        let tasks = self.task_descriptors(&request.channel).to_vec();

        Ok(Orchestrator::new(agents, tasks, Process::Sequential)?
            .with_verbosity(request.verbosity)
            .with_task_template(&self.prompts.tasks.task_template))
    }
}

#[async_trait]
impl BlogGenerator for BlogPipeline {
    #[instrument(skip_all, fields(channel = %request.channel, topic = %request.topic, model = %request.model))]
    async fn generate(&self, request: &ValidatedRequest) -> Result<PipelineResult> {
        let mut orchestrator = self.build(request)?;

        let mut inputs = HashMap::new();
        inputs.insert("topic".to_string(), request.topic.clone());

        let result = orchestrator.kickoff(&inputs).await?;
        info!("Blog generated ({} chars)", result.content.len());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::SEARCH_TOOL_NAME;
    use crate::llm::{ChatMessage, ModelReply, ToolInvocation, ToolSpec};
    use crate::search::ContentItem;
    use std::sync::Mutex;

    /// Answers as researcher or writer depending on the system prompt.
    struct RoleModel {
        conversations: Mutex<Vec<Vec<ChatMessage>>>,
        fail_with_auth: bool,
    }

    #[async_trait]
    impl ChatModel for RoleModel {
        fn model_name(&self) -> &str {
            "role-model"
        }

        async fn complete(&self, messages: &[ChatMessage], _tools: &[ToolSpec]) -> Result<ModelReply> {
            self.conversations.lock().unwrap().push(messages.to_vec());
            if self.fail_with_auth {
                return Err(TubeblogError::Authentication("Invalid API Key".to_string()));
            }
            match &messages[0] {
                ChatMessage::System(system) if system.contains("Researcher") => {
                    Ok(ModelReply::text("Rust has ownership; Go has a GC."))
                }
                _ => Ok(ModelReply::text("# Rust vs Go\n\nOwnership beats GC.")),
            }
        }
    }

    struct NoSearch {
        channel: ChannelHandle,
        config: SearchConfig,
    }

    #[async_trait]
    impl ContentSearch for NoSearch {
        fn channel(&self) -> &ChannelHandle {
            &self.channel
        }

        fn config(&self) -> &SearchConfig {
            &self.config
        }

        async fn search(&self, _query: &str) -> Result<Vec<ContentItem>> {
            Ok(Vec::new())
        }
    }

    struct StubCollaborators {
        model: Arc<RoleModel>,
        chosen: Mutex<Option<ModelChoice>>,
    }

    impl Collaborators for StubCollaborators {
        fn model(&self, _credential: &Credential, model: ModelChoice) -> Result<Arc<dyn ChatModel>> {
            *self.chosen.lock().unwrap() = Some(model);
            Ok(self.model.clone())
        }

        fn search(&self, channel: &ChannelHandle) -> Result<Arc<dyn ContentSearch>> {
            Ok(Arc::new(NoSearch {
                channel: channel.clone(),
                config: SearchConfig::default(),
            }))
        }
    }

    /// Searches the channel once, then answers regardless of the result.
    struct SearchingModel;

    #[async_trait]
    impl ChatModel for SearchingModel {
        fn model_name(&self) -> &str {
            "searching-model"
        }

        async fn complete(&self, messages: &[ChatMessage], _tools: &[ToolSpec]) -> Result<ModelReply> {
            if messages.iter().any(|m| matches!(m, ChatMessage::Tool { .. })) {
                return Ok(ModelReply::text("# Invented blog"));
            }
            Ok(ModelReply {
                content: None,
                tool_calls: vec![ToolInvocation {
                    id: "call_1".to_string(),
                    name: SEARCH_TOOL_NAME.to_string(),
                    arguments: r#"{"query": "Rust vs Go"}"#.to_string(),
                }],
            })
        }
    }

    struct MissingChannelSearch {
        channel: ChannelHandle,
        config: SearchConfig,
    }

    #[async_trait]
    impl ContentSearch for MissingChannelSearch {
        fn channel(&self) -> &ChannelHandle {
            &self.channel
        }

        fn config(&self) -> &SearchConfig {
            &self.config
        }

        async fn search(&self, _query: &str) -> Result<Vec<ContentItem>> {
            Err(TubeblogError::ChannelNotFound(self.channel.to_string()))
        }
    }

    struct MissingChannelCollaborators;

    impl Collaborators for MissingChannelCollaborators {
        fn model(&self, _credential: &Credential, _model: ModelChoice) -> Result<Arc<dyn ChatModel>> {
            Ok(Arc::new(SearchingModel))
        }

        fn search(&self, channel: &ChannelHandle) -> Result<Arc<dyn ContentSearch>> {
            Ok(Arc::new(MissingChannelSearch {
                channel: channel.clone(),
                config: SearchConfig::default(),
            }))
        }
    }

    fn request() -> BlogRequest {
        BlogRequest {
            credential: Credential::new("gsk_test"),
            channel_handle: "@rustlang".to_string(),
            topic: "Rust vs Go".to_string(),
            model: "mixtral-8x7b-32768".to_string(),
            verbosity: 1,
        }
    }

    fn pipeline(
        dir: &tempfile::TempDir,
        fail_with_auth: bool,
    ) -> (BlogPipeline, Arc<StubCollaborators>) {
        let mut settings = Settings::default();
        settings.pipeline.output_file = dir
            .path()
            .join("generated_blog.md")
            .to_string_lossy()
            .to_string();

        let collaborators = Arc::new(StubCollaborators {
            model: Arc::new(RoleModel {
                conversations: Mutex::new(Vec::new()),
                fail_with_auth,
            }),
            chosen: Mutex::new(None),
        });
        let pipeline =
            BlogPipeline::with_collaborators(settings, Prompts::default(), collaborators.clone());
        (pipeline, collaborators)
    }

    #[test]
    fn test_validate_missing_fields() {
        let cases = [
            ("", "@rustlang", "Rust"),
            ("key", "", "Rust"),
            ("key", "@rustlang", ""),
            ("", "", "Rust"),
            ("", "@rustlang", ""),
            ("key", "", ""),
            ("", "", ""),
            ("key", "   ", "Rust"),
        ];

        for (key, channel, topic) in cases {
            let request = BlogRequest {
                credential: Credential::new(key),
                channel_handle: channel.to_string(),
                topic: topic.to_string(),
                ..BlogRequest::default()
            };
            assert!(
                matches!(request.validate(), Err(TubeblogError::MissingInput(_))),
                "expected missing input for {:?}",
                (key, channel, topic)
            );
        }
    }

    #[test]
    fn test_validate_missing_key_takes_precedence() {
        let err = BlogRequest::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "Please enter your API key!");
    }

    #[test]
    fn test_validate_normalizes() {
        let mut raw = request();
        raw.channel_handle = " rustlang ".to_string();
        raw.model = String::new();

        let validated = raw.validate().unwrap();
        assert_eq!(validated.channel.as_str(), "@rustlang");
        assert_eq!(validated.model, ModelChoice::Llama3_70b);
        assert_eq!(validated.verbosity, Verbosity::Normal);
    }

    #[test]
    fn test_validate_rejects_unknown_model_and_verbosity() {
        let mut raw = request();
        raw.model = "gpt-4".to_string();
        assert!(matches!(raw.validate(), Err(TubeblogError::InvalidInput(_))));

        let mut raw = request();
        raw.verbosity = 3;
        assert!(matches!(raw.validate(), Err(TubeblogError::InvalidInput(_))));
    }

    #[test]
    fn test_declarations() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(&dir, false);
        let channel = ChannelHandle::parse("@rustlang").unwrap();

        let [researcher, writer] = pipeline.agent_descriptors(&channel);
        assert_eq!(researcher.role, "Senior Technical Researcher");
        assert_eq!(researcher.goal, "Extract key technical concepts from @rustlang videos");
        assert!(!researcher.allow_delegation);
        assert_eq!(writer.role, "Chief Technical Writer");

        let [research, writing] = pipeline.task_descriptors(&channel);
        assert_eq!(research.description, "Analyze @rustlang videos about {{topic}}");
        assert_eq!(research.agent.as_str(), RESEARCHER_ID);
        assert!(research.output_file.is_none());
        assert_eq!(writing.agent.as_str(), WRITER_ID);
        assert_eq!(
            writing.output_file,
            Some(dir.path().join("generated_blog.md"))
        );
    }

    #[tokio::test]
    async fn test_generate_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, collaborators) = pipeline(&dir, false);
        let validated = request().validate().unwrap();

        let result = pipeline.generate(&validated).await.unwrap();

        assert_eq!(result.content, "# Rust vs Go\n\nOwnership beats GC.");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("generated_blog.md")).unwrap(),
            result.content
        );
        assert_eq!(*collaborators.chosen.lock().unwrap(), Some(ModelChoice::Mixtral8x7b));

        let conversations = collaborators.model.conversations.lock().unwrap();
        assert_eq!(conversations.len(), 2);
        match &conversations[0][1] {
            ChatMessage::User(task) => assert!(task.starts_with("Analyze @rustlang videos about Rust vs Go")),
            other => panic!("Expected user message, got {:?}", other),
        }
        match &conversations[1][1] {
            ChatMessage::User(task) => {
                assert!(task.starts_with("Create blog post using research data"));
                assert!(task.contains("Rust has ownership; Go has a GC."));
            }
            other => panic!("Expected user message, got {:?}", other),
        }
        // The credential never reaches a prompt
        assert!(!conversations
            .iter()
            .flatten()
            .any(|m| format!("{:?}", m).contains("gsk_test")));
    }

    #[tokio::test]
    async fn test_generate_auth_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(&dir, true);
        let validated = request().validate().unwrap();

        let err = pipeline.generate(&validated).await.unwrap_err();

        assert!(matches!(err, TubeblogError::Authentication(_)));
        assert!(!dir.path().join("generated_blog.md").exists());
    }

    #[tokio::test]
    async fn test_channel_not_found_fails_generation() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        let output = dir.path().join("generated_blog.md");
        settings.pipeline.output_file = output.to_string_lossy().to_string();
        let pipeline = BlogPipeline::with_collaborators(
            settings,
            Prompts::default(),
            Arc::new(MissingChannelCollaborators),
        );

        let mut raw = request();
        raw.channel_handle = "@doesnotexist".to_string();
        let err = pipeline.generate(&raw.validate().unwrap()).await.unwrap_err();

        assert!(matches!(err, TubeblogError::ChannelNotFound(ref c) if c == "@doesnotexist"));
        assert!(!output.exists());
    }
}
