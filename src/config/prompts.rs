//! Prompt templates for Tubeblog.
//!
//! Agent personas and task descriptions can be customized by placing
//! `agents.toml` and `tasks.toml` in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agents: AgentPrompts,
    pub tasks: TaskPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Personas for the researcher and writer agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    /// System prompt wrapping every agent persona.
    pub system: String,
    pub researcher_role: String,
    pub researcher_goal: String,
    pub researcher_backstory: String,
    pub writer_role: String,
    pub writer_goal: String,
    pub writer_backstory: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are {{role}}. {{backstory}}
Your personal goal is: {{goal}}

You have a tool to search the videos of a YouTube channel. Use it whenever you
need facts from the channel's content, and never invent content that the
videos do not contain.

When you have gathered enough information, reply with your final answer only."#
                .to_string(),
            researcher_role: "Senior Technical Researcher".to_string(),
            researcher_goal: "Extract key technical concepts from {{channel}} videos".to_string(),
            researcher_backstory: "Expert in technical content analysis and research.".to_string(),
            writer_role: "Chief Technical Writer".to_string(),
            writer_goal: "Craft engaging technical blog content".to_string(),
            writer_backstory: "Technical writer specializing in clear documentation.".to_string(),
        }
    }
}

/// Descriptions and expected outputs of the pipeline tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPrompts {
    pub research_description: String,
    pub research_expected_output: String,
    pub writing_description: String,
    pub writing_expected_output: String,
    /// Wraps a task description for the assigned agent.
    pub task_template: String,
}

impl Default for TaskPrompts {
    fn default() -> Self {
        Self {
            research_description: "Analyze {{channel}} videos about {{topic}}".to_string(),
            research_expected_output: "Technical report with key concepts and comparisons"
                .to_string(),
            writing_description: "Create blog post using research data".to_string(),
            writing_expected_output: "Well-structured technical blog in Markdown".to_string(),
            task_template: r#"{{description}}

This is the expected criteria for your final answer: {{expected_output}}
You MUST return the actual complete content as the final answer, not a summary."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agents_path = custom_path.join("agents.toml");
            if agents_path.exists() {
                let content = std::fs::read_to_string(&agents_path)?;
                prompts.agents = toml::from_str(&content)?;
            }

            let tasks_path = custom_path.join("tasks.toml");
            if tasks_path.exists() {
                let content = std::fs::read_to_string(&tasks_path)?;
                prompts.tasks = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders without a matching variable are left untouched.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
