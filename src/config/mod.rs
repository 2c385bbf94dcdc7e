//! Configuration module for Tubeblog.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, Prompts, TaskPrompts};
pub use settings::{
    GeneralSettings, LlmSettings, PipelineSettings, PromptSettings, SearchSettings,
    ServerSettings, Settings,
};
