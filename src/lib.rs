//! Tubeblog - YouTube to Blog Converter
//!
//! Researches what a YouTube channel says about a topic and turns it into a
//! technical blog post in Markdown.
//!
//! # Overview
//!
//! A request carries an API credential, a channel handle, a topic, a model
//! choice and a verbosity level. Two agents run in sequence:
//!
//! - a researcher that searches the channel's videos and writes a report
//! - a writer that turns the report into a blog post
//!
//! The writer's output is shown on the page, offered as a download and
//! written to the configured output file.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `llm` - Chat model abstraction and the OpenAI-compatible client
//! - `search` - YouTube channel search backed by yt-dlp
//! - `agent` - Agents and their tool loop
//! - `task` - Task descriptors and outputs
//! - `orchestrator` - Sequential task execution
//! - `pipeline` - The researcher/writer pipeline for one request
//! - `web` - The converter page and JSON endpoint
//! - `cli` - Command line entry and server start-up
//!
//! # Example
//!
//! ```rust,no_run
//! use tubeblog::config::Settings;
//! use tubeblog::llm::Credential;
//! use tubeblog::pipeline::{BlogGenerator, BlogPipeline, BlogRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = BlogPipeline::new(Settings::load()?)?;
//!     let request = BlogRequest {
//!         credential: Credential::new("gsk_..."),
//!         channel_handle: "@rustlang".to_string(),
//!         topic: "async Rust".to_string(),
//!         model: "llama3-70b-8192".to_string(),
//!         verbosity: 1,
//!     };
//!
//!     let result = pipeline.generate(&request.validate()?).await?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod pipeline;
pub mod search;
pub mod task;
pub mod web;

pub use error::{Result, TubeblogError};
