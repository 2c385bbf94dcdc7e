//! Form handling independent of HTTP.
//!
//! Validates a submission, invokes the generator and turns the result into
//! an [`Outcome`] for the page or the JSON API.

use crate::error::ErrorKind;
use crate::llm::{Credential, ModelChoice};
use crate::pipeline::{BlogGenerator, BlogRequest};
use base64::Engine;
use serde::Deserialize;
use tracing::{info, warn};

/// MIME type of the downloadable export.
pub const MARKDOWN_MIME: &str = "text/markdown";

/// Fields posted by the form or the JSON API.
///
/// No `Debug` implementation: it carries the credential.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GenerateForm {
    pub api_key: String,
    pub channel_handle: String,
    pub topic: String,
    pub model: String,
    pub verbosity: u8,
}

impl Default for GenerateForm {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            channel_handle: String::new(),
            topic: String::new(),
            model: ModelChoice::default().to_string(),
            verbosity: 1,
        }
    }
}

impl GenerateForm {
    /// Convert into a request; the form is consumed so the key is not kept around.
    pub fn into_request(self) -> BlogRequest {
        BlogRequest {
            credential: Credential::new(self.api_key),
            channel_handle: self.channel_handle,
            topic: self.topic,
            model: self.model,
            verbosity: self.verbosity,
        }
    }
}

/// The exported Markdown file.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub content: String,
    pub mime: &'static str,
}

impl DownloadArtifact {
    pub fn new(topic: &str, content: String) -> Self {
        Self {
            file_name: export_file_name(topic),
            content,
            mime: MARKDOWN_MIME,
        }
    }

    /// Data URI carrying the exact content bytes.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};charset=utf-8;base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(self.content.as_bytes())
        )
    }
}

/// What the user sees after pressing generate.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Required input missing or malformed; nothing was called.
    Invalid { message: String },
    /// The pipeline finished.
    Generated {
        markdown: String,
        download: DownloadArtifact,
        /// Process details, already filtered by verbosity.
        events: Vec<String>,
    },
    /// The pipeline failed; no partial content.
    Failed { kind: ErrorKind, message: String },
}

/// Name of the downloadable file for a topic.
pub fn export_file_name(topic: &str) -> String {
    format!("{}_blog.md", topic.replace(' ', "_"))
}

/// Validate, generate and package the result of one submission.
pub async fn handle_submission(request: &BlogRequest, generator: &dyn BlogGenerator) -> Outcome {
    let validated = match request.validate() {
        Ok(v) => v,
        Err(e) => {
            info!("Rejected submission: {}", e);
            return Outcome::Invalid {
                message: e.to_string(),
            };
        }
    };

    match generator.generate(&validated).await {
        Ok(result) => {
            let events = result
                .visible_events(validated.verbosity)
                .into_iter()
                .map(|e| e.to_string())
                .collect();
            Outcome::Generated {
                // Named from the topic as typed, not the trimmed one
                download: DownloadArtifact::new(&request.topic, result.content.clone()),
                markdown: result.content,
                events,
            }
        }
        Err(e) => {
            warn!("Blog generation failed: {}", e);
            Outcome::Failed {
                kind: e.kind(),
                message: format!("Error generating blog: {}", e),
            }
        }
    }
}
