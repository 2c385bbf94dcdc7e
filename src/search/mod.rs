//! Channel content search for the agents.
//!
//! Provides a trait-based interface over a video index so agents can look up
//! what a channel has published about a topic.

mod captions;
mod youtube;

pub use captions::{truncate_chars, vtt_to_text};
pub use youtube::{SystemYtDlp, YoutubeChannelSearch, YtDlpOutput, YtDlpRunner};

use crate::error::{Result, TubeblogError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A YouTube channel handle such as `@rustlang`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelHandle(String);

impl ChannelHandle {
    /// Parse user input into a handle, adding the leading `@` if it is missing.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let name = trimmed.strip_prefix('@').unwrap_or(trimmed);

        if name.is_empty() {
            return Err(TubeblogError::InvalidInput(
                "Channel handle cannot be empty".to_string(),
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(TubeblogError::InvalidInput(format!(
                "Invalid channel handle: {}",
                trimmed
            )));
        }

        Ok(Self(format!("@{}", name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How much of each matching video is retrieved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionDepth {
    /// Title and description only.
    Partial,
    /// Title, description and the caption transcript.
    #[default]
    Full,
}

impl std::str::FromStr for TranscriptionDepth {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "partial" => Ok(TranscriptionDepth::Partial),
            "full" => Ok(TranscriptionDepth::Full),
            _ => Err(format!("Unknown transcription depth: {}", s)),
        }
    }
}

impl std::fmt::Display for TranscriptionDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptionDepth::Partial => write!(f, "partial"),
            TranscriptionDepth::Full => write!(f, "full"),
        }
    }
}

/// Search parameters shared by every query against one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    max_results: u32,
    depth: TranscriptionDepth,
}

impl SearchConfig {
    /// `max_results` must be at least 1.
    pub fn new(max_results: u32, depth: TranscriptionDepth) -> Result<Self> {
        if max_results == 0 {
            return Err(TubeblogError::InvalidInput(
                "max_results must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_results, depth })
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    pub fn depth(&self) -> TranscriptionDepth {
        self.depth
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            depth: TranscriptionDepth::Full,
        }
    }
}

/// A video returned by a channel search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    /// Caption text, present only for full-depth searches with captions available.
    pub transcript: Option<String>,
}

/// Trait for channel content search providers.
#[async_trait]
pub trait ContentSearch: Send + Sync {
    /// The channel being searched.
    fn channel(&self) -> &ChannelHandle;

    /// Search parameters in effect.
    fn config(&self) -> &SearchConfig;

    /// Find videos on the channel relevant to `query`.
    ///
    /// An empty result is not an error.
    async fn search(&self, query: &str) -> Result<Vec<ContentItem>>;
}

/// Format search hits as tool output for an agent.
pub fn format_results(channel: &ChannelHandle, items: &[ContentItem]) -> String {
    if items.is_empty() {
        return format!("No videos found on {} for this query.", channel);
    }

    let formatted = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut entry = format!("{}. {} ({})", i + 1, item.title, item.url);
            if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
                entry.push_str(&format!("\n   Description: {}", description));
            }
            if let Some(transcript) = &item.transcript {
                entry.push_str(&format!("\n   Transcript:\n{}", transcript));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Found {} video(s) on {}:\n\n{}",
        items.len(),
        channel,
        formatted
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_handle_parse() {
        assert_eq!(ChannelHandle::parse("@rustlang").unwrap().as_str(), "@rustlang");
        assert_eq!(ChannelHandle::parse("  rustlang ").unwrap().as_str(), "@rustlang");
        assert!(ChannelHandle::parse("").is_err());
        assert!(ChannelHandle::parse("@").is_err());
        assert!(ChannelHandle::parse("rust lang").is_err());
        assert!(ChannelHandle::parse("youtube.com/@rustlang").is_err());
    }

    #[test]
    fn test_channel_handle_charset() {
        assert_eq!(
            ChannelHandle::parse("@Rust_Lang-2.0").unwrap().as_str(),
            "@Rust_Lang-2.0"
        );
        for input in ["@a?b", "@a#b", "@{{topic}}", "@a&b=c", "@a@b", "@ä"] {
            assert!(
                matches!(ChannelHandle::parse(input), Err(TubeblogError::InvalidInput(_))),
                "expected {} to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_search_config_requires_positive_count() {
        assert!(SearchConfig::new(0, TranscriptionDepth::Full).is_err());
        let config = SearchConfig::new(5, TranscriptionDepth::Partial).unwrap();
        assert_eq!(config.max_results(), 5);
        assert_eq!(config.depth(), TranscriptionDepth::Partial);
    }

    #[test]
    fn test_depth_from_str() {
        assert_eq!("FULL".parse::<TranscriptionDepth>(), Ok(TranscriptionDepth::Full));
        assert!("deep".parse::<TranscriptionDepth>().is_err());
    }

    #[test]
    fn test_format_empty_results() {
        let channel = ChannelHandle::parse("@rustlang").unwrap();
        assert_eq!(
            format_results(&channel, &[]),
            "No videos found on @rustlang for this query."
        );
    }

    #[test]
    fn test_format_results_includes_transcript() {
        let channel = ChannelHandle::parse("@rustlang").unwrap();
        let items = vec![ContentItem {
            video_id: "abc123def45".to_string(),
            title: "Async in depth".to_string(),
            url: "https://www.youtube.com/watch?v=abc123def45".to_string(),
            description: Some("Futures and executors".to_string()),
            transcript: Some("today we look at pinning".to_string()),
        }];

        let output = format_results(&channel, &items);
        assert!(output.starts_with("Found 1 video(s) on @rustlang"));
        assert!(output.contains("Description: Futures and executors"));
        assert!(output.contains("today we look at pinning"));
    }
}
