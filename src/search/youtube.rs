//! YouTube channel search backed by yt-dlp.

use super::{truncate_chars, vtt_to_text, ChannelHandle, ContentItem, ContentSearch, SearchConfig, TranscriptionDepth};
use crate::error::{Result, TubeblogError};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Captured result of one yt-dlp invocation.
#[derive(Debug, Clone, Default)]
pub struct YtDlpOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs yt-dlp with a list of arguments.
#[async_trait]
pub trait YtDlpRunner: Send + Sync {
    async fn run(&self, args: &[&str]) -> Result<YtDlpOutput>;
}

/// Runs the yt-dlp binary found on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemYtDlp {
    program: String,
}

impl Default for SystemYtDlp {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
        }
    }
}

impl SystemYtDlp {
    /// Use a different executable name or path.
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

#[async_trait]
impl YtDlpRunner for SystemYtDlp {
    async fn run(&self, args: &[&str]) -> Result<YtDlpOutput> {
        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TubeblogError::ToolNotFound(self.program.clone())
                } else {
                    TubeblogError::Search(format!("Failed to run {}: {}", self.program, e))
                }
            })?;

        Ok(YtDlpOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Searches one channel's videos and optionally pulls their captions.
pub struct YoutubeChannelSearch {
    channel: ChannelHandle,
    config: SearchConfig,
    caption_language: String,
    max_transcript_chars: usize,
    video_id_regex: Regex,
    runner: Arc<dyn YtDlpRunner>,
}

impl YoutubeChannelSearch {
    pub fn new(channel: ChannelHandle, config: SearchConfig) -> Self {
        let video_id_regex = Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("Invalid regex");

        Self {
            channel,
            config,
            caption_language: "en".to_string(),
            max_transcript_chars: 12_000,
            video_id_regex,
            runner: Arc::new(SystemYtDlp::default()),
        }
    }

    /// Replace the yt-dlp runner.
    pub fn with_runner(mut self, runner: Arc<dyn YtDlpRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Set the preferred caption language.
    pub fn with_caption_language(mut self, language: &str) -> Self {
        self.caption_language = language.to_string();
        self
    }

    /// Set the transcript length limit.
    pub fn with_max_transcript_chars(mut self, max: usize) -> Self {
        self.max_transcript_chars = max;
        self
    }

    /// Build the channel search URL for a query.
    fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("https://www.youtube.com/{}/search", self.channel))
            .map_err(|e| TubeblogError::InvalidInput(format!("Invalid channel URL: {}", e)))?;
        url.query_pairs_mut().append_pair("query", query);
        Ok(url)
    }

    /// Parse one line of `--flat-playlist --dump-json` output.
    fn parse_flat_entry(&self, line: &str) -> Option<ContentItem> {
        let json: serde_json::Value = serde_json::from_str(line).ok()?;
        let video_id = json["id"].as_str()?;

        // Search tabs can also list playlists and shorts shelves
        if !self.video_id_regex.is_match(video_id) {
            return None;
        }

        Some(ContentItem {
            video_id: video_id.to_string(),
            title: json["title"]
                .as_str()
                .unwrap_or("Unknown Title")
                .to_string(),
            url: format!("https://www.youtube.com/watch?v={}", video_id),
            description: json["description"].as_str().map(|s| s.to_string()),
            transcript: None,
        })
    }

    async fn list_videos(&self, query: &str) -> Result<Vec<ContentItem>> {
        let url = self.search_url(query)?;
        let limit = self.config.max_results().to_string();

        let output = self
            .runner
            .run(&[
                "--dump-json",
                "--flat-playlist",
                "--no-warnings",
                "--playlist-end",
                &limit,
                url.as_str(),
            ])
            .await?;

        if !output.success {
            return Err(classify_listing_failure(&self.channel, &output.stderr));
        }

        Ok(output
            .stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| self.parse_flat_entry(line))
            .take(self.config.max_results() as usize)
            .collect())
    }

    /// Fetch a video's description. Failures are logged and skipped.
    async fn fetch_description(&self, url: &str) -> Option<String> {
        let output = match self
            .runner
            .run(&["--dump-json", "--skip-download", "--no-warnings", url])
            .await
        {
            Ok(o) if o.success => o,
            Ok(o) => {
                warn!("Could not fetch metadata for {}: {}", url, o.stderr);
                return None;
            }
            Err(e) => {
                warn!("Could not fetch metadata for {}: {}", url, e);
                return None;
            }
        };

        let json: serde_json::Value = serde_json::from_str(&output.stdout).ok()?;
        json["description"].as_str().map(|s| s.to_string())
    }

    /// Download captions and flatten them to text.
    ///
    /// Returns `Ok(None)` when the video has no captions in the configured language.
    async fn fetch_transcript(&self, video_id: &str, url: &str) -> Result<Option<String>> {
        let temp_dir = tempfile::tempdir()?;
        let template = temp_dir.path().join(format!("{}.%(ext)s", video_id));

        let output = self
            .runner
            .run(&[
                "--skip-download",
                "--write-subs",
                "--write-auto-subs",
                "--sub-langs",
                &self.caption_language,
                "--sub-format",
                "vtt",
                "--no-warnings",
                "--output",
                template.to_str().unwrap_or_default(),
                url,
            ])
            .await?;

        if !output.success {
            return Err(TubeblogError::Search(format!(
                "Caption download failed for {}: {}",
                video_id, output.stderr
            )));
        }

        let Some(path) = find_caption_file(temp_dir.path(), video_id)? else {
            debug!("No captions available for {}", video_id);
            return Ok(None);
        };

        let vtt = std::fs::read_to_string(&path)?;
        let text = vtt_to_text(&vtt);
        if text.is_empty() {
            return Ok(None);
        }

        Ok(Some(truncate_chars(&text, self.max_transcript_chars)))
    }
}

#[async_trait]
impl ContentSearch for YoutubeChannelSearch {
    fn channel(&self) -> &ChannelHandle {
        &self.channel
    }

    fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[instrument(skip(self), fields(channel = %self.channel, depth = %self.config.depth()))]
    async fn search(&self, query: &str) -> Result<Vec<ContentItem>> {
        let mut items = self.list_videos(query).await?;
        info!("Found {} video(s)", items.len());

        for item in &mut items {
            if item.description.is_none() {
                item.description = self.fetch_description(&item.url).await;
            }

            if self.config.depth() == TranscriptionDepth::Full {
                item.transcript = match self.fetch_transcript(&item.video_id, &item.url).await {
                    Ok(transcript) => transcript,
                    Err(e) => {
                        warn!("Skipping transcript for {}: {}", item.video_id, e);
                        None
                    }
                };
            }
        }

        Ok(items)
    }
}

/// Map a failed channel listing onto the error taxonomy.
fn classify_listing_failure(channel: &ChannelHandle, stderr: &str) -> TubeblogError {
    if stderr.contains("does not exist") || stderr.contains("HTTP Error 404") {
        TubeblogError::ChannelNotFound(channel.to_string())
    } else {
        TubeblogError::Search(format!("Failed to search {}: {}", channel, stderr.trim()))
    }
}

/// Locate a downloaded caption file by video ID.
fn find_caption_file(dir: &Path, video_id: &str) -> Result<Option<std::path::PathBuf>> {
    for entry in std::fs::read_dir(dir)?.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(video_id) && name.ends_with(".vtt") {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}
