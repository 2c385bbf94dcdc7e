//! HTML rendering for the converter page.

use super::presenter::{GenerateForm, Outcome};
use crate::llm::ModelChoice;
use pulldown_cmark::{html, Event, Options, Parser};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2933; background: #f7f8fa; }
.layout { display: flex; gap: 2rem; max-width: 1100px; margin: 0 auto; padding: 2rem; }
aside { flex: 0 0 280px; background: #fff; border-radius: 8px; padding: 1.25rem; }
main { flex: 1; }
label { display: block; margin-top: 1rem; font-weight: 600; font-size: 0.9rem; }
input[type=text], input[type=password], select { width: 100%; padding: 0.45rem; box-sizing: border-box; }
button { margin-top: 1.25rem; width: 100%; padding: 0.7rem; font-size: 1rem; cursor: pointer; }
button:disabled { cursor: progress; opacity: 0.6; }
.help { color: #616e7c; font-size: 0.8rem; }
.error { background: #fde8e8; color: #9b1c1c; padding: 0.75rem 1rem; border-radius: 6px; }
.success { background: #e3f9e5; color: #0e5814; padding: 0.75rem 1rem; border-radius: 6px; }
.busy { display: none; color: #616e7c; }
article { background: #fff; border-radius: 8px; padding: 1.5rem; margin-top: 1rem; }
.download { display: inline-block; margin-top: 1rem; }
"#;

const SCRIPT: &str = r#"
document.getElementById('generate-form').addEventListener('submit', function () {
  document.getElementById('generate-button').disabled = true;
  document.getElementById('busy').style.display = 'block';
});
"#;

/// Form values echoed back into the page. Never includes the credential.
#[derive(Debug, Clone)]
pub struct FormValues {
    pub channel_handle: String,
    pub topic: String,
    pub model: String,
    pub verbosity: u8,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            channel_handle: String::new(),
            topic: String::new(),
            model: ModelChoice::default().to_string(),
            verbosity: 1,
        }
    }
}

impl From<&GenerateForm> for FormValues {
    fn from(form: &GenerateForm) -> Self {
        Self {
            channel_handle: form.channel_handle.clone(),
            topic: form.topic.clone(),
            model: form.model.clone(),
            verbosity: form.verbosity.min(2),
        }
    }
}

/// Render the full page, with an optional outcome below the heading.
pub fn render_page(values: &FormValues, outcome: Option<&Outcome>) -> String {
    let result = outcome.map(render_outcome).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>YouTube to Blog Converter</title>
<style>{style}</style>
</head>
<body>
<div class="layout">
<aside>
<form id="generate-form" method="post" action="/generate">
<h2>API Configuration</h2>
<label for="api_key">Groq API Key</label>
<input type="password" id="api_key" name="api_key" autocomplete="off">
<div class="help">Get your API key from https://console.groq.com/keys</div>
<h2>Content Settings</h2>
<label for="channel_handle">YouTube Channel Handle</label>
<input type="text" id="channel_handle" name="channel_handle" placeholder="@your-channel" value="{channel}">
<div class="help">Enter the YouTube channel ID starting with @</div>
<label for="topic">Blog Topic</label>
<input type="text" id="topic" name="topic" placeholder="Enter your blog topic" value="{topic}">
<label for="model">LLM Model</label>
<select id="model" name="model">{models}</select>
<label for="verbosity">Process Detail Level: <output id="verbosity-value">{verbosity}</output></label>
<input type="range" id="verbosity" name="verbosity" min="0" max="2" step="1" value="{verbosity}" oninput="document.getElementById('verbosity-value').value = this.value">
<button type="submit" id="generate-button">Generate Blog Post</button>
</form>
<h3>How to Use</h3>
<ol class="help">
<li>Enter Groq API Key</li>
<li>Set YouTube channel</li>
<li>Specify blog topic</li>
<li>Select LLM model</li>
<li>Click Generate</li>
</ol>
</aside>
<main>
<h1>YouTube to Blog Converter</h1>
<h3>Transform YouTube Videos into Technical Blog Posts</h3>
<p id="busy" class="busy">Analyzing YouTube content...</p>
{result}
</main>
</div>
<script>{script}</script>
</body>
</html>
"#,
        style = STYLE,
        script = SCRIPT,
        channel = escape_html(&values.channel_handle),
        topic = escape_html(&values.topic),
        models = render_model_options(&values.model),
        verbosity = values.verbosity,
        result = result,
    )
}

fn render_model_options(selected: &str) -> String {
    ModelChoice::ALL
        .iter()
        .map(|model| {
            let name = model.as_str();
            let attr = if name == selected { " selected" } else { "" };
            format!(r#"<option value="{name}"{attr}>{name}</option>"#)
        })
        .collect()
}

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Invalid { message } => {
            format!(r#"<div class="error">{}</div>"#, escape_html(message))
        }
        Outcome::Failed { message, .. } => {
            format!(r#"<div class="error">{}</div>"#, escape_html(message))
        }
        Outcome::Generated {
            markdown,
            download,
            events,
        } => {
            let details = if events.is_empty() {
                String::new()
            } else {
                let items: String = events
                    .iter()
                    .map(|e| format!("<li>{}</li>", escape_html(e)))
                    .collect();
                format!("<details><summary>Process details</summary><ul>{}</ul></details>", items)
            };

            format!(
                r#"<div class="success">Blog Generation Complete!</div>
{details}
<h2>Generated Content</h2>
<article>{body}</article>
<a class="download" download="{file_name}" href="{href}">Download Markdown</a>"#,
                details = details,
                body = render_markdown(markdown),
                file_name = escape_html(&download.file_name),
                href = download.data_uri(),
            )
        }
    }
}

/// Render Markdown to HTML. Raw HTML in the source is shown as text.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
