//! Caption file flattening.

use regex::Regex;
use std::sync::OnceLock;

fn tag_regex() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    // Inline timing (<00:00:01.000>) and styling (<c>, </c>) tags
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid regex"))
}

/// Convert a WebVTT caption file to plain text.
///
/// Auto-generated captions repeat each line across consecutive cues, so
/// consecutive duplicates are collapsed.
pub fn vtt_to_text(vtt: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_note = false;

    for raw in vtt.lines() {
        let line = raw.trim();

        if line.is_empty() {
            in_note = false;
            continue;
        }
        if in_note {
            continue;
        }
        if line.starts_with("WEBVTT")
            || line.starts_with("Kind:")
            || line.starts_with("Language:")
            || line.contains("-->")
            || line.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        if line.starts_with("NOTE") || line.starts_with("STYLE") {
            in_note = true;
            continue;
        }

        let text = tag_regex().replace_all(line, "");
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if lines.last().is_some_and(|last| last == text) {
            continue;
        }
        lines.push(text.to_string());
    }

    lines.join(" ")
}

/// Truncate text to at most `max_chars` characters, marking the cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vtt_to_text() {
        let vtt = "WEBVTT\nKind: captions\nLanguage: en\n\n\
                   00:00:00.000 --> 00:00:02.000\nhello <c>and</c> welcome\n\n\
                   00:00:02.000 --> 00:00:04.000\nhello and welcome\n\n\
                   00:00:04.000 --> 00:00:06.000 align:start position:0%\n\
                   today<00:00:04.500><c> we</c> talk traits\n";

        assert_eq!(vtt_to_text(vtt), "hello and welcome today we talk traits");
    }

    #[test]
    fn test_vtt_skips_cue_numbers_and_notes() {
        let vtt = "WEBVTT\n\nNOTE this is a comment\nspanning lines\n\n1\n00:00:00.000 --> 00:00:01.000\nfirst\n\n2\n00:00:01.000 --> 00:00:02.000\nsecond\n";
        assert_eq!(vtt_to_text(vtt), "first second");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
    }
}
