//! HTML presentation of messages for browser clients.

use std::sync::LazyLock;

use chrono::{DateTime, Local, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_core::types::{Message, Role};

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(https?://[^\s<]+)\b").expect("Invalid URL regex"));

/// Escape `&`, `<`, `>` and `"`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap `http(s)://` URLs in anchors. Expects already-escaped text.
pub fn linkify(escaped: &str) -> String {
    URL_RE
        .replace_all(
            escaped,
            r#"<a href="$1" target="_blank" rel="noopener noreferrer">$1</a>"#,
        )
        .into_owned()
}

/// Local display time, e.g. `Oct 19, 2026 03:04 PM`.
pub fn format_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%b %d, %Y %I:%M %p")
        .to_string()
}

/// A message as served to browser clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub id: Uuid,
    pub author: String,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Escaped, link-annotated text.
    pub html: String,
    pub display_time: String,
}

impl From<&Message> for RenderedMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            author: message.author.clone(),
            role: message.role,
            text: message.text.clone(),
            timestamp: message.timestamp,
            html: linkify(&escape_html(&message.text)),
            display_time: format_time(&message.timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"fish" & chips</b>"#),
            "&lt;b&gt;&quot;fish&quot; &amp; chips&lt;/b&gt;"
        );
        assert_eq!(escape_html("it's fine"), "it's fine");
    }

    #[test]
    fn test_linkify_wraps_urls() {
        assert_eq!(
            linkify("see https://example.com/a?b=1."),
            r#"see <a href="https://example.com/a?b=1" target="_blank" rel="noopener noreferrer">https://example.com/a?b=1</a>."#
        );
        assert_eq!(linkify("no links here"), "no links here");
        assert_eq!(linkify("ftp://example.com"), "ftp://example.com");
    }

    #[test]
    fn test_script_tags_are_inert() {
        let msg = Message::user("You", "<script>alert(1)</script> http://x.io");
        let rendered = RenderedMessage::from(&msg);
        assert!(!rendered.html.contains("<script>"));
        assert!(rendered.html.starts_with("&lt;script&gt;"));
        assert!(rendered.html.contains(r#"<a href="http://x.io""#));
    }

    #[test]
    fn test_format_time_shape() {
        let ts = Utc::now();
        let shown = format_time(&ts);
        assert!(shown.ends_with("AM") || shown.ends_with("PM"));
        assert!(shown.contains(", "));
    }
}
