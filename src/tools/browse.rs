//! Browse tool: fetches a web page and returns its readable text, or a
//! model-written answer about it when a prompt is given.

use regex::{Captures, Regex};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::LazyLock;
use std::time::Duration;

use super::{Tool, ToolContext, ToolError};
use crate::constants::{
    BROWSE_DEFAULT_MAX_LENGTH, BROWSE_MAX_CONTENT_CHARS, BROWSE_MAX_LENGTH_CAP,
    BROWSE_SYSTEM_PROMPT, HTTP_TIMEOUT_SECS, HTTP_USER_AGENT,
};
use crate::message::{Message, Role};

static INVISIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<head\b.*?</head\s*>|<template\b.*?</template\s*>",
    )
    .expect("static regex")
});

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(?:p|div|br|hr|li|ul|ol|dl|dt|dd|h[1-6]|tr|table|thead|tbody|section|article|header|footer|nav|aside|main|blockquote|pre|figure|figcaption|form)\b[^>]*>",
    )
    .expect("static regex")
});

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("static regex")
});

static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\x{a0}]+").expect("static regex"));

/// Build the HTTP client shared by the web tools.
pub(super) fn http_client() -> Result<reqwest::Client, ToolError> {
    reqwest::Client::builder()
        .user_agent(HTTP_USER_AGENT)
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .map_err(|e| ToolError::failed(format!("Failed to create HTTP client: {e}")))
}

fn decode_entity(caps: &Captures<'_>) -> String {
    let name = &caps[1];
    let decoded = if let Some(num) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(num, 16).ok().and_then(char::from_u32)
    } else if let Some(num) = name.strip_prefix('#') {
        num.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            "mdash" => Some('—'),
            "ndash" => Some('–'),
            "hellip" => Some('…'),
            "copy" => Some('©'),
            _ => None,
        }
    };
    decoded.map_or_else(|| caps[0].to_string(), String::from)
}

/// Convert an HTML document into readable plain text.
///
/// Scripts, styles and the document head are dropped, block-level tags
/// become line breaks, entities are decoded and blank lines collapsed.
pub fn html_to_text(html: &str) -> String {
    let text = INVISIBLE.replace_all(html, " ");
    let text = BLOCK_TAG.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    let text = ENTITY.replace_all(&text, decode_entity);

    text.lines()
        .map(|line| SPACES.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Most recent plain user text in the conversation, skipping tool results.
fn latest_user_request(history: &[Message]) -> Option<String> {
    history
        .iter()
        .rev()
        .filter(|m| m.role == Role::User && !m.is_tool_results())
        .map(|m| m.text())
        .find(|t| !t.trim().is_empty())
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}\n... content truncated at {max} characters", &text[..end]),
        None => text.to_string(),
    }
}

pub struct BrowseTool;

impl BrowseTool {
    pub fn new() -> Self {
        Self
    }

    /// Validate and parse a user-supplied URL.
    fn parse_url(raw: &str) -> Result<Url, ToolError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ToolError::failed("url is required"));
        }
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(url),
            _ => Err(ToolError::failed(format!(
                "invalid URL format: {raw} (must start with http:// or https://)"
            ))),
        }
    }

    /// Fetch `url` and return the page's readable text.
    pub async fn fetch_text(&self, url: &Url) -> Result<String, ToolError> {
        let response = http_client()?
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ToolError::failed(format!("failed to fetch {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::failed(format!("HTTP error {status} fetching {url}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ToolError::failed(format!("failed to read response from {url}: {e}")))?;

        let text = html_to_text(&body);
        if text.is_empty() {
            return Err(ToolError::failed(format!("no readable content found at {url}")));
        }
        Ok(text)
    }
}

impl Default for BrowseTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
pub struct BrowseInput {
    url: String,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    max_length: Option<u64>,
}

impl BrowseInput {
    /// Requested answer length in words, defaulted and capped.
    pub fn max_length(&self) -> u64 {
        match self.max_length {
            None | Some(0) => BROWSE_DEFAULT_MAX_LENGTH,
            Some(n) => n.min(BROWSE_MAX_LENGTH_CAP),
        }
    }
}

#[async_trait::async_trait]
impl Tool for BrowseTool {
    type Input = BrowseInput;

    fn name(&self) -> &str {
        "browse"
    }

    fn description(&self) -> &str {
        "Fetch a web page and return its readable text. With a prompt, returns a focused answer about the page instead of the full text."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "http:// or https:// URL to fetch"
                },
                "prompt": {
                    "type": "string",
                    "description": "What to extract or answer from the page (optional)"
                },
                "max_length": {
                    "type": "integer",
                    "description": "Maximum answer length in words when a prompt is given (default 500, max 1000)"
                }
            },
            "required": ["url"]
        })
    }

    fn display(&self, input: &BrowseInput) -> Option<String> {
        Some(format!("→ Browsing: {}", input.url))
    }

    async fn execute(&self, input: BrowseInput, ctx: &ToolContext<'_>) -> Result<String, ToolError> {
        let url = Self::parse_url(&input.url)?;
        let text = self.fetch_text(&url).await?;
        let text = truncate_chars(&text, BROWSE_MAX_CONTENT_CHARS);

        let Some(prompt) = input.prompt.as_deref().filter(|p| !p.trim().is_empty()) else {
            return Ok(format!("Content from {url}:\n\n{text}"));
        };

        let mut request = format!("Task: {prompt}\n");
        if let Some(user_request) = latest_user_request(ctx.history) {
            request.push_str(&format!("The user originally asked: {user_request}\n"));
        }
        request.push_str(&format!(
            "Answer in at most {} words.\n\nPage content from {url}:\n\n{text}",
            input.max_length()
        ));

        tracing::debug!(%url, max_length = input.max_length(), "summarizing page");
        let reply = ctx
            .client
            .call(BROWSE_SYSTEM_PROMPT, &[Message::user(request)], &[])
            .await
            .map_err(|e| ToolError::failed(format!("failed to process page content: {e}")))?;

        let answer = reply.text();
        if answer.trim().is_empty() {
            return Err(ToolError::failed("model returned an empty answer for the page"));
        }
        Ok(answer)
    }
}
