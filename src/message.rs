//! Message types for tern's conversation history.
//!
//! A [`Message`] is one conversation turn: a [`Role`] plus an ordered list of
//! [`ContentBlock`]s. The block vocabulary mirrors the tool-calling protocol
//! of the hosted models: plain text, a model's `tool_use` request, and the
//! engine's `tool_result` answer. These are tern's internal types, converted
//! to provider-specific formats (rig-core's `Message`) when sent to the LLM.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The role of a message sender in the conversation.
///
/// A `User` turn may carry literal human text or synthesized tool results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of message content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain reply text.
    Text { text: String },
    /// The model's request to invoke a tool.
    ToolUse {
        /// Unique identifier, echoed back by the matching `ToolResult`.
        id: String,
        name: String,
        input: Value,
    },
    /// The engine's answer to a prior `ToolUse`.
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>, is_error: bool) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error,
        }
    }
}

/// A borrowed view of a `tool_use` block.
#[derive(Debug, Clone, Copy)]
pub struct ToolUse<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub input: &'a Value,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// An assistant turn holding the model's reply exactly as received.
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// A user turn answering every tool request of the preceding assistant turn.
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: results,
        }
    }

    /// Non-empty text blocks joined with newlines.
    pub fn text(&self) -> String {
        join_text(&self.content)
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = ToolUse<'_>> {
        tool_uses(&self.content)
    }

    /// Returns `(tool_use_id, content, is_error)` for every tool result block.
    pub fn tool_results_iter(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Some((tool_use_id.as_str(), content.as_str(), *is_error)),
            _ => None,
        })
    }

    /// Whether this user turn carries tool results rather than typed text.
    pub fn is_tool_results(&self) -> bool {
        self.content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolResult { .. }))
    }
}

/// Joins the non-empty text blocks of `blocks` with newlines.
pub fn join_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } if !text.is_empty() => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Iterates the `tool_use` blocks of `blocks` in arrival order.
pub fn tool_uses(blocks: &[ContentBlock]) -> impl Iterator<Item = ToolUse<'_>> {
    blocks.iter().filter_map(|block| match block {
        ContentBlock::ToolUse { id, name, input } => Some(ToolUse { id, name, input }),
        _ => None,
    })
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "you"),
            Role::Assistant => write!(f, "tern"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_block_wire_shape() {
        let block = ContentBlock::tool_use("toolu_1", "read_file", json!({"path": "a.txt"}));
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_use");
        assert_eq!(value["name"], "read_file");

        let result = ContentBlock::tool_result("toolu_1", "boom", true);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "tool_result");
        assert_eq!(value["is_error"], true);
    }

    #[test]
    fn test_text_skips_empty_and_tool_blocks() {
        let msg = Message::assistant(vec![
            ContentBlock::text("first"),
            ContentBlock::tool_use("t1", "glob", json!({})),
            ContentBlock::text(""),
            ContentBlock::text("second"),
        ]);
        assert_eq!(msg.text(), "first\nsecond");
        assert_eq!(msg.tool_uses().count(), 1);
        assert!(!msg.is_tool_results());
    }
}
