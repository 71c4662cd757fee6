//! Conversions between tern's conversation types and rig-core's.
//!
//! - **User** text → `RigMessage::User` with text content
//! - **User** tool results → `RigMessage::User` with one `ToolResult` item per block
//! - **Assistant** → `RigMessage::Assistant` with text and `ToolCall` items in order
//!
//! rig-core's tool result carries no error flag, so failed results are sent
//! with an `Error: ` prefix the model can see.

use rig::completion::ToolDefinition as RigToolDefinition;
use rig::message::{
    AssistantContent, Message as RigMessage, ToolCall as RigToolCall, ToolFunction,
    ToolResultContent, UserContent,
};
use rig::OneOrMany;

use super::ModelError;
use crate::message::{ContentBlock, Message, Role};
use crate::tools::ToolDefinition;

pub(super) fn to_rig_message(msg: &Message) -> Result<RigMessage, ModelError> {
    match msg.role {
        Role::User => {
            let items = msg
                .content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => Some(UserContent::text(text.clone())),
                    ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        is_error,
                    } => {
                        let content = if *is_error {
                            format!("Error: {content}")
                        } else {
                            content.clone()
                        };
                        Some(UserContent::tool_result(
                            tool_use_id.clone(),
                            OneOrMany::one(ToolResultContent::text(content)),
                        ))
                    }
                    ContentBlock::ToolUse { .. } => None,
                })
                .collect::<Vec<_>>();
            let content = OneOrMany::many(items)
                .map_err(|_| ModelError::Conversion("user message has no content".into()))?;
            Ok(RigMessage::User { content })
        }
        Role::Assistant => {
            let items = msg
                .content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } if !text.is_empty() => {
                        Some(AssistantContent::text(text.clone()))
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        Some(AssistantContent::ToolCall(RigToolCall::new(
                            id.clone(),
                            ToolFunction::new(name.clone(), input.clone()),
                        )))
                    }
                    _ => None,
                })
                .collect::<Vec<_>>();
            // The API rejects empty assistant turns; an empty reply still
            // has to occupy its slot so user/assistant pairing holds.
            let content = OneOrMany::many(items)
                .unwrap_or_else(|_| OneOrMany::one(AssistantContent::text("")));
            Ok(RigMessage::Assistant { id: None, content })
        }
    }
}

/// Converts a reply's content items into tern blocks, preserving order.
///
/// Reasoning and other non-protocol items are dropped.
pub(super) fn from_rig_content(choice: OneOrMany<AssistantContent>) -> Vec<ContentBlock> {
    choice
        .into_iter()
        .filter_map(|item| match item {
            AssistantContent::Text(text) => Some(ContentBlock::text(text.text)),
            AssistantContent::ToolCall(call) => Some(ContentBlock::tool_use(
                call.id,
                call.function.name,
                call.function.arguments,
            )),
            _ => None,
        })
        .collect()
}

pub(super) fn to_rig_tool(def: &ToolDefinition) -> RigToolDefinition {
    RigToolDefinition {
        name: def.name.clone(),
        description: def.description.clone(),
        parameters: def.parameters.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assistant_turn() -> Message {
        Message::assistant(vec![
            ContentBlock::text("Let me look."),
            ContentBlock::tool_use("toolu_a", "read_file", json!({"path": "a.rs"})),
            ContentBlock::text(""),
            ContentBlock::tool_use("toolu_b", "grep", json!({"pattern": "fn main"})),
        ])
    }

    #[test]
    fn test_assistant_turn_keeps_tool_call_order() {
        let RigMessage::Assistant { content, .. } = to_rig_message(&assistant_turn()).unwrap() else {
            panic!("expected an assistant message");
        };
        let items: Vec<_> = content.iter().collect();
        assert_eq!(items.len(), 3, "empty text is not sent");
        assert!(matches!(items[0], AssistantContent::Text(t) if t.text == "Let me look."));
        let calls: Vec<(&str, &str)> = items
            .iter()
            .filter_map(|item| match item {
                AssistantContent::ToolCall(call) => Some((call.id.as_str(), call.function.name.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(calls, vec![("toolu_a", "read_file"), ("toolu_b", "grep")]);
    }

    #[test]
    fn test_assistant_turn_round_trips() {
        let original = assistant_turn();
        let RigMessage::Assistant { content, .. } = to_rig_message(&original).unwrap() else {
            panic!("expected an assistant message");
        };
        let blocks = from_rig_content(content);
        let expected: Vec<_> = original
            .content
            .into_iter()
            .filter(|b| !matches!(b, ContentBlock::Text { text } if text.is_empty()))
            .collect();
        assert_eq!(blocks, expected);
    }

    #[test]
    fn test_tool_results_keep_ids_and_mark_errors() {
        let turn = Message::tool_results(vec![
            ContentBlock::tool_result("toolu_a", "fn main() {}", false),
            ContentBlock::tool_result("toolu_b", "Invalid regex: unclosed group", true),
        ]);
        let RigMessage::User { content } = to_rig_message(&turn).unwrap() else {
            panic!("expected a user message");
        };
        let results: Vec<(String, String)> = content
            .iter()
            .filter_map(|item| match item {
                UserContent::ToolResult(result) => {
                    let text = result
                        .content
                        .iter()
                        .filter_map(|c| match c {
                            ToolResultContent::Text(t) => Some(t.text.clone()),
                            _ => None,
                        })
                        .collect::<String>();
                    Some((result.id.clone(), text))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            results,
            vec![
                ("toolu_a".to_string(), "fn main() {}".to_string()),
                (
                    "toolu_b".to_string(),
                    "Error: Invalid regex: unclosed group".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_reply_keeps_arrival_order_and_drops_reasoning() {
        let choice = OneOrMany::many(vec![
            AssistantContent::reasoning("thinking about files"),
            AssistantContent::ToolCall(RigToolCall::new(
                "toolu_1".to_string(),
                ToolFunction::new("glob".to_string(), json!({"pattern": "*.rs"})),
            )),
            AssistantContent::text("Searching now."),
        ])
        .unwrap();
        assert_eq!(
            from_rig_content(choice),
            vec![
                ContentBlock::tool_use("toolu_1", "glob", json!({"pattern": "*.rs"})),
                ContentBlock::text("Searching now."),
            ]
        );
    }

    #[test]
    fn test_empty_assistant_turn_still_converts() {
        let turn = Message::assistant(Vec::new());
        assert!(matches!(to_rig_message(&turn), Ok(RigMessage::Assistant { .. })));
        assert!(to_rig_message(&Message::tool_results(Vec::new())).is_err());
    }

    #[test]
    fn test_tool_definition_is_copied() {
        let def = ToolDefinition {
            name: "glob".into(),
            description: "Find files".into(),
            parameters: json!({"type": "object"}),
        };
        let rig = to_rig_tool(&def);
        assert_eq!(rig.name, "glob");
        assert_eq!(rig.description, "Find files");
        assert_eq!(rig.parameters, json!({"type": "object"}));
    }
}
