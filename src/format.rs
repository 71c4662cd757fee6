use colored::Colorize;

use crate::message::{Message, Role};

/// Format a message for terminal display with role label and colors.
///
/// Tool traffic is summarized rather than printed in full.
pub fn format_message(msg: &Message) -> String {
    let label = format_role_label(msg);
    let body = format_body(msg);
    format!("{}\n{}", label, body)
}

fn format_role_label(msg: &Message) -> String {
    match msg.role {
        Role::User if msg.is_tool_results() => format!("{}", "tools:".yellow()),
        Role::User => format!("{}", "you:".green().bold()),
        Role::Assistant => format!("{}", "tern:".cyan().bold()),
    }
}

fn format_body(msg: &Message) -> String {
    match msg.role {
        Role::User if msg.is_tool_results() => msg
            .tool_results_iter()
            .map(|(id, content, is_error)| {
                let status = if is_error { "error" } else { "ok" };
                let first = content.lines().next().unwrap_or("");
                format!("  [{id}] {status}: {first}").dimmed().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Role::User => msg.text(),
        Role::Assistant => {
            let mut lines = Vec::new();
            let text = msg.text();
            if !text.is_empty() {
                lines.push(render_markdown_lite(&text));
            }
            for call in msg.tool_uses() {
                lines.push(format!("  → {} {}", call.name, call.input).dimmed().to_string());
            }
            lines.join("\n")
        }
    }
}

/// Minimal markdown renderer for terminal output.
/// Not a full parser. Handles the three most common patterns
/// in LLM output: bold, inline code, and fenced code blocks.
pub fn render_markdown_lite(text: &str) -> String {
    let mut output = String::new();
    let mut in_code_block = false;

    for line in text.lines() {
        if let Some(lang) = line.strip_prefix("```") {
            if in_code_block {
                output.push('\n');
            } else if !lang.is_empty() {
                output.push_str(&format!("  {}\n", lang.dimmed()));
            }
            in_code_block = !in_code_block;
            continue;
        }

        if in_code_block {
            output.push_str(&format!("  {}\n", line.dimmed()));
        } else {
            output.push_str(&render_inline(line));
            output.push('\n');
        }
    }

    if output.ends_with('\n') {
        output.pop();
    }
    output
}

/// Handle **bold** and `inline code` within a single line.
fn render_inline(line: &str) -> String {
    let mut result = String::new();
    let mut rest = line;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**") {
            if let Some(end) = after.find("**") {
                result.push_str(&after[..end].bold().to_string());
                rest = &after[end + 2..];
                continue;
            }
        }
        if let Some(after) = rest.strip_prefix('`') {
            if let Some(end) = after.find('`') {
                result.push_str(&after[..end].dimmed().to_string());
                rest = &after[end + 1..];
                continue;
            }
        }

        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            result.push(ch);
        }
        rest = chars.as_str();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ContentBlock;

    #[test]
    fn test_markdown_lite_keeps_plain_text() {
        colored::control::set_override(false);
        assert_eq!(render_markdown_lite("hello\nworld"), "hello\nworld");
        assert_eq!(render_markdown_lite("a **b** `c` d"), "a b c d");
        assert_eq!(render_markdown_lite("```rust\nlet x = 1;\n```"), "  rust\n  let x = 1;\n");
    }

    #[test]
    fn test_unclosed_markers_are_literal() {
        colored::control::set_override(false);
        assert_eq!(render_markdown_lite("2 ** 3 and `tick"), "2 ** 3 and `tick");
    }

    #[test]
    fn test_tool_results_are_summarized() {
        colored::control::set_override(false);
        let msg = Message::tool_results(vec![ContentBlock::tool_result("t1", "line one\nline two", true)]);
        let out = format_message(&msg);
        assert!(out.starts_with("tools:"));
        assert!(out.contains("[t1] error: line one"));
        assert!(!out.contains("line two"));
    }
}
