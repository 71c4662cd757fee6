//! Slash command handlers for the chat REPL.
//!
//! Dispatches `/history`, `/clear`, `/tools` and `/help`. Returns a
//! [`CommandAction`] so the REPL loop can decide how to proceed.

use colored::Colorize;

use crate::agent::Agent;
use crate::format;
use crate::tools::ToolRegistry;

/// Action returned by slash command handling.
pub(crate) enum CommandAction {
    /// Command was handled successfully; continue the REPL loop.
    Continue,
    /// Unknown command was entered.
    Unknown(String),
}

/// Dispatch and handle a slash command.
pub(crate) fn handle_slash_command(
    command: &str,
    agent: &mut Agent<'_>,
    tools: &ToolRegistry,
) -> CommandAction {
    match command {
        "/history" => {
            if agent.history().is_empty() {
                println!("{}", "No messages yet.".dimmed());
            }
            for msg in agent.history() {
                println!("{}", format::format_message(msg));
                println!();
            }
            CommandAction::Continue
        }
        "/clear" => {
            agent.clear();
            println!("{}", "History cleared.".dimmed());
            CommandAction::Continue
        }
        "/tools" => {
            crate::cli::print_tools(tools);
            CommandAction::Continue
        }
        "/help" => {
            println!("{}", "Commands:".bold());
            println!("  {} - show conversation history", "/history".cyan());
            println!("  {} - clear conversation", "/clear".cyan());
            println!("  {} - list available tools", "/tools".cyan());
            println!("  {} - show this help", "/help".cyan());
            println!("  {} - exit", "exit, quit, Ctrl+D".cyan());
            CommandAction::Continue
        }
        _ => CommandAction::Unknown(command.to_string()),
    }
}
