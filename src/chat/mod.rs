//! Interactive chat REPL for tern.
//!
//! Provides a multi-turn conversation loop using [`rustyline`] for readline
//! support (history, line editing). Each line goes to the [`Agent`], which
//! keeps the full history so the model sees all prior context.

mod commands;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::agent::Agent;
use crate::cli::Session;
use crate::config::Config;
use crate::format;
use crate::output::{Renderer, StdoutRenderer};

/// What the REPL should do with one line of input.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Input<'a> {
    Skip,
    Exit,
    Command(&'a str),
    Message(&'a str),
}

/// Classify a raw input line.
pub(crate) fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Skip,
        "exit" | "quit" => Input::Exit,
        _ if line.starts_with('/') => Input::Command(line),
        _ => Input::Message(line),
    }
}

/// Runs the interactive chat REPL.
///
/// # Readline behavior
///
/// - **Ctrl+C**: cancels current input, stays in REPL
/// - **Ctrl+D**, `exit` or `quit`: exits cleanly with "goodbye."
/// - Readline history is persisted to `~/.cache/tern/chat_history.txt`
pub async fn run_chat(session: &Session) -> Result<()> {
    let mut agent = Agent::new(&session.provider, &session.tools, session.system_prompt());

    println!(
        "{} [model: {}] [{} tools] (exit or Ctrl+D to quit, /help for commands)",
        "tern chat".bold().cyan(),
        session.selection.model.yellow(),
        session.tools.len(),
    );
    println!();

    // Set up readline with persistent history
    let mut rl = DefaultEditor::new()?;
    let history_path = Config::cache_dir()?.join(crate::constants::HISTORY_FILENAME);
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    let mut renderer = StdoutRenderer::new();

    loop {
        let readline = rl.readline(&format!("{} ", ">".green().bold()));

        match readline {
            Ok(raw) => match classify(&raw) {
                Input::Skip => continue,
                Input::Exit => {
                    let _ = rl.add_history_entry(raw.trim());
                    println!("{}", "goodbye.".dimmed());
                    break;
                }
                Input::Command(cmd) => {
                    let _ = rl.add_history_entry(cmd);
                    if let commands::CommandAction::Unknown(cmd) =
                        commands::handle_slash_command(cmd, &mut agent, &session.tools)
                    {
                        println!("{} Unknown command: {} (try /help)", "?".yellow(), cmd);
                    }
                }
                Input::Message(line) => {
                    let _ = rl.add_history_entry(line);
                    println!();

                    renderer.reset();
                    match agent.handle_message(line, &mut renderer).await {
                        Ok(reply) => {
                            if renderer.tool_calls() > 0 {
                                println!();
                            }
                            println!("{}", format::render_markdown_lite(&reply));
                            println!();
                            renderer.render_done();
                        }
                        // History is kept; the user can simply retry.
                        Err(e) => renderer.render_error(&e.to_string()),
                    }
                    println!();
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "goodbye.".dimmed());
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        }
    }

    // Save readline history
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if let Err(e) = rl.save_history(&history_path) {
        tracing::warn!(path = %history_path.display(), error = %e, "could not save readline history");
    }

    Ok(())
}
