//! Output rendering abstraction for tern.
//!
//! Defines the [`Renderer`] trait that decouples the conversation engine
//! from the display layer. The engine reports tool progress through it while
//! a message is being handled; the REPL uses [`StdoutRenderer`].

use colored::Colorize;
use std::io::{self, Write};

/// Receives side-effect-only output produced while a message is handled.
///
/// Nothing passed to a renderer is stored in the conversation.
pub trait Renderer: Send {
    /// A tool is about to run, e.g. `→ Reading file: src/main.rs`.
    fn tool_progress(&mut self, message: &str);

    /// Called when an error should be shown to the user.
    fn render_error(&mut self, err: &str);
}

/// Renders progress lines to stdout and errors to stderr.
///
/// Counts the tool calls seen so the REPL can print a short footer.
#[derive(Debug, Default)]
pub struct StdoutRenderer {
    tool_calls: usize,
}

impl StdoutRenderer {
    pub fn new() -> Self {
        Self { tool_calls: 0 }
    }

    /// Returns the number of tool progress lines rendered.
    pub fn tool_calls(&self) -> usize {
        self.tool_calls
    }

    /// Resets the counter before the next message.
    pub fn reset(&mut self) {
        self.tool_calls = 0;
    }

    /// Prints the dimmed `[N tool calls]` footer when any tool ran.
    pub fn render_done(&self) {
        match self.tool_calls {
            0 => {}
            1 => println!("{}", "[1 tool call]".dimmed()),
            n => println!("{}", format!("[{n} tool calls]").dimmed()),
        }
    }
}

impl Renderer for StdoutRenderer {
    fn tool_progress(&mut self, message: &str) {
        self.tool_calls += 1;
        println!("{}", message.dimmed());
        // Flush so progress appears before a slow tool finishes
        io::stdout().flush().ok();
    }

    fn render_error(&mut self, err: &str) {
        eprintln!("{} {}", "error:".red().bold(), err);
    }
}
