//! Command-line interface definition and dispatch for tern.
//!
//! Uses [`clap`] for argument parsing with derive macros. Running `tern`
//! without a subcommand starts the chat REPL.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::agent::Agent;
use crate::config::Config;
use crate::output::{Renderer, StdoutRenderer};
use crate::provider::{self, ModelSelection, Provider};
use crate::tools::ToolRegistry;
use crate::{chat, format};

/// Top-level CLI structure for tern.
#[derive(Parser, Debug)]
#[command(name = "tern", version, about = "A terminal AI coding assistant with file, shell and web tools")]
pub struct Cli {
    /// Provider to use (anthropic, openai, openrouter, ollama)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model to use (overrides config; accepts provider/model)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the tern CLI.
///
/// The `///` doc comments on variants double as `--help` text rendered by clap.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session (default)
    Chat,
    /// Ask a one-shot question
    Ask {
        /// The question to ask
        prompt: Vec<String>,
    },
    /// List the tools available to the model
    Tools,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subcommands for the `config` command.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current config with API keys redacted
    Show,
}

/// Parses command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Everything a conversation needs, built once per invocation.
pub struct Session {
    pub config: Config,
    pub selection: ModelSelection,
    pub provider: Provider,
    pub tools: ToolRegistry,
}

impl Session {
    fn build(cli: &Cli) -> Result<Self> {
        let config = Config::load()?;
        let selection =
            provider::resolve_model(cli.provider.as_deref(), cli.model.as_deref(), &config)?;
        let provider = Provider::from_config(&config, &selection)?;
        let project_root = std::env::current_dir().context("cannot determine working directory")?;
        let tools = ToolRegistry::with_builtins(project_root, &config)?;
        tracing::debug!(
            provider = selection.provider.name(),
            model = %selection.model,
            tools = tools.len(),
            "session ready"
        );
        Ok(Self {
            config,
            selection,
            provider,
            tools,
        })
    }

    pub fn system_prompt(&self) -> &str {
        self.config.system_prompt.as_deref().unwrap_or("")
    }
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None | Some(Commands::Chat) => {
            let session = Session::build(&cli)?;
            chat::run_chat(&session).await
        }
        Some(Commands::Ask { ref prompt }) => {
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                anyhow::bail!("No prompt provided. Usage: tern ask \"your question here\"");
            }
            let session = Session::build(&cli)?;
            ask(&session, &prompt).await
        }
        Some(Commands::Tools) => {
            let config = Config::load()?;
            let tools = ToolRegistry::with_builtins(std::env::current_dir()?, &config)?;
            print_tools(&tools);
            Ok(())
        }
        Some(Commands::Config {
            action: ConfigAction::Show,
        }) => {
            let config = Config::load()?;
            let path = Config::config_path()?;
            println!("{} {}", "Config path:".bold(), path.display());
            println!();
            println!("{}", toml::to_string_pretty(&redacted(config))?);
            Ok(())
        }
    }
}

async fn ask(session: &Session, prompt: &str) -> Result<()> {
    println!(
        "{} [model: {}]",
        "tern".bold().cyan(),
        session.selection.model.yellow(),
    );
    println!();
    println!("{} {}", ">".green().bold(), prompt);
    println!();

    let mut agent = Agent::new(&session.provider, &session.tools, session.system_prompt());
    let mut renderer = StdoutRenderer::new();
    match agent.handle_message(prompt, &mut renderer).await {
        Ok(reply) => {
            if renderer.tool_calls() > 0 {
                println!();
            }
            println!("{}", format::render_markdown_lite(&reply));
            println!();
            renderer.render_done();
            Ok(())
        }
        Err(e) => {
            renderer.render_error(&e.to_string());
            Err(e.into())
        }
    }
}

/// Print every registered tool with the first sentence of its description.
pub fn print_tools(tools: &ToolRegistry) {
    println!("{}", "Tools:".bold());
    for def in tools.definitions() {
        let summary = def
            .description
            .split_once(". ")
            .map_or(def.description.as_str(), |(first, _)| first);
        println!("  {:<12} {}", def.name.cyan(), summary.trim_end_matches('.'));
    }
}

/// Copy of `config` with every secret replaced by `***`.
fn redacted(mut config: Config) -> Config {
    let secrets = config
        .provider
        .entries_mut()
        .map(|e| &mut e.api_key)
        .chain([&mut config.tools.brave_api_key]);
    for secret in secrets {
        if secret.as_deref().is_some_and(|k| !k.is_empty()) {
            *secret = Some("***".into());
        }
    }
    config
}
