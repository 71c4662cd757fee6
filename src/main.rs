//! Entry point for tern, a terminal AI coding assistant.
//!
//! This binary sets up logging, loads the `.env` file, parses CLI arguments
//! via [`cli`], and dispatches to the appropriate subcommand handler.

mod agent;
mod chat;
mod cli;
mod config;
mod constants;
mod diff;
mod format;
mod message;
mod output;
mod provider;
mod tools;

use anyhow::Result;

/// Log targets raised to `debug` by `-v`; `-vv` adds rig-core and HTTP.
const VERBOSE_DIRECTIVES: &[&str] = &["tern=debug"];
const VERY_VERBOSE_DIRECTIVES: &[&str] = &["rig=debug", "reqwest=debug"];

fn init_tracing(verbose: u8) {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    let levels = [(1, VERBOSE_DIRECTIVES), (2, VERY_VERBOSE_DIRECTIVES)];
    for (_, directives) in levels.iter().filter(|(min, _)| verbose >= *min) {
        for directive in directives.iter() {
            if let Ok(parsed) = directive.parse() {
                env_filter = env_filter.add_directive(parsed);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the tern CLI.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli::parse();
    init_tracing(cli.verbose);
    config::Config::load_env_file()?;
    cli::run(cli).await
}
