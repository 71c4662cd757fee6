//! Configuration types and path resolution for tern.
//!
//! tern stores its settings as TOML at the platform's XDG config path
//! (e.g. `~/.config/tern/config.toml` on Linux), optionally overridden by a
//! project-level `tern.toml`. Credentials come from the environment, usually
//! populated from a `.env` file (see [`env`]).

mod env;
mod loader;
mod paths;
mod resolve;
mod types;

pub use types::Config;
#[allow(unused_imports)]
pub use types::{ProviderConfig, ProviderEntry, ToolsConfig};

use anyhow::Result;

impl Config {
    /// Load config with precedence: project > global > defaults.
    /// Creates default config file if none exists.
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project(&std::env::current_dir()?)?;

        let mut config = global;
        if let Some(proj) = project {
            config = Self::merge(config, proj);
        }

        config.resolve_substitutions();
        Ok(config)
    }
}
