//! Settings structs and their serde defaults.

use serde::{Deserialize, Serialize};

/// Everything tern reads from `config.toml` and `tern.toml`.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Model name, optionally as `provider/model`.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Provider used when neither `--provider` nor a `provider/model` names one.
    #[serde(default)]
    pub default_provider: Option<String>,
    /// System prompt sent with every model call.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: Option<String>,
    /// Completion budget per model call.
    #[serde(default)]
    pub max_tokens: Option<u64>,
    /// Settings consumed by individual tools.
    #[serde(default)]
    pub tools: ToolsConfig,
}

pub(super) fn default_model() -> String {
    crate::constants::DEFAULT_MODEL.to_string()
}

fn default_system_prompt() -> Option<String> {
    Some(crate::constants::DEFAULT_SYSTEM_PROMPT.to_string())
}

/// One optional `[provider.<name>]` table per supported backend.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    pub openai: Option<ProviderEntry>,
    pub anthropic: Option<ProviderEntry>,
    pub ollama: Option<ProviderEntry>,
    pub openrouter: Option<ProviderEntry>,
}

impl ProviderConfig {
    /// The table for a lowercase provider name.
    pub fn entry(&self, name: &str) -> Option<&ProviderEntry> {
        match name {
            "openai" => self.openai.as_ref(),
            "anthropic" => self.anthropic.as_ref(),
            "ollama" => self.ollama.as_ref(),
            "openrouter" => self.openrouter.as_ref(),
            _ => None,
        }
    }

    /// Every configured table.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut ProviderEntry> {
        [
            &mut self.openai,
            &mut self.anthropic,
            &mut self.ollama,
            &mut self.openrouter,
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderEntry {
    /// Overridden by `<PROVIDER>_API_KEY` when that is set.
    pub api_key: Option<String>,
    /// Alternative endpoint, e.g. a proxy or a remote Ollama.
    pub base_url: Option<String>,
}

/// The `[tools]` table.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ToolsConfig {
    /// Brave Search subscription token for `web_search`.
    /// `BRAVE_SEARCH_API_KEY` in the environment takes precedence.
    pub brave_api_key: Option<String>,
    /// Timeout for `run_bash` commands, in seconds.
    pub bash_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            provider: ProviderConfig::default(),
            default_provider: None,
            system_prompt: default_system_prompt(),
            max_tokens: None,
            tools: ToolsConfig::default(),
        }
    }
}
