//! `{env:VAR}` placeholders and credential lookup.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::types::Config;

use crate::constants::{BASH_DEFAULT_TIMEOUT_SECS, BRAVE_API_KEY_ENV, MAX_TOKENS};

static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{env:([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex")
});

/// Expand every `{env:VAR}` in `value`. Unset variables expand to nothing.
fn expand(value: &mut String) {
    if !value.contains("{env:") {
        return;
    }
    let expanded = ENV_PLACEHOLDER.replace_all(value, |caps: &Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_default()
    });
    *value = expanded.into_owned();
}

/// A set, non-empty environment variable.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Expand placeholders in every string setting.
    pub(super) fn resolve_substitutions(&mut self) {
        expand(&mut self.model);
        let optional = [
            &mut self.system_prompt,
            &mut self.default_provider,
            &mut self.tools.brave_api_key,
        ];
        for value in optional.into_iter().flatten() {
            expand(value);
        }
        for entry in self.provider.entries_mut() {
            if let Some(key) = entry.api_key.as_mut() {
                expand(key);
            }
            if let Some(url) = entry.base_url.as_mut() {
                expand(url);
            }
        }
    }

    /// API key for `provider`: `<PROVIDER>_API_KEY` wins over the config file.
    ///
    /// Empty values count as missing.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        non_empty_var(&format!("{}_API_KEY", provider.to_uppercase())).or_else(|| {
            self.provider
                .entry(provider)
                .and_then(|e| e.api_key.clone())
                .filter(|k| !k.is_empty())
        })
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.default_provider.as_deref()
    }

    /// Configured model without any `provider/` prefix.
    ///
    /// `None` while the model is still the built-in default, so a provider
    /// picked on the command line can supply its own default instead.
    pub fn model_name(&self) -> Option<String> {
        if self.model == crate::constants::DEFAULT_MODEL {
            return None;
        }
        let model = self
            .model
            .split_once('/')
            .map_or(self.model.as_str(), |(_, m)| m);
        Some(model.to_string())
    }

    pub fn max_tokens(&self) -> u64 {
        self.max_tokens.unwrap_or(MAX_TOKENS)
    }

    /// Brave Search key: `BRAVE_SEARCH_API_KEY` first, then `[tools] brave_api_key`.
    pub fn brave_api_key(&self) -> Option<String> {
        non_empty_var(BRAVE_API_KEY_ENV).or_else(|| {
            self.tools
                .brave_api_key
                .clone()
                .filter(|k| !k.is_empty())
        })
    }

    pub fn bash_timeout_secs(&self) -> u64 {
        self.tools
            .bash_timeout_secs
            .unwrap_or(BASH_DEFAULT_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderEntry;

    fn expanded(s: &str) -> String {
        let mut value = s.to_string();
        expand(&mut value);
        value
    }

    #[test]
    fn test_expand_substitutes_env() {
        std::env::set_var("TERN_TEST_SUBST_VAR", "secret");
        assert_eq!(expanded("key-{env:TERN_TEST_SUBST_VAR}!"), "key-secret!");
        assert_eq!(expanded("{env:TERN_TEST_UNSET_VAR_XYZ}"), "");
        assert_eq!(expanded("{env:UNCLOSED"), "{env:UNCLOSED");
        assert_eq!(expanded("plain"), "plain");
    }

    #[test]
    fn test_substitutions_reach_provider_entries() {
        std::env::set_var("TERN_TEST_PROXY_URL", "https://proxy.internal");
        let mut config = Config::default();
        config.provider.ollama = Some(ProviderEntry {
            api_key: None,
            base_url: Some("{env:TERN_TEST_PROXY_URL}/ollama".into()),
        });
        config.resolve_substitutions();
        let url = config.provider.ollama.and_then(|e| e.base_url);
        assert_eq!(url.as_deref(), Some("https://proxy.internal/ollama"));
    }

    #[test]
    fn test_resolve_api_key_ignores_empty_config_value() {
        let mut config = Config::default();
        config.provider.openrouter = Some(ProviderEntry {
            api_key: Some(String::new()),
            base_url: None,
        });
        // OPENROUTER_API_KEY is not expected in the test environment.
        if std::env::var("OPENROUTER_API_KEY").is_err() {
            assert!(config.resolve_api_key("openrouter").is_none());
        }
    }

    #[test]
    fn test_model_name_strips_provider_prefix() {
        let config = Config {
            model: "anthropic/claude-opus-4".into(),
            ..Config::default()
        };
        assert_eq!(config.model_name().as_deref(), Some("claude-opus-4"));
        assert!(Config::default().model_name().is_none());
    }
}
