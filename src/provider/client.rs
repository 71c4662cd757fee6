//! LLM provider client.
//!
//! Contains the [`Provider`] struct which wraps rig-core provider clients
//! behind enum dispatch, keeping provider-specific details out of the
//! conversation engine. Supports Anthropic, OpenAI, OpenRouter, and Ollama.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::CompletionModel;
use rig::providers::{anthropic, openai, openrouter};

use super::convert::{from_rig_content, to_rig_message, to_rig_tool};
use super::kind::ProviderKind;
use super::resolve::ModelSelection;
use super::{ModelClient, ModelError, ModelReply};
use crate::config::Config;
use crate::message::Message;
use crate::tools::ToolDefinition;

/// Internal enum wrapping provider-specific clients.
enum ClientKind {
    Anthropic(anthropic::Client),
    OpenAI(openai::Client),
    OpenRouter(openrouter::Client),
    Ollama(openai::Client),
}

/// A configured LLM provider ready to handle completion requests.
///
/// Wraps a rig-core provider client and the target model name. Each
/// [`ModelClient::call`] is a single non-streaming completion request; the
/// tool loop itself lives in [`crate::agent`], not in rig-core.
pub struct Provider {
    client: ClientKind,
    model: String,
    max_tokens: u64,
}

/// Dispatches an operation across provider-specific clients.
///
/// Matches on [`ClientKind`] and executes the same block for each variant,
/// letting the compiler monomorphize per provider.
macro_rules! dispatch {
    ($self:expr, |$client:ident| $body:expr) => {
        match &$self.client {
            ClientKind::Anthropic($client) => $body,
            ClientKind::OpenAI($client) => $body,
            ClientKind::OpenRouter($client) => $body,
            ClientKind::Ollama($client) => $body,
        }
    };
}

impl Provider {
    /// Creates a new [`Provider`] from the loaded application config.
    ///
    /// Resolves the API key through tern's config precedence chain
    /// (env var → config file → substitution) and builds the appropriate
    /// provider client.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is found for the selected provider
    /// or if client construction fails.
    pub fn from_config(config: &Config, selection: &ModelSelection) -> Result<Self> {
        let client = match selection.provider {
            ProviderKind::Anthropic => {
                let api_key = required_key(config, selection.provider)?;
                ClientKind::Anthropic(
                    anthropic::Client::new(&api_key)
                        .context("Failed to create Anthropic client")?,
                )
            }
            ProviderKind::OpenAI => {
                let api_key = required_key(config, selection.provider)?;
                ClientKind::OpenAI(
                    openai::Client::new(&api_key).context("Failed to create OpenAI client")?,
                )
            }
            ProviderKind::OpenRouter => {
                let api_key = required_key(config, selection.provider)?;
                ClientKind::OpenRouter(
                    openrouter::Client::new(&api_key)
                        .context("Failed to create OpenRouter client")?,
                )
            }
            ProviderKind::Ollama => {
                let base_url = config
                    .provider
                    .ollama
                    .as_ref()
                    .and_then(|o| o.base_url.as_deref())
                    .unwrap_or(crate::constants::OLLAMA_DEFAULT_BASE_URL);
                ClientKind::Ollama(
                    openai::Client::builder()
                        .api_key("ollama")
                        .base_url(format!("{}/v1", base_url))
                        .build()
                        .context("Failed to create Ollama client")?,
                )
            }
        };

        tracing::debug!(
            provider = selection.provider.name(),
            model = %selection.model,
            "provider ready"
        );

        Ok(Self {
            client,
            model: selection.model.clone(),
            max_tokens: config.max_tokens(),
        })
    }
}

fn required_key(config: &Config, kind: ProviderKind) -> Result<String> {
    let name = kind.name();
    config.resolve_api_key(name).with_context(|| {
        format!(
            "No API key found for {name}. Set {}_API_KEY (in the environment or a .env file) \
             or configure [provider.{name}] api_key in {}",
            name.to_uppercase(),
            crate::constants::CONFIG_FILENAME,
        )
    })
}

#[async_trait]
impl ModelClient for Provider {
    async fn call(
        &self,
        system_prompt: &str,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, ModelError> {
        // rig-core takes the newest turn as the prompt and everything
        // before it as chat history.
        let (last, earlier) = history
            .split_last()
            .ok_or_else(|| ModelError::Conversion("conversation history is empty".into()))?;
        let prompt = to_rig_message(last)?;
        let chat_history = earlier
            .iter()
            .map(to_rig_message)
            .collect::<Result<Vec<_>, _>>()?;
        let rig_tools = tools.iter().map(to_rig_tool).collect::<Vec<_>>();

        tracing::debug!(
            model = %self.model,
            messages = history.len(),
            tools = rig_tools.len(),
            "sending completion request"
        );

        let choice = dispatch!(self, |client| {
            let mut request = client
                .completion_model(&self.model)
                .completion_request(prompt)
                .messages(chat_history)
                .tools(rig_tools)
                .max_tokens(self.max_tokens);
            if !system_prompt.is_empty() {
                request = request.preamble(system_prompt.to_string());
            }
            request
                .send()
                .await
                .map_err(|e| ModelError::Request(e.to_string()))?
                .choice
        });

        Ok(ModelReply::new(from_rig_content(choice)))
    }
}
