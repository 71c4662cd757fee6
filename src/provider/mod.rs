//! LLM provider abstraction for tern.
//!
//! The conversation engine only sees the [`ModelClient`] trait: one blocking
//! request/response call carrying the system prompt, the full history and the
//! tool catalog. [`Provider`] is the production implementation, wrapping
//! rig-core's provider clients behind enum dispatch over [`ProviderKind`].

mod client;
mod convert;
mod kind;
mod resolve;

use async_trait::async_trait;

use crate::message::{self, ContentBlock, Message, ToolUse};
use crate::tools::ToolDefinition;

pub use client::Provider;
#[allow(unused_imports)]
pub use kind::{default_model_for, ProviderKind};
pub use resolve::{resolve_model, ModelSelection};

/// Failure talking to the model. Always fatal to the current exchange.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Transport, authentication or API-level failure.
    #[error("model request failed: {0}")]
    Request(String),
    /// The history contains something the provider cannot express.
    #[error("cannot convert conversation for the provider: {0}")]
    Conversion(String),
}

/// A model reply: ordered content blocks exactly as the provider returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub content: Vec<ContentBlock>,
}

impl ModelReply {
    pub fn new(content: Vec<ContentBlock>) -> Self {
        Self { content }
    }

    /// Non-empty text blocks joined with newlines.
    pub fn text(&self) -> String {
        message::join_text(&self.content)
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = ToolUse<'_>> {
        message::tool_uses(&self.content)
    }
}

/// The boundary between the conversation engine and a hosted model.
///
/// Retry policy, authentication and wire format live behind this trait.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn call(
        &self,
        system_prompt: &str,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, ModelError>;
}
