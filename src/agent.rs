//! The conversation engine.
//!
//! [`Agent::handle_message`] drives one user message to completion: it calls
//! the model with the full history and tool catalog, runs every requested
//! tool in order, feeds the results back and repeats until the model answers
//! with text alone.
//!
//! Tool failures and unknown tool names never abort the loop; they become
//! `is_error` tool results the model can react to. Only a [`ModelError`]
//! ends a call early, and the history appended up to that point is kept.

use crate::message::{ContentBlock, Message, ToolUse};
use crate::output::Renderer;
use crate::provider::{ModelClient, ModelError};
use crate::tools::{ToolContext, ToolRegistry};

/// One conversation session.
pub struct Agent<'a> {
    client: &'a dyn ModelClient,
    tools: &'a ToolRegistry,
    system_prompt: String,
    history: Vec<Message>,
}

impl<'a> Agent<'a> {
    pub fn new(
        client: &'a dyn ModelClient,
        tools: &'a ToolRegistry,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tools,
            system_prompt: system_prompt.into(),
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Forget the conversation so far.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Handle one user message and return the model's final text.
    ///
    /// Every assistant turn with tool requests is followed by exactly one
    /// user turn answering each request id, in request order.
    pub async fn handle_message(
        &mut self,
        input: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<String, ModelError> {
        if input.trim().is_empty() {
            return Ok(String::new());
        }
        self.history.push(Message::user(input));
        let catalog = self.tools.definitions();

        let mut call_number = 0usize;
        loop {
            call_number += 1;
            tracing::debug!(call_number, messages = self.history.len(), "calling model");
            let reply = match self
                .client
                .call(&self.system_prompt, &self.history, &catalog)
                .await
            {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(call_number, error = %e, "model call failed");
                    return Err(e);
                }
            };

            let text = reply.text();
            let wants_tools = reply.tool_uses().next().is_some();
            self.history.push(Message::assistant(reply.content));
            if !wants_tools {
                return Ok(text);
            }

            let results = {
                let turn = &self.history[self.history.len() - 1];
                let requests: Vec<ToolUse<'_>> = turn.tool_uses().collect();
                tracing::debug!(
                    call_number,
                    tools = ?requests.iter().map(|r| r.name).collect::<Vec<_>>(),
                    "dispatching tools"
                );

                let ctx = ToolContext {
                    client: self.client,
                    history: &self.history,
                };
                let mut results = Vec::with_capacity(requests.len());
                for request in &requests {
                    results.push(self.run_tool(request, &ctx, renderer).await);
                }
                results
            };
            self.history.push(Message::tool_results(results));
        }
    }

    /// Run one requested tool, folding any failure into an error result.
    async fn run_tool(
        &self,
        request: &ToolUse<'_>,
        ctx: &ToolContext<'_>,
        renderer: &mut dyn Renderer,
    ) -> ContentBlock {
        let outcome = match self.tools.lookup(request.name) {
            Ok(tool) => tool.invoke(request.input.clone(), ctx, renderer).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(output) => ContentBlock::tool_result(request.id, output, false),
            Err(e) => {
                tracing::warn!(tool = request.name, id = request.id, error = %e, "tool failed");
                ContentBlock::tool_result(request.id, e.to_string(), true)
            }
        }
    }
}
