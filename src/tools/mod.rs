pub mod browse;
pub mod glob_tool;
pub mod grep_tool;
pub mod list_files;
pub mod multi_patch;
pub mod patch_file;
pub mod paths;
pub mod read_file;
pub mod run_bash;
pub mod web_search;
pub mod write_file;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::config::Config;
use crate::message::Message;
use crate::output::Renderer;
use crate::provider::ModelClient;

use browse::BrowseTool;
use glob_tool::GlobTool;
use grep_tool::GrepTool;
use list_files::ListFilesTool;
use multi_patch::{MultiPatchTool, PatchError};
use patch_file::PatchFileTool;
use read_file::ReadFileTool;
use run_bash::RunBashTool;
use web_search::WebSearchTool;
use write_file::WriteFileTool;

/// Definition sent to the LLM so it knows what tools are available.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema
}

/// Why a tool call did not produce a result.
///
/// Every variant is recoverable: the engine turns it into an `is_error`
/// tool result the model can read.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),
    #[error("invalid parameters for {tool}: {reason}")]
    InvalidInput { tool: String, reason: String },
    #[error("{0}")]
    Failed(String),
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Patch(#[from] PatchError),
}

impl ToolError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// What an executor may consult besides its own parameters.
///
/// Tools such as `browse` issue a secondary model call through `client`
/// and read `history` for conversational context.
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    pub client: &'a dyn ModelClient,
    pub history: &'a [Message],
}

/// Every tool implements this trait.
///
/// `Input` is the tool's parameter contract; the dynamic JSON object sent
/// by the model is converted into it once, at dispatch.
#[async_trait]
pub trait Tool: Send + Sync {
    type Input: DeserializeOwned + Send;

    /// Unique name the LLM uses to call this tool.
    fn name(&self) -> &str;

    /// Human-readable description for the LLM.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn schema(&self) -> Value;

    /// Progress line shown before the tool runs. `None` or empty suppresses it.
    fn display(&self, _input: &Self::Input) -> Option<String> {
        None
    }

    async fn execute(&self, input: Self::Input, ctx: &ToolContext<'_>) -> Result<String, ToolError>;
}

/// Object-safe form of [`Tool`], implemented for every tool.
#[async_trait]
pub trait DynTool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Validates `input`, reports progress, then executes.
    async fn invoke(
        &self,
        input: Value,
        ctx: &ToolContext<'_>,
        renderer: &mut dyn Renderer,
    ) -> Result<String, ToolError>;
}

#[async_trait]
impl<T: Tool> DynTool for T {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Tool::name(self).to_string(),
            description: Tool::description(self).to_string(),
            parameters: Tool::schema(self),
        }
    }

    async fn invoke(
        &self,
        input: Value,
        ctx: &ToolContext<'_>,
        renderer: &mut dyn Renderer,
    ) -> Result<String, ToolError> {
        let input: T::Input =
            serde_json::from_value(input).map_err(|e| ToolError::InvalidInput {
                tool: Tool::name(self).to_string(),
                reason: e.to_string(),
            })?;
        if let Some(message) = Tool::display(self, &input).filter(|m| !m.is_empty()) {
            renderer.tool_progress(&message);
        }
        Tool::execute(self, input, ctx).await
    }
}

struct RegisteredTool {
    definition: ToolDefinition,
    tool: Box<dyn DynTool>,
}

/// Holds all registered tools and dispatches calls by name.
///
/// Built once at startup and read-only afterwards. Names are unique:
/// registering a name twice is rejected.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Called during startup.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<(), ToolError> {
        let definition = DynTool::definition(&tool);
        if self.tools.iter().any(|t| t.definition.name == definition.name) {
            return Err(ToolError::DuplicateTool(definition.name));
        }
        tracing::debug!(tool = %definition.name, "registered tool");
        self.tools.push(RegisteredTool {
            definition,
            tool: Box::new(tool),
        });
        Ok(())
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Result<&dyn DynTool, ToolError> {
        self.tools
            .iter()
            .find(|t| t.definition.name == name)
            .map(|t| t.tool.as_ref())
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Produce definitions for the LLM, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.definition.name.as_str())
    }

    /// How many tools are registered.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Create a registry with all built-in tools.
    pub fn with_builtins(project_root: PathBuf, config: &Config) -> Result<Self, ToolError> {
        let mut registry = Self::new();
        registry.register(ListFilesTool::new(project_root.clone()))?;
        registry.register(ReadFileTool::new(project_root.clone()))?;
        registry.register(WriteFileTool::new(project_root.clone()))?;
        registry.register(PatchFileTool::new(project_root.clone()))?;
        registry.register(MultiPatchTool::new(project_root.clone()))?;
        registry.register(RunBashTool::new(
            project_root.clone(),
            config.bash_timeout_secs(),
        ))?;
        registry.register(GrepTool::new(project_root.clone()))?;
        registry.register(GlobTool::new(project_root))?;
        registry.register(BrowseTool::new())?;
        registry.register(WebSearchTool::new(config.brave_api_key()))?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests;
