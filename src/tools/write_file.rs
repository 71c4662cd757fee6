//! Write-file tool: writes content to a file, creating parent directories as needed.

use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

use super::{paths, Tool, ToolContext, ToolError};

/// Tool that writes string content to a file, replacing it entirely.
///
/// Parent directories are created automatically. For targeted edits the
/// model should prefer `patch_file` or `multi_patch`.
pub struct WriteFileTool {
    /// Project root directory. Paths are resolved relative to this.
    project_root: PathBuf,
}

impl WriteFileTool {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }
}

#[derive(Deserialize)]
pub struct WriteFileInput {
    path: String,
    content: String,
}

#[async_trait::async_trait]
impl Tool for WriteFileTool {
    type Input = WriteFileInput;

    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file, replacing it entirely. Creates parent directories as needed. Path is relative to the project root."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path relative to project root"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file"
                }
            },
            "required": ["path", "content"]
        })
    }

    fn display(&self, input: &WriteFileInput) -> Option<String> {
        Some(format!("→ Writing file: {}", input.path))
    }

    async fn execute(&self, input: WriteFileInput, _ctx: &ToolContext<'_>) -> Result<String, ToolError> {
        if input.path.trim().is_empty() {
            return Err(ToolError::failed("path cannot be empty"));
        }
        let path = paths::resolve(&self.project_root, &input.path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ToolError::io(&input.path, e))?;
        }
        fs::write(&path, &input.content).map_err(|e| ToolError::io(&input.path, e))?;

        tracing::debug!(path = %path.display(), bytes = input.content.len(), "wrote file");
        Ok(format!(
            "Successfully wrote {} bytes to {}",
            input.content.len(),
            input.path
        ))
    }
}
