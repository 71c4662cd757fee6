use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::{paths, Tool, ToolContext, ToolError};

use crate::constants::READ_FILE_MAX_SIZE;

pub struct ReadFileTool {
    /// Project root directory. Paths are resolved relative to this.
    project_root: PathBuf,
}

impl ReadFileTool {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }
}

#[derive(Deserialize)]
pub struct ReadFileInput {
    path: String,
}

#[async_trait::async_trait]
impl Tool for ReadFileTool {
    type Input = ReadFileInput;

    fn name(&self) -> &str { "read_file" }

    fn description(&self) -> &str {
        "Read the contents of a text file. Path is relative to the project root."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path relative to project root"
                }
            },
            "required": ["path"]
        })
    }

    fn display(&self, input: &ReadFileInput) -> Option<String> {
        Some(format!("→ Reading file: {}", input.path))
    }

    async fn execute(&self, input: ReadFileInput, _ctx: &ToolContext<'_>) -> Result<String, ToolError> {
        if input.path.trim().is_empty() {
            return Err(ToolError::failed("path cannot be empty"));
        }
        let path = paths::resolve(&self.project_root, &input.path);

        let metadata = std::fs::metadata(&path).map_err(|e| ToolError::io(&input.path, e))?;
        if metadata.is_dir() {
            return Err(ToolError::failed(format!(
                "{} is a directory, use list_files instead",
                input.path
            )));
        }
        if metadata.len() > READ_FILE_MAX_SIZE {
            return Err(ToolError::failed(format!(
                "File too large: {} bytes (max {})",
                metadata.len(),
                READ_FILE_MAX_SIZE
            )));
        }

        let content = std::fs::read(&path).map_err(|e| ToolError::io(&input.path, e))?;
        if paths::looks_binary(&content) {
            return Err(ToolError::failed(
                "Binary file detected. Cannot display binary content.",
            ));
        }

        String::from_utf8(content)
            .map_err(|_| ToolError::failed(format!("{} is not valid UTF-8", input.path)))
    }
}
