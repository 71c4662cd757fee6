use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

use super::{paths, Tool, ToolContext, ToolError};

pub struct ListFilesTool {
    project_root: PathBuf,
}

impl ListFilesTool {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }
}

#[derive(Deserialize)]
pub struct ListFilesInput {
    #[serde(default)]
    path: Option<String>,
}

impl ListFilesInput {
    fn path(&self) -> &str {
        match self.path.as_deref() {
            Some(p) if !p.trim().is_empty() => p,
            _ => ".",
        }
    }
}

#[async_trait::async_trait]
impl Tool for ListFilesTool {
    type Input = ListFilesInput;

    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List the files and directories in a directory. Directories end with '/', files show their size. Defaults to the project root."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory to list, relative to project root (defaults to '.')"
                }
            }
        })
    }

    fn display(&self, input: &ListFilesInput) -> Option<String> {
        Some(format!("→ Listing files in: {}", input.path()))
    }

    async fn execute(&self, input: ListFilesInput, _ctx: &ToolContext<'_>) -> Result<String, ToolError> {
        let dir = paths::resolve(&self.project_root, input.path());
        let entries = fs::read_dir(&dir).map_err(|e| ToolError::io(input.path(), e))?;

        let mut lines: Vec<String> = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let name = entry.file_name().to_string_lossy().to_string();
            match entry.metadata() {
                Ok(meta) if meta.is_dir() => lines.push(format!("{name}/")),
                Ok(meta) => lines.push(format!("{name} ({} bytes)", meta.len())),
                Err(_) => lines.push(name),
            }
        }
        lines.sort();

        if lines.is_empty() {
            return Ok(format!("Directory {} is empty.", input.path()));
        }
        Ok(lines.join("\n"))
    }
}
