use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::{paths, Tool, ToolContext, ToolError};

use crate::constants::GLOB_MAX_RESULTS;

pub struct GlobTool {
    project_root: PathBuf,
}

impl GlobTool {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }
}

#[derive(Deserialize)]
pub struct GlobInput {
    pattern: String,
    #[serde(default)]
    path: Option<String>,
}

#[async_trait::async_trait]
impl Tool for GlobTool {
    type Input = GlobInput;

    fn name(&self) -> &str { "glob" }

    fn description(&self) -> &str {
        "List files matching a glob pattern (e.g. 'src/**/*.rs'). Searches from the project root unless a base path is given."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Glob pattern (e.g. 'src/**/*.rs')"
                },
                "path": {
                    "type": "string",
                    "description": "Base directory for the pattern (defaults to the project root)"
                }
            },
            "required": ["pattern"]
        })
    }

    fn display(&self, input: &GlobInput) -> Option<String> {
        Some(format!("→ Finding files: {}", input.pattern))
    }

    async fn execute(&self, input: GlobInput, _ctx: &ToolContext<'_>) -> Result<String, ToolError> {
        if input.pattern.trim().is_empty() {
            return Err(ToolError::failed("pattern cannot be empty"));
        }
        let base = match input.path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(p) => paths::resolve(&self.project_root, p),
            None => self.project_root.clone(),
        };
        let full_pattern = base.join(&input.pattern);
        let pattern_str = full_pattern.to_string_lossy();

        let entries = glob::glob(&pattern_str)
            .map_err(|e| ToolError::failed(format!("Invalid glob pattern: {e}")))?;

        let mut found: Vec<String> = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            if found.len() >= GLOB_MAX_RESULTS {
                found.push(format!("... truncated at {} results", GLOB_MAX_RESULTS));
                break;
            }
            // Show paths relative to project root
            found.push(paths::display_relative(&self.project_root, &entry));
        }

        if found.is_empty() {
            Ok("No files matched the pattern.".into())
        } else {
            Ok(found.join("\n"))
        }
    }
}
