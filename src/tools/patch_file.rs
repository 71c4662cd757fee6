//! Patch-file tool: a single exact-text replacement within one file.

use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::fs;
use std::path::PathBuf;

use super::{paths, Tool, ToolContext, ToolError};
use crate::diff;

/// Why `old_text` could not be replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    EmptyOldText,
    NotFound,
    NotUnique(usize),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyOldText => write!(f, "old_text cannot be empty"),
            Self::NotFound => write!(f, "old_text not found in file"),
            Self::NotUnique(count) => write!(
                f,
                "old_text appears {count} times in file (must be unique, add surrounding context)"
            ),
        }
    }
}

/// Replace the single occurrence of `old` in `content` with `new`.
///
/// Zero or several occurrences are rejected so an edit is never ambiguous.
pub fn replace_unique(content: &str, old: &str, new: &str) -> Result<String, MatchError> {
    if old.is_empty() {
        return Err(MatchError::EmptyOldText);
    }
    match content.matches(old).count() {
        0 => Err(MatchError::NotFound),
        1 => Ok(content.replacen(old, new, 1)),
        n => Err(MatchError::NotUnique(n)),
    }
}

/// Tool that replaces one unique occurrence of `old_text` in an existing file.
pub struct PatchFileTool {
    project_root: PathBuf,
}

impl PatchFileTool {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }
}

#[derive(Deserialize)]
pub struct PatchFileInput {
    path: String,
    old_text: String,
    new_text: String,
}

#[async_trait::async_trait]
impl Tool for PatchFileTool {
    type Input = PatchFileInput;

    fn name(&self) -> &str {
        "patch_file"
    }

    fn description(&self) -> &str {
        "Replace an exact piece of text in an existing file. old_text must appear exactly once; include surrounding lines to make it unique. Returns a diff of the change."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path relative to project root"
                },
                "old_text": {
                    "type": "string",
                    "description": "Exact text to find (must appear exactly once)"
                },
                "new_text": {
                    "type": "string",
                    "description": "Replacement text"
                }
            },
            "required": ["path", "old_text", "new_text"]
        })
    }

    fn display(&self, input: &PatchFileInput) -> Option<String> {
        Some(format!("→ Patching file: {}", input.path))
    }

    async fn execute(&self, input: PatchFileInput, _ctx: &ToolContext<'_>) -> Result<String, ToolError> {
        if input.path.trim().is_empty() {
            return Err(ToolError::failed("path cannot be empty"));
        }
        let path = paths::resolve(&self.project_root, &input.path);

        let content = fs::read_to_string(&path).map_err(|e| ToolError::io(&input.path, e))?;
        let updated = replace_unique(&content, &input.old_text, &input.new_text)
            .map_err(|e| ToolError::failed(format!("{}: {e}", input.path)))?;
        fs::write(&path, &updated).map_err(|e| ToolError::io(&input.path, e))?;

        let (added, removed) = diff::line_stats(&content, &updated);
        tracing::debug!(path = %input.path, added, removed, "patched file");

        let diff = diff::unified_diff(&content, &updated, &input.path);
        if diff.is_empty() {
            Ok(format!("Patched {} (content unchanged)", input.path))
        } else {
            Ok(format!(
                "Successfully patched {} (+{added} -{removed})\n{diff}",
                input.path
            ))
        }
    }
}
