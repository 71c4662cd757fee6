use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::{paths, Tool, ToolContext, ToolError};

use crate::constants::GREP_MAX_MATCHES;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

pub struct GrepTool {
    project_root: PathBuf,
}

impl GrepTool {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    /// Search files under `search_root` for lines matching `regex`,
    /// keeping only files whose name matches `file_pattern` when given.
    fn search(&self, regex: &Regex, search_root: &Path, file_pattern: Option<&glob::Pattern>) -> Vec<String> {
        let mut matches = Vec::new();
        if search_root.is_file() {
            self.search_file(search_root, regex, &mut matches);
        } else {
            self.walk_and_search(search_root, regex, file_pattern, &mut matches);
        }
        matches
    }

    /// Recursively walk directories in name order.
    fn walk_and_search(
        &self,
        dir: &Path,
        regex: &Regex,
        file_pattern: Option<&glob::Pattern>,
        matches: &mut Vec<String>,
    ) {
        if matches.len() >= GREP_MAX_MATCHES {
            return;
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return, // silently skip unreadable dirs
        };

        let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            if matches.len() >= GREP_MAX_MATCHES {
                return;
            }

            let path = entry.path();
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();

            if path.is_dir() {
                if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()) {
                    continue;
                }
                self.walk_and_search(&path, regex, file_pattern, matches);
            } else if path.is_file() {
                if let Some(pattern) = file_pattern {
                    if !pattern.matches(&name) {
                        continue;
                    }
                }
                self.search_file(&path, regex, matches);
            }
        }
    }

    /// Search a single file, appending results as `path:line:content`.
    fn search_file(&self, path: &Path, regex: &Regex, matches: &mut Vec<String>) {
        // Read file, silently skip binary/unreadable
        let content = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(_) => return,
        };
        if paths::looks_binary(&content) {
            return;
        }
        let text = match String::from_utf8(content) {
            Ok(s) => s,
            Err(_) => return,
        };

        let relative = paths::display_relative(&self.project_root, path);
        for (line_num, line) in text.lines().enumerate() {
            if matches.len() >= GREP_MAX_MATCHES {
                return;
            }
            if regex.is_match(line) {
                matches.push(format!("{}:{}:{}", relative, line_num + 1, line));
            }
        }
    }
}

#[derive(Deserialize)]
pub struct GrepInput {
    pattern: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    file_pattern: Option<String>,
}

#[async_trait::async_trait]
impl Tool for GrepTool {
    type Input = GrepInput;

    fn name(&self) -> &str { "grep" }

    fn description(&self) -> &str {
        "Search file contents using a regex pattern. Returns matching lines with file paths and line numbers."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Regex pattern to search for"
                },
                "path": {
                    "type": "string",
                    "description": "File or directory to search (relative to project root, defaults to '.')"
                },
                "file_pattern": {
                    "type": "string",
                    "description": "Glob on file names to filter (e.g. '*.rs')"
                }
            },
            "required": ["pattern"]
        })
    }

    fn display(&self, input: &GrepInput) -> Option<String> {
        Some(format!("→ Searching for: {}", input.pattern))
    }

    async fn execute(&self, input: GrepInput, _ctx: &ToolContext<'_>) -> Result<String, ToolError> {
        if input.pattern.is_empty() {
            return Err(ToolError::failed("pattern cannot be empty"));
        }
        let regex = Regex::new(&input.pattern)
            .map_err(|e| ToolError::failed(format!("Invalid regex: {e}")))?;

        let file_pattern = input
            .file_pattern
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(glob::Pattern::new)
            .transpose()
            .map_err(|e| ToolError::failed(format!("Invalid file_pattern: {e}")))?;

        let search_root = match input.path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(p) => {
                let resolved = paths::resolve(&self.project_root, p);
                if !resolved.exists() {
                    return Err(ToolError::failed(format!("Search path does not exist: {p}")));
                }
                resolved
            }
            None => self.project_root.clone(),
        };

        let matches = self.search(&regex, &search_root, file_pattern.as_ref());

        if matches.is_empty() {
            Ok("No matches found.".into())
        } else {
            let truncated = if matches.len() >= GREP_MAX_MATCHES {
                format!("\n... truncated at {} matches", GREP_MAX_MATCHES)
            } else {
                String::new()
            };
            Ok(format!("{}{}", matches.join("\n"), truncated))
        }
    }
}
