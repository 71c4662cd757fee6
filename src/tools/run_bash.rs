//! Run-bash tool: shell command execution in the project root.

use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;

use super::{Tool, ToolContext, ToolError};

use crate::constants::BASH_MAX_OUTPUT_SIZE;

/// Tool that executes shell commands in a child process.
///
/// Commands run through `sh -c` with the configured timeout and an output
/// size cap. The working directory is the project root.
pub struct RunBashTool {
    project_root: PathBuf,
    timeout_secs: u64,
}

impl RunBashTool {
    pub fn new(project_root: PathBuf, timeout_secs: u64) -> Self {
        Self {
            project_root,
            timeout_secs,
        }
    }
}

#[derive(Deserialize)]
pub struct RunBashInput {
    command: String,
}

/// Truncate `output` to at most `BASH_MAX_OUTPUT_SIZE` bytes, appending a
/// notice when truncation occurs.
fn cap_output(output: &str) -> String {
    if output.len() <= BASH_MAX_OUTPUT_SIZE {
        return output.to_string();
    }
    // Find a valid UTF-8 boundary at or before the limit.
    let mut end = BASH_MAX_OUTPUT_SIZE;
    while end > 0 && !output.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}\n... output truncated at {} bytes",
        &output[..end],
        BASH_MAX_OUTPUT_SIZE
    )
}

#[async_trait::async_trait]
impl Tool for RunBashTool {
    type Input = RunBashInput;

    fn name(&self) -> &str {
        "run_bash"
    }

    fn description(&self) -> &str {
        "Execute a shell command in the project root and return its combined stdout and stderr. A non-zero exit status is reported as an error."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Shell command to execute"
                }
            },
            "required": ["command"]
        })
    }

    fn display(&self, input: &RunBashInput) -> Option<String> {
        Some(format!("→ Running: {}", input.command.trim()))
    }

    async fn execute(&self, input: RunBashInput, _ctx: &ToolContext<'_>) -> Result<String, ToolError> {
        if input.command.trim().is_empty() {
            return Err(ToolError::failed("command cannot be empty"));
        }

        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c").arg(&input.command);
        cmd.current_dir(&self.project_root);
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        cmd.kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| ToolError::failed(format!("Failed to execute command: {e}")))?;

        let result = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await;

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ToolError::failed(format!("Failed to execute command: {e}"))),
            Err(_) => {
                return Err(ToolError::failed(format!(
                    "Command timed out after {}s",
                    self.timeout_secs
                )))
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let mut text = stdout.to_string();
        if !stderr.is_empty() {
            text.push_str("\n--- stderr ---\n");
            text.push_str(&stderr);
        }
        let text = cap_output(&text);

        match output.status.code() {
            Some(0) => Ok(text.trim().to_string()),
            code => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                tracing::debug!(command = %input.command, %code, "command failed");
                Err(ToolError::failed(format!(
                    "Command failed (exit code: {code})\n{}",
                    text.trim()
                )))
            }
        }
    }
}
