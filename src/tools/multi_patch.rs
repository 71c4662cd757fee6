//! Multi-patch tool: applies a batch of exact-text replacements across one
//! or more files, all or nothing.
//!
//! Each successful rewrite leaves an [`UndoRecord`] holding the file's
//! previous content. If any patch fails to read, match or write, no further
//! patches are attempted and the recorded files are restored in reverse
//! order of application, so the batch leaves no partial effects. A write
//! that fails part-way is repaired on its own and is not counted as applied.
//! A restore that itself fails is reported as [`PatchError::RollbackFailed`].
//!
//! A dirty git working tree around any target produces an advisory warning
//! on success; the rollback does not rely on version control.

use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::patch_file::replace_unique;
use super::{paths, Tool, ToolContext, ToolError};

/// One requested edit.
#[derive(Debug, Clone, Deserialize)]
pub struct Patch {
    pub path: String,
    pub old_text: String,
    pub new_text: String,
}

#[derive(Debug, Deserialize)]
pub struct MultiPatchInput {
    pub patches: Vec<Patch>,
}

/// A file's content as it was before patch `index` rewrote it.
///
/// Only written once the rewrite has succeeded.
#[derive(Debug, Clone)]
pub struct UndoRecord {
    pub index: usize,
    pub path: PathBuf,
    pub original: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("at least one patch is required in 'patches'")]
    Empty,

    #[error("patch {number}: {reason}")]
    Invalid { number: usize, reason: String },

    /// `reverted` counts the earlier patches undone; `restored` names each
    /// restored file once.
    #[error("{}", describe_failure(.number, .total, .path, .reason, .reverted, .restored))]
    Failed {
        number: usize,
        total: usize,
        path: String,
        reason: String,
        reverted: usize,
        restored: Vec<String>,
    },

    #[error("{}", describe_rollback_failure(.number, .total, .path, .reason, .reverted, .restored, .unrestored))]
    RollbackFailed {
        number: usize,
        total: usize,
        path: String,
        reason: String,
        reverted: usize,
        restored: Vec<String>,
        unrestored: Vec<String>,
    },
}

fn describe_failure(
    number: &usize,
    total: &usize,
    path: &str,
    reason: &str,
    reverted: &usize,
    restored: &[String],
) -> String {
    let mut msg = format!("Patch {number}/{total} FAILED on {path}: {reason}\n");
    if *reverted == 0 {
        msg.push_str("No files had been modified; nothing to roll back.");
    } else {
        msg.push_str(&format!(
            "Rolling back {reverted} applied patch(es)...\nRestored: {}\nrollback complete, no changes from this batch were kept.",
            restored.join(", ")
        ));
    }
    msg
}

fn describe_rollback_failure(
    number: &usize,
    total: &usize,
    path: &str,
    reason: &str,
    reverted: &usize,
    restored: &[String],
    unrestored: &[String],
) -> String {
    let mut msg = format!(
        "Patch {number}/{total} FAILED on {path}: {reason}\nRolling back {reverted} applied patch(es)...\n"
    );
    if !restored.is_empty() {
        msg.push_str(&format!("Restored: {}\n", restored.join(", ")));
    }
    msg.push_str(&format!(
        "rollback FAILED for {} file(s), these may be left modified:\n  {}",
        unrestored.len(),
        unrestored.join("\n  ")
    ));
    msg
}

/// Reject malformed batches before any file is touched.
pub fn validate(patches: &[Patch]) -> Result<(), PatchError> {
    if patches.is_empty() {
        return Err(PatchError::Empty);
    }
    for (index, patch) in patches.iter().enumerate() {
        let reason = if patch.path.trim().is_empty() {
            "path cannot be empty"
        } else if patch.old_text.is_empty() {
            "old_text cannot be empty"
        } else {
            continue;
        };
        return Err(PatchError::Invalid {
            number: index + 1,
            reason: reason.to_string(),
        });
    }
    Ok(())
}

/// Restore every record, most recent first.
///
/// Returns the display paths that were restored, each named once in the
/// order first restored, and separately those that could not be written
/// back together with the cause.
pub fn restore(project_root: &Path, undo: &[UndoRecord]) -> (Vec<String>, Vec<String>) {
    let mut restored: Vec<String> = Vec::new();
    let mut unrestored = Vec::new();
    for record in undo.iter().rev() {
        let shown = paths::display_relative(project_root, &record.path);
        match fs::write(&record.path, &record.original) {
            Ok(()) => {
                tracing::debug!(index = record.index, path = %shown, "restored file");
                if !restored.contains(&shown) {
                    restored.push(shown);
                }
            }
            Err(e) => {
                tracing::error!(index = record.index, path = %shown, error = %e, "restore failed");
                unrestored.push(format!("{shown}: {e}"));
            }
        }
    }
    (restored, unrestored)
}

/// Why a single patch was not applied.
struct StepFailure {
    reason: String,
    /// Content before the failed write, when the failure was the write itself.
    interrupted: Option<String>,
}

impl StepFailure {
    fn untouched(reason: String) -> Self {
        Self {
            reason,
            interrupted: None,
        }
    }
}

/// Read, match and rewrite one file. Returns the previous content and line stats.
fn apply_one(path: &Path, patch: &Patch) -> Result<(String, usize, usize), StepFailure> {
    let content = fs::read_to_string(path)
        .map_err(|e| StepFailure::untouched(format!("cannot read file: {e}")))?;
    let updated = replace_unique(&content, &patch.old_text, &patch.new_text)
        .map_err(|e| StepFailure::untouched(e.to_string()))?;
    let (added, removed) = crate::diff::line_stats(&content, &updated);
    if let Err(e) = fs::write(path, &updated) {
        return Err(StepFailure {
            reason: format!("cannot write file: {e}"),
            interrupted: Some(content),
        });
    }
    Ok((content, added, removed))
}

/// Put back a file whose rewrite failed part-way.
///
/// Returns an `unrestored` entry only when the file really differs from
/// `original` and cannot be written back.
fn repair_interrupted_write(project_root: &Path, path: &Path, original: &str) -> Option<String> {
    if fs::read_to_string(path).is_ok_and(|now| now == original) {
        return None;
    }
    let shown = paths::display_relative(project_root, path);
    match fs::write(path, original) {
        Ok(()) => {
            tracing::debug!(path = %shown, "repaired interrupted write");
            None
        }
        Err(e) => {
            tracing::error!(path = %shown, error = %e, "repair of interrupted write failed");
            Some(format!("{shown}: {e}"))
        }
    }
}

/// Apply `patches` in order under `project_root`.
///
/// On success returns one summary line per patch. On failure every file
/// touched so far has been restored before the error is returned.
pub fn apply_batch(project_root: &Path, patches: &[Patch]) -> Result<Vec<String>, PatchError> {
    validate(patches)?;

    let total = patches.len();
    let mut undo: Vec<UndoRecord> = Vec::with_capacity(total);
    let mut summary = Vec::with_capacity(total);

    for (index, patch) in patches.iter().enumerate() {
        let path = paths::resolve(project_root, &patch.path);
        match apply_one(&path, patch) {
            Ok((original, added, removed)) => {
                tracing::debug!(index, path = %patch.path, "applied patch");
                undo.push(UndoRecord {
                    index,
                    path,
                    original,
                });
                summary.push(format!("  {}. {} (+{added} -{removed})", index + 1, patch.path));
            }
            Err(StepFailure {
                reason,
                interrupted,
            }) => {
                tracing::warn!(index, path = %patch.path, %reason, "patch failed, rolling back");
                let damaged = interrupted
                    .and_then(|original| repair_interrupted_write(project_root, &path, &original));
                let (restored, mut unrestored) = restore(project_root, &undo);
                if let Some(entry) = damaged {
                    unrestored.insert(0, entry);
                }
                let number = index + 1;
                let reverted = undo.len();
                let path = patch.path.clone();
                return Err(if unrestored.is_empty() {
                    PatchError::Failed {
                        number,
                        total,
                        path,
                        reason,
                        reverted,
                        restored,
                    }
                } else {
                    PatchError::RollbackFailed {
                        number,
                        total,
                        path,
                        reason,
                        reverted,
                        restored,
                        unrestored,
                    }
                });
            }
        }
    }

    Ok(summary)
}

/// Distinct directories holding the batch's target files.
fn target_dirs(project_root: &Path, patches: &[Patch]) -> BTreeSet<PathBuf> {
    patches
        .iter()
        .map(|p| paths::resolve(project_root, &p.path))
        .map(|path| match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => project_root.to_path_buf(),
        })
        .collect()
}

/// True when `git status --porcelain` in `dir` reports anything.
///
/// Missing git or a directory outside a repository count as clean.
pub async fn has_uncommitted_changes(dir: &Path) -> bool {
    let output = tokio::process::Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(dir)
        .output()
        .await;
    match output {
        Ok(out) if out.status.success() => !out.stdout.iter().all(u8::is_ascii_whitespace),
        _ => false,
    }
}

pub struct MultiPatchTool {
    project_root: PathBuf,
}

impl MultiPatchTool {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }
}

#[async_trait::async_trait]
impl Tool for MultiPatchTool {
    type Input = MultiPatchInput;

    fn name(&self) -> &str {
        "multi_patch"
    }

    fn description(&self) -> &str {
        "Apply several exact-text replacements across one or more files as a single all-or-nothing batch. \
Patches apply in order; each old_text must appear exactly once in its file at the time it is applied. \
If any patch fails, every file already changed by the batch is restored."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "patches": {
                    "type": "array",
                    "description": "Ordered list of patches to apply",
                    "items": {
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
                    }
                }
            },
            "required": ["patches"]
        })
    }

    fn display(&self, input: &MultiPatchInput) -> Option<String> {
        match input.patches.len() {
            1 => Some("→ Applying 1 patch...".to_string()),
            n => Some(format!("→ Applying {n} patches...")),
        }
    }

    async fn execute(&self, input: MultiPatchInput, _ctx: &ToolContext<'_>) -> Result<String, ToolError> {
        validate(&input.patches)?;
        let mut dirty = false;
        for dir in target_dirs(&self.project_root, &input.patches) {
            if has_uncommitted_changes(&dir).await {
                tracing::debug!(dir = %dir.display(), "target directory has uncommitted changes");
                dirty = true;
                break;
            }
        }

        let summary = apply_batch(&self.project_root, &input.patches)?;

        let mut msg = format!(
            "Successfully applied all {} patches:\n{}",
            input.patches.len(),
            summary.join("\n")
        );
        if dirty {
            msg.push_str(
                "\n\nWARNING: You have uncommitted changes in this repository. \
Before large multi-file edits, consider committing first so the changes are easy to review and revert.",
            );
        }
        Ok(msg)
    }
}
