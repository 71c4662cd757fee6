//! Path handling shared by the filesystem tools.

use std::path::{Path, PathBuf};

/// Resolve a tool-supplied path against the project root.
///
/// Relative paths are joined onto `project_root`; absolute paths are used
/// as-is. Nothing is canonicalized, so the target need not exist yet.
pub fn resolve(project_root: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        project_root.join(candidate)
    }
}

/// Render `path` relative to the project root when it lies inside it.
pub fn display_relative(project_root: &Path, path: &Path) -> String {
    path.strip_prefix(project_root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// True when the first `BINARY_DETECTION_BYTES` contain a NUL byte.
pub fn looks_binary(content: &[u8]) -> bool {
    let check_len = content.len().min(crate::constants::BINARY_DETECTION_BYTES);
    content[..check_len].contains(&0)
}
