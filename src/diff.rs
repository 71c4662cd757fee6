//! Unified diffs for file edits.
//!
//! The patch tools return the diff to the model as plain text, so no
//! color codes are emitted here.

use similar::{ChangeTag, TextDiff};

use crate::constants::DIFF_CONTEXT_LINES;

/// Generate a unified diff between `old` and `new` for `path`.
///
/// Returns an empty string if the contents are identical.
pub fn unified_diff(old: &str, new: &str, path: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut output = String::new();

    for hunk in diff
        .unified_diff()
        .context_radius(DIFF_CONTEXT_LINES)
        .iter_hunks()
    {
        if output.is_empty() {
            output.push_str(&format!("--- a/{path}\n+++ b/{path}\n"));
        }
        output.push_str(&hunk.header().to_string());
        output.push('\n');

        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => '-',
                ChangeTag::Insert => '+',
                ChangeTag::Equal => ' ',
            };
            output.push(sign);
            output.push_str(change.value());
            if change.missing_newline() {
                output.push_str("\n\\ No newline at end of file\n");
            }
        }
    }

    output
}

/// Count of (added, removed) lines between `old` and `new`.
pub fn line_stats(old: &str, new: &str) -> (usize, usize) {
    TextDiff::from_lines(old, new)
        .iter_all_changes()
        .fold((0, 0), |(added, removed), change| match change.tag() {
            ChangeTag::Insert => (added + 1, removed),
            ChangeTag::Delete => (added, removed + 1),
            ChangeTag::Equal => (added, removed),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_content_has_no_diff() {
        assert_eq!(unified_diff("a\nb\n", "a\nb\n", "x.txt"), "");
    }

    #[test]
    fn test_single_line_change() {
        let diff = unified_diff("one\ntwo\nthree\n", "one\n2\nthree\n", "n.txt");
        assert!(diff.starts_with("--- a/n.txt\n+++ b/n.txt\n@@"));
        assert!(diff.contains("-two\n"));
        assert!(diff.contains("+2\n"));
        assert!(diff.contains(" one\n"));
    }

    #[test]
    fn test_line_stats() {
        assert_eq!(line_stats("a\nb\n", "a\nc\nd\n"), (2, 1));
        assert_eq!(line_stats("same\n", "same\n"), (0, 0));
    }
}
