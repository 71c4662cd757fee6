use super::*;
use crate::message::ContentBlock;
use crate::provider::{ModelError, ModelReply};
use multi_patch::{apply_batch, restore, Patch, UndoRecord};
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

/// Answers every call with fixed text and remembers the prompts it saw.
struct CannedClient {
    answer: String,
    prompts: Mutex<Vec<String>>,
}

impl CannedClient {
    fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModelClient for CannedClient {
    async fn call(
        &self,
        _system_prompt: &str,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<crate::provider::ModelReply, ModelError> {
        assert!(tools.is_empty(), "secondary calls advertise no tools");
        let prompt = history.iter().map(|m| m.text()).collect::<Vec<_>>().join("\n");
        self.prompts.lock().unwrap().push(prompt);
        Ok(ModelReply::new(vec![ContentBlock::text(self.answer.clone())]))
    }
}

#[derive(Default)]
struct Progress(Vec<String>);

impl Renderer for Progress {
    fn tool_progress(&mut self, message: &str) {
        self.0.push(message.to_string());
    }
    fn render_error(&mut self, _err: &str) {}
}

async fn run(registry: &ToolRegistry, name: &str, input: Value) -> Result<String, ToolError> {
    run_with(registry, name, input, &CannedClient::new(""), &[]).await
}

async fn run_with(
    registry: &ToolRegistry,
    name: &str,
    input: Value,
    client: &dyn ModelClient,
    history: &[Message],
) -> Result<String, ToolError> {
    let ctx = ToolContext { client, history };
    registry
        .lookup(name)?
        .invoke(input, &ctx, &mut Progress::default())
        .await
}

fn builtins(root: &Path) -> ToolRegistry {
    ToolRegistry::with_builtins(root.to_path_buf(), &Config::default()).unwrap()
}

// --- registry ---

#[tokio::test]
async fn test_registry_with_builtins() {
    let registry = builtins(Path::new("."));
    assert_eq!(registry.len(), 10);
    assert!(!registry.is_empty());
    let names: Vec<&str> = registry.names().collect();
    assert_eq!(
        names,
        vec![
            "list_files",
            "read_file",
            "write_file",
            "patch_file",
            "multi_patch",
            "run_bash",
            "grep",
            "glob",
            "browse",
            "web_search"
        ]
    );
    let defs = registry.definitions();
    assert_eq!(defs.len(), 10);
    assert_eq!(defs, registry.definitions());
    assert!(defs.iter().all(|d| d.parameters["type"] == "object"));
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut registry = ToolRegistry::new();
    registry.register(GlobTool::new(PathBuf::from("."))).unwrap();
    let err = registry.register(GlobTool::new(PathBuf::from("/tmp"))).unwrap_err();
    assert!(matches!(err, ToolError::DuplicateTool(ref name) if name == "glob"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_lookup_unknown_tool() {
    let registry = ToolRegistry::new();
    let err = registry.lookup("nope").err().unwrap();
    assert_eq!(err.to_string(), "unknown tool: nope");
}

#[tokio::test]
async fn test_invalid_input_names_the_tool() {
    let registry = builtins(Path::new("."));
    let err = run(&registry, "read_file", json!({"file": "x"})).await.unwrap_err();
    assert!(matches!(err, ToolError::InvalidInput { ref tool, .. } if tool == "read_file"));
    assert!(err.to_string().contains("path"));
}

#[tokio::test]
async fn test_progress_is_reported_before_execution() {
    let registry = builtins(Path::new("."));
    let ctx = ToolContext {
        client: &CannedClient::new(""),
        history: &[],
    };
    let mut progress = Progress::default();
    let _ = registry
        .lookup("read_file")
        .unwrap()
        .invoke(json!({"path": "Cargo.toml"}), &ctx, &mut progress)
        .await;
    assert_eq!(progress.0, vec!["→ Reading file: Cargo.toml"]);
}

/// Runs silently: its display text is always empty.
struct QuietTool;

#[derive(Deserialize)]
struct QuietInput {
    label: String,
}

#[async_trait]
impl Tool for QuietTool {
    type Input = QuietInput;

    fn name(&self) -> &str {
        "quiet"
    }

    fn description(&self) -> &str {
        "Echoes its label"
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {"label": {"type": "string"}}})
    }

    fn display(&self, _input: &QuietInput) -> Option<String> {
        Some(String::new())
    }

    async fn execute(&self, input: QuietInput, _ctx: &ToolContext<'_>) -> Result<String, ToolError> {
        Ok(input.label)
    }
}

#[tokio::test]
async fn test_empty_display_suppresses_progress() {
    let mut registry = ToolRegistry::new();
    registry.register(QuietTool).unwrap();
    let ctx = ToolContext {
        client: &CannedClient::new(""),
        history: &[],
    };
    let mut progress = Progress::default();
    let out = registry
        .lookup("quiet")
        .unwrap()
        .invoke(json!({"label": "done"}), &ctx, &mut progress)
        .await
        .unwrap();
    assert_eq!(out, "done");
    assert!(progress.0.is_empty(), "unexpected progress: {:?}", progress.0);
}

// --- file tools ---

#[tokio::test]
async fn test_read_file_cargo_toml() {
    let registry = builtins(Path::new("."));
    let result = run(&registry, "read_file", json!({"path": "Cargo.toml"})).await.unwrap();
    assert!(result.contains("[package]"));
}

#[tokio::test]
async fn test_read_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bin.dat"), b"ab\0cd").unwrap();
    let registry = builtins(dir.path());

    let missing = run(&registry, "read_file", json!({"path": "nonexistent_file_xyz.txt"})).await;
    assert!(matches!(missing, Err(ToolError::Io { .. })));

    let binary = run(&registry, "read_file", json!({"path": "bin.dat"})).await.unwrap_err();
    assert!(binary.to_string().contains("Binary"));

    let empty = run(&registry, "read_file", json!({"path": ""})).await.unwrap_err();
    assert!(empty.to_string().contains("cannot be empty"));
}

#[tokio::test]
async fn test_write_then_list() {
    let dir = tempfile::tempdir().unwrap();
    let registry = builtins(dir.path());

    let result = run(
        &registry,
        "write_file",
        json!({"path": "nested/dir/hello.txt", "content": "hi there"}),
    )
    .await
    .unwrap();
    assert_eq!(result, "Successfully wrote 8 bytes to nested/dir/hello.txt");
    assert_eq!(fs::read_to_string(dir.path().join("nested/dir/hello.txt")).unwrap(), "hi there");

    fs::write(dir.path().join("a.txt"), "abc").unwrap();
    let listing = run(&registry, "list_files", json!({})).await.unwrap();
    assert_eq!(listing, "a.txt (3 bytes)\nnested/");

    let missing = run(&registry, "list_files", json!({"path": "nowhere"})).await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn test_glob_and_grep() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/inner")).unwrap();
    fs::create_dir_all(dir.path().join("target")).unwrap();
    fs::write(dir.path().join("src/lib.rs"), "fn alpha() {}\nfn beta() {}\n").unwrap();
    fs::write(dir.path().join("src/inner/mod.rs"), "// alpha here\n").unwrap();
    fs::write(dir.path().join("src/notes.md"), "alpha notes\n").unwrap();
    fs::write(dir.path().join("target/gen.rs"), "fn alpha() {}\n").unwrap();
    let registry = builtins(dir.path());

    let globbed = run(&registry, "glob", json!({"pattern": "src/**/*.rs"})).await.unwrap();
    assert!(globbed.contains("src/lib.rs"));
    assert!(globbed.contains("src/inner/mod.rs"));
    assert!(!globbed.contains("notes.md"));

    let none = run(&registry, "glob", json!({"pattern": "**/*.zig"})).await.unwrap();
    assert_eq!(none, "No files matched the pattern.");

    let grepped = run(&registry, "grep", json!({"pattern": "alpha", "file_pattern": "*.rs"}))
        .await
        .unwrap();
    assert_eq!(grepped, "src/inner/mod.rs:1:// alpha here\nsrc/lib.rs:1:fn alpha() {}");

    let no_match = run(&registry, "grep", json!({"pattern": "gamma"})).await.unwrap();
    assert_eq!(no_match, "No matches found.");

    let bad = run(&registry, "grep", json!({"pattern": "("})).await.unwrap_err();
    assert!(bad.to_string().contains("Invalid regex"));
}

// --- run_bash ---

#[tokio::test]
async fn test_run_bash() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("marker.txt"), "").unwrap();
    let registry = builtins(dir.path());

    let out = run(&registry, "run_bash", json!({"command": "echo hello && ls"})).await.unwrap();
    assert!(out.contains("hello"));
    assert!(out.contains("marker.txt"));

    let empty = run(&registry, "run_bash", json!({"command": "  "})).await.unwrap_err();
    assert!(empty.to_string().contains("cannot be empty"));

    let failed = run(&registry, "run_bash", json!({"command": "echo oops >&2; exit 3"}))
        .await
        .unwrap_err();
    assert!(failed.to_string().contains("exit code: 3"));
    assert!(failed.to_string().contains("oops"));

    let invalid = run(&registry, "run_bash", json!({"command": "definitely_not_a_command_xyz"}))
        .await;
    assert!(invalid.is_err());
}

#[tokio::test]
async fn test_run_bash_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = ToolRegistry::new();
    registry
        .register(run_bash::RunBashTool::new(dir.path().to_path_buf(), 1))
        .unwrap();
    let err = run(&registry, "run_bash", json!({"command": "sleep 5"})).await.unwrap_err();
    assert!(err.to_string().contains("timed out after 1s"));
}

// --- patch_file ---

#[tokio::test]
async fn test_patch_file_replaces_and_shows_diff() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "one\ntwo\nthree\n").unwrap();
    let registry = builtins(dir.path());

    let out = run(
        &registry,
        "patch_file",
        json!({"path": "a.txt", "old_text": "two", "new_text": "2"}),
    )
    .await
    .unwrap();
    assert!(out.contains("Successfully patched a.txt"));
    assert!(out.contains("-two"));
    assert!(out.contains("+2"));
    assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "one\n2\nthree\n");
}

#[tokio::test]
async fn test_patch_file_rejects_ambiguous_edits() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("dup.txt"), "foo bar foo").unwrap();
    let registry = builtins(dir.path());

    let err = run(
        &registry,
        "patch_file",
        json!({"path": "dup.txt", "old_text": "foo", "new_text": "baz"}),
    )
    .await
    .unwrap_err()
    .to_string();
    assert!(err.contains("appears 2 times"));
    assert!(err.contains("unique"));

    let err = run(
        &registry,
        "patch_file",
        json!({"path": "dup.txt", "old_text": "qux", "new_text": "baz"}),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("not found"));

    let err = run(
        &registry,
        "patch_file",
        json!({"path": "dup.txt", "old_text": "", "new_text": "baz"}),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("cannot be empty"));

    assert_eq!(fs::read_to_string(dir.path().join("dup.txt")).unwrap(), "foo bar foo");
}

#[tokio::test]
async fn test_patch_round_trip_restores_content() {
    let dir = tempfile::tempdir().unwrap();
    let original = "let name = \"old\";\nprintln!(\"{name}\");\n";
    fs::write(dir.path().join("r.rs"), original).unwrap();
    let registry = builtins(dir.path());

    run(&registry, "patch_file", json!({"path": "r.rs", "old_text": "\"old\"", "new_text": "\"new\""}))
        .await
        .unwrap();
    run(&registry, "patch_file", json!({"path": "r.rs", "old_text": "\"new\"", "new_text": "\"old\""}))
        .await
        .unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("r.rs")).unwrap(), original);
}

#[tokio::test]
async fn test_patching_replaced_text_again_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("i.txt"), "color = red").unwrap();
    let registry = builtins(dir.path());

    run(&registry, "multi_patch", json!({"patches": [{"path": "i.txt", "old_text": "red", "new_text": "blue"}]}))
        .await
        .unwrap();
    run(&registry, "multi_patch", json!({"patches": [{"path": "i.txt", "old_text": "blue", "new_text": "green"}]}))
        .await
        .unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("i.txt")).unwrap(), "color = green");
}

// --- multi_patch ---

#[tokio::test]
async fn test_multi_patch_single_success() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("fileA"), "say foo now").unwrap();
    let registry = builtins(dir.path());

    let out = run(
        &registry,
        "multi_patch",
        json!({"patches": [{"path": "fileA", "old_text": "foo", "new_text": "bar"}]}),
    )
    .await
    .unwrap();
    assert!(out.contains("applied all 1 patches"));
    assert!(!out.contains("WARNING"));
    assert_eq!(fs::read_to_string(dir.path().join("fileA")).unwrap(), "say bar now");
}

#[tokio::test]
async fn test_multi_patch_across_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.rs"), "fn old_name() {}\n").unwrap();
    fs::write(dir.path().join("b.rs"), "old_name();\n").unwrap();
    let registry = builtins(dir.path());

    let out = run(
        &registry,
        "multi_patch",
        json!({"patches": [
            {"path": "a.rs", "old_text": "fn old_name", "new_text": "fn new_name"},
            {"path": "b.rs", "old_text": "old_name()", "new_text": "new_name()"}
        ]}),
    )
    .await
    .unwrap();
    assert!(out.starts_with("Successfully applied all 2 patches"));
    assert!(out.contains("1. a.rs"));
    assert!(out.contains("2. b.rs"));
    assert_eq!(fs::read_to_string(dir.path().join("a.rs")).unwrap(), "fn new_name() {}\n");
    assert_eq!(fs::read_to_string(dir.path().join("b.rs")).unwrap(), "new_name();\n");
}

#[tokio::test]
async fn test_multi_patch_rolls_back_on_missing_text() {
    let dir = tempfile::tempdir().unwrap();
    let original_a = "x marks the spot\n";
    fs::write(dir.path().join("fileA"), original_a).unwrap();
    fs::write(dir.path().join("fileB"), "nothing to see\n").unwrap();
    let registry = builtins(dir.path());

    let err = run(
        &registry,
        "multi_patch",
        json!({"patches": [
            {"path": "fileA", "old_text": "x", "new_text": "X"},
            {"path": "fileB", "old_text": "MISSING", "new_text": "y"}
        ]}),
    )
    .await
    .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("FAILED"));
    assert!(msg.contains("fileB"));
    assert!(msg.contains("not found"));
    assert!(msg.contains("Rolling back 1 applied patch(es)"));
    assert!(msg.contains("rollback"));
    assert!(matches!(err, ToolError::Patch(PatchError::Failed { number: 2, .. })));

    let after = fs::read_to_string(dir.path().join("fileA")).unwrap();
    assert_eq!(after, original_a);
    assert!(!after.contains('X'));
}

#[tokio::test]
async fn test_multi_patch_rolls_back_repeated_file() {
    let dir = tempfile::tempdir().unwrap();
    let original = "alpha beta gamma";
    fs::write(dir.path().join("f.txt"), original).unwrap();
    let registry = builtins(dir.path());

    let err = run(
        &registry,
        "multi_patch",
        json!({"patches": [
            {"path": "f.txt", "old_text": "alpha", "new_text": "ALPHA"},
            {"path": "f.txt", "old_text": "beta", "new_text": "BETA"},
            {"path": "f.txt", "old_text": "a", "new_text": "?"}
        ]}),
    )
    .await
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Patch 3/3 FAILED"));
    assert!(msg.contains("unique"));
    assert!(msg.contains("Rolling back 2 applied patch(es)"));
    assert!(msg.contains("Restored: f.txt\n"), "{msg}");
    assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), original);
}

#[test]
fn test_failed_write_is_not_counted_as_applied() {
    // Readable but never writable, even as root.
    let target = Path::new("/proc/version");
    let Ok(content) = fs::read_to_string(target) else {
        eprintln!("/proc/version unavailable, skipping");
        return;
    };
    let Some(needle) = content.split_whitespace().next().map(str::to_string) else {
        return;
    };
    if content.matches(needle.as_str()).count() != 1 {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    let err = apply_batch(
        dir.path(),
        &[
            Patch {
                path: "a.txt".into(),
                old_text: "alpha".into(),
                new_text: "ALPHA".into(),
            },
            Patch {
                path: target.display().to_string(),
                old_text: needle,
                new_text: "X".into(),
            },
        ],
    )
    .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("Patch 2/2 FAILED"), "{msg}");
    assert!(msg.contains("cannot write file"), "{msg}");
    assert!(msg.contains("Rolling back 1 applied patch(es)"), "{msg}");
    assert!(!msg.contains("rollback FAILED"), "{msg}");
    match err {
        PatchError::Failed {
            number,
            reverted,
            restored,
            ..
        } => {
            assert_eq!(number, 2);
            assert_eq!(reverted, 1);
            assert_eq!(restored, vec!["a.txt"]);
        }
        other => panic!("expected a clean rollback, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "alpha");
    assert_eq!(fs::read_to_string(target).unwrap(), content);
}

#[tokio::test]
async fn test_multi_patch_missing_file_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let registry = builtins(dir.path());

    let err = run(
        &registry,
        "multi_patch",
        json!({"patches": [{"path": "ghost.txt", "old_text": "a", "new_text": "b"}]}),
    )
    .await
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("ghost.txt"));
    assert!(msg.contains("nothing to roll back"));
    assert!(!dir.path().join("ghost.txt").exists());
}

#[tokio::test]
async fn test_multi_patch_validation() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "keep").unwrap();
    let registry = builtins(dir.path());

    let empty = run(&registry, "multi_patch", json!({"patches": []})).await.unwrap_err();
    assert!(empty.to_string().contains("at least one patch"));

    let missing_field = run(
        &registry,
        "multi_patch",
        json!({"patches": [{"path": "a.txt", "old_text": "keep"}]}),
    )
    .await
    .unwrap_err();
    assert!(matches!(missing_field, ToolError::InvalidInput { .. }));
    assert!(missing_field.to_string().contains("new_text"));

    // A bad second entry stops the batch before the first is applied.
    let blank = run(
        &registry,
        "multi_patch",
        json!({"patches": [
            {"path": "a.txt", "old_text": "keep", "new_text": "changed"},
            {"path": "a.txt", "old_text": "", "new_text": "x"}
        ]}),
    )
    .await
    .unwrap_err();
    assert!(blank.to_string().contains("patch 2"));
    assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "keep");
}

#[tokio::test]
async fn test_multi_patch_warns_about_uncommitted_changes() {
    let dir = tempfile::tempdir().unwrap();
    let init = tokio::process::Command::new("git")
        .args(["init", "-q"])
        .current_dir(dir.path())
        .status()
        .await;
    if !matches!(init, Ok(status) if status.success()) {
        eprintln!("git unavailable, skipping");
        return;
    }
    fs::write(dir.path().join("dirty.txt"), "old value").unwrap();
    let registry = builtins(dir.path());

    let out = run(
        &registry,
        "multi_patch",
        json!({"patches": [{"path": "dirty.txt", "old_text": "old", "new_text": "new"}]}),
    )
    .await
    .unwrap();
    assert!(out.contains("applied all 1 patches"));
    assert!(out.contains("uncommitted changes"));
    assert!(out.contains("commit"));
}

#[tokio::test]
async fn test_multi_patch_checks_git_in_target_directory() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    fs::create_dir(&repo).unwrap();
    let init = tokio::process::Command::new("git")
        .args(["init", "-q"])
        .current_dir(&repo)
        .status()
        .await;
    if !matches!(init, Ok(status) if status.success()) {
        eprintln!("git unavailable, skipping");
        return;
    }
    fs::write(repo.join("dirty.txt"), "old value").unwrap();
    // The project root itself is not a repository.
    let registry = builtins(dir.path());

    let out = run(
        &registry,
        "multi_patch",
        json!({"patches": [{"path": "repo/dirty.txt", "old_text": "old", "new_text": "new"}]}),
    )
    .await
    .unwrap();
    assert!(out.contains("applied all 1 patches"));
    assert!(out.contains("uncommitted changes"));
}

#[test]
fn test_apply_batch_returns_summary_lines() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("s.txt"), "a\nb\n").unwrap();
    let summary = apply_batch(
        dir.path(),
        &[Patch {
            path: "s.txt".into(),
            old_text: "b\n".into(),
            new_text: "b\nc\n".into(),
        }],
    )
    .unwrap();
    assert_eq!(summary, vec!["  1. s.txt (+1 -0)"]);
}

#[test]
fn test_restore_reports_unwritable_paths() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("ok.txt");
    fs::write(&file, "changed").unwrap();
    let blocked = dir.path().join("blocked");
    fs::create_dir(&blocked).unwrap();

    let undo = vec![
        UndoRecord {
            index: 0,
            path: file.clone(),
            original: "original".into(),
        },
        UndoRecord {
            index: 1,
            path: blocked,
            original: "cannot write over a directory".into(),
        },
    ];
    let (restored, unrestored) = restore(dir.path(), &undo);
    assert_eq!(restored, vec!["ok.txt"]);
    assert_eq!(unrestored.len(), 1);
    assert!(unrestored[0].starts_with("blocked: "));
    assert_eq!(fs::read_to_string(&file).unwrap(), "original");

    let err = PatchError::RollbackFailed {
        number: 3,
        total: 3,
        path: "c.txt".into(),
        reason: "old_text not found in file".into(),
        reverted: 2,
        restored,
        unrestored,
    };
    let msg = err.to_string();
    assert!(msg.contains("Patch 3/3 FAILED on c.txt"));
    assert!(msg.contains("Rolling back 2 applied patch(es)"));
    assert!(msg.contains("rollback FAILED for 1 file(s)"));
    assert!(msg.contains("blocked"));
}

// --- browse ---

mod web {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Test Page</title><style>body { color: red; }</style></head>
<body>
  <script>var hidden = "do not show";</script>
  <h1>Hello World</h1>
  <p>This is a test paragraph &amp; more.</p>
  <ul><li>Item 1</li><li>Item 2</li></ul>
</body>
</html>"#;

    #[test]
    fn test_html_to_text() {
        let text = browse::html_to_text(PAGE);
        assert_eq!(
            text,
            "Hello World\nThis is a test paragraph & more.\nItem 1\nItem 2"
        );
    }

    #[tokio::test]
    async fn test_browse_argument_errors() {
        let registry = builtins(Path::new("."));
        let err = run(&registry, "browse", json!({"url": ""})).await.unwrap_err();
        assert!(err.to_string().contains("url is required"));
        let err = run(&registry, "browse", json!({"url": "ftp://example.com"})).await.unwrap_err();
        assert!(err.to_string().contains("invalid URL format"));
        let err = run(&registry, "browse", json!({"url": "not a url"})).await.unwrap_err();
        assert!(err.to_string().contains("invalid URL format"));
    }

    #[tokio::test]
    async fn test_browse_returns_page_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(PAGE),
            )
            .mount(&server)
            .await;

        let registry = builtins(Path::new("."));
        let out = run(&registry, "browse", json!({"url": format!("{}/page", server.uri())}))
            .await
            .unwrap();
        assert!(out.contains("Hello World"));
        assert!(out.contains("test paragraph"));
        assert!(out.contains("Item 1"));
        assert!(!out.contains("do not show"));
    }

    #[tokio::test]
    async fn test_browse_reports_status_codes() {
        let server = MockServer::start().await;
        Mock::given(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/secret"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let registry = builtins(Path::new("."));
        let err = run(&registry, "browse", json!({"url": format!("{}/missing", server.uri())}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
        let err = run(&registry, "browse", json!({"url": format!("{}/secret", server.uri())}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_browse_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(path("/old"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("{}/new", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Final Page</h1>"))
            .mount(&server)
            .await;

        let registry = builtins(Path::new("."));
        let out = run(&registry, "browse", json!({"url": format!("{}/old", server.uri())}))
            .await
            .unwrap();
        assert!(out.contains("Final Page"));
    }

    #[tokio::test]
    async fn test_browse_empty_page() {
        let server = MockServer::start().await;
        Mock::given(path("/blank"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><head><script>x()</script></head><body></body></html>"),
            )
            .mount(&server)
            .await;

        let registry = builtins(Path::new("."));
        let err = run(&registry, "browse", json!({"url": format!("{}/blank", server.uri())}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no readable content"));
    }

    #[tokio::test]
    async fn test_browse_with_prompt_asks_the_model() {
        let server = MockServer::start().await;
        Mock::given(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let registry = builtins(Path::new("."));
        let client = CannedClient::new("It greets the world.");
        let history = vec![Message::user("what does the page say?")];
        let out = run_with(
            &registry,
            "browse",
            json!({
                "url": format!("{}/page", server.uri()),
                "prompt": "Summarize the page",
                "max_length": 5000
            }),
            &client,
            &history,
        )
        .await
        .unwrap();
        assert_eq!(out, "It greets the world.");

        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Summarize the page"));
        assert!(prompts[0].contains("what does the page say?"));
        assert!(prompts[0].contains("at most 1000 words"));
        assert!(prompts[0].contains("Hello World"));
    }

    // --- web_search ---

    fn search_registry(key: Option<&str>, endpoint: &str) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(web_search::WebSearchTool::with_endpoint(
                key.map(String::from),
                endpoint,
            ))
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_web_search_requires_key_and_query() {
        let registry = search_registry(None, "http://127.0.0.1:9/search");
        let err = run(&registry, "web_search", json!({"query": "rust"})).await.unwrap_err();
        assert!(err.to_string().contains("BRAVE_SEARCH_API_KEY not found"));
        assert!(err.to_string().contains("https://brave.com/search/api/"));

        let registry = search_registry(Some("key"), "http://127.0.0.1:9/search");
        let err = run(&registry, "web_search", json!({"query": "  "})).await.unwrap_err();
        assert!(err.to_string().contains("query is required"));
    }

    #[tokio::test]
    async fn test_web_search_lists_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "tokio runtime"))
            .and(query_param("count", "10"))
            .and(header("X-Subscription-Token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "web": {"results": [
                    {"title": "Tokio", "url": "https://tokio.rs", "description": "An async runtime"},
                    {"title": "Docs", "url": "https://docs.rs/tokio", "description": ""}
                ]}
            })))
            .mount(&server)
            .await;

        let registry = search_registry(Some("secret"), &format!("{}/search", server.uri()));
        let out = run(
            &registry,
            "web_search",
            json!({"query": "tokio runtime", "num_results": 50}),
        )
        .await
        .unwrap();
        assert!(out.starts_with("Found 2 results for 'tokio runtime':"));
        assert!(out.contains("1. Tokio\n   https://tokio.rs\n   An async runtime"));
        assert!(out.contains("2. Docs\n   https://docs.rs/tokio"));
    }

    #[tokio::test]
    async fn test_web_search_api_error() {
        let server = MockServer::start().await;
        Mock::given(path("/search"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let registry = search_registry(Some("k"), &format!("{}/search", server.uri()));
        let err = run(&registry, "web_search", json!({"query": "x"})).await.unwrap_err();
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));
    }
}
