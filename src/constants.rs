//! Centralized constants for tern.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "tern";

/// Default LLM model identifier.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// Maximum tokens for LLM completions.
pub const MAX_TOKENS: u64 = 4096;

/// Default system prompt sent with every model call.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are tern, a helpful AI coding assistant in the terminal. \
You can inspect and change the user's project with tools: list_files, read_file, write_file, \
patch_file, multi_patch, run_bash, grep, glob, browse and web_search.

Use a tool whenever the question is about files, code, the shell or the web; answer \
directly otherwise. Read a file before patching it. Prefer patch_file for a single \
targeted edit and multi_patch for coordinated edits across several files (for example \
renames): multi_patch applies all patches or none. Use write_file only to create files \
or replace them entirely. If a tool reports an error, read the message and adjust your \
next call instead of repeating it unchanged.

Be concise. Use code blocks with language tags when showing code.";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "tern.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

/// Dotenv filename searched in the working and config directories.
pub const ENV_FILENAME: &str = ".env";

/// Environment variable naming an explicit dotenv file.
pub const ENV_PATH_VAR: &str = "ENV_PATH";

/// Default LLM model identifier for OpenAI.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1";

/// Default LLM model identifier for OpenRouter.
pub const DEFAULT_OPENROUTER_MODEL: &str = "anthropic/claude-sonnet-4.5";

/// Default base URL for local Ollama server.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default LLM model identifier for Ollama.
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3";

/// Default provider when none is configured.
pub const DEFAULT_PROVIDER: &str = "anthropic";

// --- Tool limits ---

/// Maximum file size (bytes) the read_file tool will read.
pub const READ_FILE_MAX_SIZE: u64 = 100 * 1024;

/// Byte threshold for binary file detection (check first N bytes for null).
pub const BINARY_DETECTION_BYTES: usize = 8192;

/// Maximum number of results the glob tool returns.
pub const GLOB_MAX_RESULTS: usize = 1000;

/// Maximum number of matching lines the grep tool returns.
pub const GREP_MAX_MATCHES: usize = 100;

/// Default timeout for run_bash commands.
pub const BASH_DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum bytes of combined stdout/stderr kept from a run_bash command.
pub const BASH_MAX_OUTPUT_SIZE: usize = 30_000;

/// Context lines around each change in patch diffs.
pub const DIFF_CONTEXT_LINES: usize = 3;

// --- Web tools ---

/// Default answer length (words) when browse is given a prompt.
pub const BROWSE_DEFAULT_MAX_LENGTH: u64 = 500;

/// Upper bound on browse's `max_length`.
pub const BROWSE_MAX_LENGTH_CAP: u64 = 1000;

/// Characters of page text returned (or summarized) by browse.
pub const BROWSE_MAX_CONTENT_CHARS: usize = 50_000;

/// Request timeout for browse and web_search.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// User agent sent by the web tools.
pub const HTTP_USER_AGENT: &str = concat!("tern/", env!("CARGO_PKG_VERSION"));

/// System prompt for browse's secondary model call.
pub const BROWSE_SYSTEM_PROMPT: &str = "You extract information from web pages. \
Answer the task using only the page content provided. If the page does not contain \
the answer, say so plainly.";

/// Brave Search web endpoint.
pub const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Environment variable holding the Brave Search subscription token.
pub const BRAVE_API_KEY_ENV: &str = "BRAVE_SEARCH_API_KEY";

/// Default number of web_search results.
pub const WEB_SEARCH_DEFAULT_RESULTS: u64 = 5;

/// Upper bound on web_search results.
pub const WEB_SEARCH_MAX_RESULTS: u64 = 10;
