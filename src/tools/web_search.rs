//! Web search tool backed by the Brave Search API.

use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};

use super::browse::http_client;
use super::{Tool, ToolContext, ToolError};
use crate::constants::{
    BRAVE_API_KEY_ENV, BRAVE_SEARCH_URL, WEB_SEARCH_DEFAULT_RESULTS, WEB_SEARCH_MAX_RESULTS,
};

pub struct WebSearchTool {
    api_key: Option<String>,
    endpoint: String,
}

impl WebSearchTool {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_endpoint(api_key, BRAVE_SEARCH_URL)
    }

    /// Point the tool at a different search endpoint.
    pub fn with_endpoint(api_key: Option<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Deserialize)]
pub struct WebSearchInput {
    query: String,
    #[serde(default)]
    num_results: Option<i64>,
}

impl WebSearchInput {
    /// Requested result count, defaulted and clamped to the API's range.
    pub fn num_results(&self) -> u64 {
        match self.num_results {
            None | Some(0) => WEB_SEARCH_DEFAULT_RESULTS,
            Some(n) => n.clamp(1, WEB_SEARCH_MAX_RESULTS as i64) as u64,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

fn format_results(query: &str, results: &[BraveResult]) -> String {
    if results.is_empty() {
        return format!("No results found for '{query}'.");
    }
    let mut out = format!("Found {} results for '{query}':\n", results.len());
    for (i, r) in results.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n   {}\n", i + 1, r.title, r.url));
        if !r.description.is_empty() {
            out.push_str(&format!("   {}\n", r.description));
        }
    }
    out.trim_end().to_string()
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    type Input = WebSearchInput;

    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web and return the top results with title, URL and description. Use browse to read a result in full."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 5, max 10)"
                }
            },
            "required": ["query"]
        })
    }

    fn display(&self, input: &WebSearchInput) -> Option<String> {
        Some(format!("→ Searching the web: {}", input.query))
    }

    async fn execute(&self, input: WebSearchInput, _ctx: &ToolContext<'_>) -> Result<String, ToolError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ToolError::failed(format!(
                "{BRAVE_API_KEY_ENV} not found. Get an API key at https://brave.com/search/api/ \
and set it in your environment, .env file, or [tools] brave_api_key in the config."
            )));
        };
        let query = input.query.trim();
        if query.is_empty() {
            return Err(ToolError::failed("query is required"));
        }

        let count = input.num_results().to_string();
        let url = Url::parse_with_params(&self.endpoint, &[("q", query), ("count", count.as_str())])
            .map_err(|e| ToolError::failed(format!("invalid search endpoint: {e}")))?;

        let response = http_client()?
            .get(url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key)
            .send()
            .await
            .map_err(|e| ToolError::failed(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::failed(format!(
                "search API returned {status}: {}",
                body.trim()
            )));
        }

        let parsed: BraveResponse = response
            .json()
            .await
            .map_err(|e| ToolError::failed(format!("failed to parse search response: {e}")))?;

        let results = parsed.web.map(|w| w.results).unwrap_or_default();
        tracing::debug!(query, results = results.len(), "web search complete");
        Ok(format_results(query, &results))
    }
}
