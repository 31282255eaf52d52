use async_trait::async_trait;
use parley_config::SearchSettings;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{Tool, ToolError};

/// Fixed search behaviour for the Tavily tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub search_depth: String,
    pub max_results: u32,
    pub include_answer: bool,
    pub include_raw_content: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search_depth: "advanced".to_string(),
            max_results: 3,
            include_answer: true,
            include_raw_content: false,
        }
    }
}

/// Web search tool using the Tavily API.
pub struct WebSearchTool {
    api_key: String,
    endpoint: String,
    options: SearchOptions,
    client: reqwest::Client,
}

impl WebSearchTool {
    /// Builds the tool, failing when no API key is configured.
    pub fn new(settings: &SearchSettings, options: SearchOptions) -> Result<Self, ToolError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| ToolError::Configuration("TAVILY_API_KEY is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ToolError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            endpoint: format!("{}/search", settings.api_url.trim_end_matches('/')),
            options,
            client,
        })
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

fn format_results(response: &TavilyResponse) -> String {
    let mut output = String::new();

    if let Some(answer) = &response.answer {
        output.push_str(&format!("**Summary:** {}\n\n", answer));
    }

    output.push_str("**Search Results:**\n\n");

    for (i, result) in response.results.iter().enumerate() {
        output.push_str(&format!(
            "{}. **{}**\n   URL: {}\n   {}\n\n",
            i + 1,
            result.title,
            result.url,
            result.content
        ));
    }

    output
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information. Returns a short synthesized answer followed by the top results with titles, URLs, and content snippets."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' parameter".to_string()))?;

        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            search_depth: &self.options.search_depth,
            max_results: self.options.max_results,
            include_answer: self.options.include_answer,
            include_raw_content: self.options.include_raw_content,
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::ExecutionFailed(format!(
                "Tavily API error: {} - {}",
                status, body
            )));
        }

        let tavily_response: TavilyResponse = response.json().await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Failed to parse Tavily response: {}", e))
        })?;

        Ok(format_results(&tavily_response))
    }
}
