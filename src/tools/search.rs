use super::{Tool, str_arg};
use crate::gemini::GeminiClient;
use crate::gemini::types::{GenerateContentRequest, WireContent, WireTool};
use crate::runtime::Content;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

/// Web search through a Gemini model grounded with Google Search.
pub struct GoogleSearchTool {
    client: Arc<GeminiClient>,
    model: String,
}

impl GoogleSearchTool {
    pub fn new(client: Arc<GeminiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Run one grounded query. Errors come back as text, never as `Err`.
    pub async fn search(&self, query: &str, fallback: Option<&str>) -> String {
        let query = query.trim();
        if query.is_empty() {
            return "Error: missing 'query' for google_search.".to_string();
        }

        let request = GenerateContentRequest {
            contents: vec![WireContent::from(&Content::user_text(query))],
            system_instruction: None,
            tools: vec![WireTool::google_search()],
        };
        let response = match self.client.generate_content(&self.model, &request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(query, error = %e, "google search failed");
                return format!("Google Search error: {}", e);
            }
        };

        let parts: Vec<&str> = response
            .first_content()
            .into_iter()
            .flat_map(|content| content.parts.iter())
            .filter(|part| part.thought != Some(true))
            .filter_map(|part| part.text.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect();

        if !parts.is_empty() {
            return parts.join("\n\n");
        }
        match fallback.map(str::trim).filter(|f| !f.is_empty()) {
            Some(fallback) => fallback.to_string(),
            None => format!("No search results or empty response for query: {}", query),
        }
    }
}

#[async_trait]
impl Tool for GoogleSearchTool {
    fn name(&self) -> &'static str {
        "google_search"
    }

    fn description(&self) -> &'static str {
        "Searches the web with Google and returns a grounded summary of the results."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Search query."},
                "fallback_summary": {"type": "string", "description": "Text to return when nothing is found."}
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: &Value) -> String {
        let fallback = str_arg(args, "fallback_summary");
        self.search(str_arg(args, "query"), Some(fallback)).await
    }
}
