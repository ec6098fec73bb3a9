//! HTTP client for the Gemini text-generation API.
//!
//! The collaborator enforces no output schema: responses are free-form text
//! that usually contains a JSON array, often wrapped in Markdown code
//! fences. This client extracts the text, strips any fencing, and parses it
//! as JSON — everything beyond "is this valid JSON" is the normalizers'
//! problem.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

/// Default model when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// LLM client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned no text")]
    EmptyResponse,

    #[error("model returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Override the API base URL. Tests point this at an unreachable
    /// address to exercise the fallback path.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send a system instruction plus a JSON payload and parse the reply as
    /// JSON. Any transport failure, empty reply, or unparseable text is an
    /// error; the caller decides what recovery looks like.
    pub async fn generate_json(&self, system: &str, user: &str) -> Result<Value, LlmError> {
        let prompt = format!("{system}\n\nUSER INPUT:\n{user}\n\nReturn ONLY valid JSON (no markdown).");
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{"parts": [{"text": prompt}]}]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: Value = response.json().await?;
        let text = extract_text(&payload).ok_or(LlmError::EmptyResponse)?;
        let stripped = strip_code_fences(&text);
        if stripped.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(serde_json::from_str(stripped)?)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Strip Markdown code-fence wrapping (```json … ``` or ``` … ```) from a
/// model reply, returning the trimmed inner text.
pub fn strip_code_fences(text: &str) -> &str {
    let mut t = text.trim();
    if t.starts_with("```") {
        t = t
            .strip_prefix("```json")
            .or_else(|| t.strip_prefix("```"))
            .unwrap_or(t);
        t = t.strip_suffix("```").unwrap_or(t);
        t = t.trim();
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_json_fences() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences("  [1, 2]  "), "[1, 2]");
        assert_eq!(strip_code_fences("plain text"), "plain text");
    }

    #[test]
    fn extracts_candidate_text_parts() {
        let payload = json!({
            "candidates": [{
                "content": {"parts": [{"text": "[{\"a\""}, {"text": ": 1}]"}]}
            }]
        });
        assert_eq!(extract_text(&payload).as_deref(), Some("[{\"a\": 1}]"));
    }

    #[test]
    fn missing_or_blank_candidates_yield_none() {
        assert_eq!(extract_text(&json!({})), None);
        let blank = json!({"candidates": [{"content": {"parts": [{"text": "   "}]}}]});
        assert_eq!(extract_text(&blank), None);
    }
}
