//! HTTP client for the ticket-tracker search API.
//!
//! Runs a JQL query, keeps only epic-type issues, and maps tracker fields
//! onto [`Feature`] records. Rich-text descriptions arrive as Atlassian
//! Document Format; [`plain_text`] flattens them best-effort (two levels of
//! nested content, text nodes only — lists and headings are ignored).

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::models::Feature;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RESULTS: u32 = 50;

/// Tracker client errors.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for the tracker's JQL search endpoint.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    base_url: String,
    email: String,
    api_token: String,
    client: Client,
}

impl TrackerClient {
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            email: email.into(),
            api_token: api_token.into(),
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Run a JQL query and map the epic-type results to features.
    pub async fn search_epics(&self, jql: &str) -> Result<Vec<Feature>, TrackerError> {
        let url = format!("{}/rest/api/3/search/jql", self.base_url);
        let payload = serde_json::json!({
            "jql": jql,
            "fields": ["summary", "description", "issuetype", "key"],
            "maxResults": MAX_RESULTS,
        });

        tracing::debug!(%url, %jql, "querying tracker");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response.json().await?;
        Ok(extract_epics(&data))
    }
}

/// Pull epic-type issues out of a tracker search response.
fn extract_epics(data: &Value) -> Vec<Feature> {
    let issues = data
        .get("issues")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    issues
        .iter()
        .filter_map(|issue| {
            let fields = issue.get("fields")?;
            let issue_type = fields
                .get("issuetype")
                .and_then(|t| t.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            if !issue_type.eq_ignore_ascii_case("epic") {
                return None;
            }

            Some(Feature {
                id: issue
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                key: issue
                    .get("key")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                title: fields
                    .get("summary")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
                description: plain_text(fields.get("description").unwrap_or(&Value::Null)),
            })
        })
        .collect()
}

/// Best-effort plain text from a tracker description field.
///
/// Plain strings pass through. ADF documents (`{"type": "doc"}`) yield the
/// space-joined text of their first two levels of content nodes; other node
/// kinds and anything deeper are ignored.
pub fn plain_text(description: &Value) -> String {
    if let Some(s) = description.as_str() {
        return s.to_string();
    }

    let is_doc = description.get("type").and_then(Value::as_str) == Some("doc");
    if !is_doc {
        return String::new();
    }

    let mut parts = Vec::new();
    if let Some(nodes) = description.get("content").and_then(Value::as_array) {
        for node in nodes {
            let Some(children) = node.get("content").and_then(Value::as_array) else {
                continue;
            };
            for child in children {
                if child.get("type").and_then(Value::as_str) == Some("text") {
                    if let Some(text) = child.get("text").and_then(Value::as_str) {
                        parts.push(text);
                    }
                }
            }
        }
    }
    parts.join(" ")
}
