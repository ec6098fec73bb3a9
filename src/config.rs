//! Service configuration loaded from environment variables.
//!
//! Both collaborators are optional: a missing tracker configuration makes
//! tracker ingestion fail with a structured error, and a missing LLM key
//! routes generation straight to the baseline path.

use serde_json::Value;

use crate::llm;

/// Tracker credentials (from `JIRA_BASE_URL` / `JIRA_EMAIL` /
/// `JIRA_API_TOKEN`). Present only when all three variables are set.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub tracker: Option<TrackerConfig>,
    /// LLM API key (from `GEMINI_API_KEY`).
    pub gemini_api_key: Option<String>,
    /// Model name (from `GEMINI_MODEL`, defaulted).
    pub gemini_model: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let tracker = match (
            non_empty_var("JIRA_BASE_URL"),
            non_empty_var("JIRA_EMAIL"),
            non_empty_var("JIRA_API_TOKEN"),
        ) {
            (Some(base_url), Some(email), Some(api_token)) => Some(TrackerConfig {
                base_url,
                email,
                api_token,
            }),
            _ => None,
        };

        Self {
            tracker,
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_model: non_empty_var("GEMINI_MODEL")
                .unwrap_or_else(|| llm::DEFAULT_MODEL.to_string()),
        }
    }

    /// A config with no collaborators (for local development/testing).
    pub fn disabled() -> Self {
        Self {
            tracker: None,
            gemini_api_key: None,
            gemini_model: llm::DEFAULT_MODEL.to_string(),
        }
    }

    /// A config with only the LLM key set (for testing).
    pub fn with_gemini_key(key: impl Into<String>) -> Self {
        Self {
            gemini_api_key: Some(key.into()),
            ..Self::disabled()
        }
    }

    /// Masked view of the configuration for the config-check endpoint.
    /// Secrets are never shown in full.
    pub fn summary(&self) -> Value {
        serde_json::json!({
            "JIRA_BASE_URL": self.tracker.as_ref().map(|t| t.base_url.clone()),
            "JIRA_EMAIL": self.tracker.as_ref().map(|t| t.email.clone()),
            "JIRA_API_TOKEN": self.tracker.as_ref().map(|t| mask(&t.api_token)),
            "GEMINI_API_KEY": self.gemini_api_key.as_deref().map(mask),
            "GEMINI_MODEL": self.gemini_model,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Mask a secret: long values keep their first and last four characters,
/// short ones are hidden entirely.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.trim().chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "********".to_string()
    }
}
