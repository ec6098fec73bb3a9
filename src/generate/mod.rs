//! Generation orchestration: try the LLM, fall back to the baseline.
//!
//! Each request is a two-branch outcome. The AI branch builds a prompt,
//! calls the model, and repairs its output into valid records; if anything
//! along that path fails — transport, empty reply, bad JSON — the whole
//! batch is regenerated by the deterministic baseline and the triggering
//! error is kept for diagnostics. There is no partial-success merging.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::baseline;
use crate::llm::{GeminiClient, LlmError};
use crate::models::{Feature, Story, TestCase};
use crate::normalize::{normalize_story, normalize_testcase};

/// Which path produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Ai,
    Fallback,
}

/// Outcome of one generation request: the items, the path that produced
/// them, and the error that forced the fallback (if one did).
#[derive(Debug, Clone)]
pub struct Generation<T> {
    pub items: Vec<T>,
    pub engine: Engine,
    pub error: Option<String>,
}

impl<T> Generation<T> {
    fn ai(items: Vec<T>) -> Self {
        Self {
            items,
            engine: Engine::Ai,
            error: None,
        }
    }

    fn fallback(items: Vec<T>, error: Option<String>) -> Self {
        Self {
            items,
            engine: Engine::Fallback,
            error,
        }
    }
}

const STORY_PROMPT: &str = "You are an Agile Business Analyst. \
    Convert each FEATURE into 1-3 user stories with title, \
    description {asA,iWant,soThat}, 2-4 acceptanceCriteria items \
    {given,when,then}, and storyPoints in {1,2,3,5,8,13}. \
    Return ONLY a JSON array (no markdown, no explanations).";

const TEST_PROMPT: &str = "You are a QA Engineer. Generate 2-3 manual test \
    cases per story with: id, storyId, preconditions, steps[], expected \
    (expected MUST be a single string). \
    Return ONLY a JSON array (no markdown, no explanations).";

/// Generate stories from features, preferring the LLM when configured.
pub async fn generate_stories(
    llm: Option<&GeminiClient>,
    features: &[Feature],
) -> Generation<Story> {
    let Some(client) = llm else {
        return Generation::fallback(baseline::stories_from_features(features), None);
    };

    match ai_stories(client, features).await {
        Ok(stories) => Generation::ai(stories),
        Err(e) => {
            tracing::warn!(error = %e, "story generation fell back to baseline");
            Generation::fallback(baseline::stories_from_features(features), Some(e.to_string()))
        }
    }
}

/// Generate test cases from stories, preferring the LLM when configured.
pub async fn generate_tests(
    llm: Option<&GeminiClient>,
    stories: &[Story],
) -> Generation<TestCase> {
    let Some(client) = llm else {
        return Generation::fallback(baseline::tests_from_stories(stories), None);
    };

    match ai_tests(client, stories).await {
        Ok(tests) => Generation::ai(tests),
        Err(e) => {
            tracing::warn!(error = %e, "test generation fell back to baseline");
            Generation::fallback(baseline::tests_from_stories(stories), Some(e.to_string()))
        }
    }
}

async fn ai_stories(client: &GeminiClient, features: &[Feature]) -> Result<Vec<Story>, LlmError> {
    let payload = serde_json::to_string(features)?;
    let raw = client
        .generate_json(STORY_PROMPT, &format!("FEATURES_JSON:\n{payload}"))
        .await?;
    Ok(stories_from_response(raw, features))
}

async fn ai_tests(client: &GeminiClient, stories: &[Story]) -> Result<Vec<TestCase>, LlmError> {
    let payload = serde_json::to_string(stories)?;
    let raw = client
        .generate_json(TEST_PROMPT, &format!("STORIES_JSON:\n{payload}"))
        .await?;
    Ok(tests_from_response(raw, stories))
}

/// Shape a model reply into individually-processable elements: a bare
/// object is a one-element batch, anything that isn't a list or object is
/// an empty one.
fn coerce_to_list(raw: Value) -> Vec<Value> {
    match raw {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        _ => vec![],
    }
}

/// Turn a model reply into valid stories.
///
/// Each element is first decoded strictly; elements the strict decode
/// rejects go through the repair path instead. Ids missing from the output
/// are assigned sequentially, and an empty feature reference is refilled
/// from the first input feature.
pub fn stories_from_response(raw: Value, features: &[Feature]) -> Vec<Story> {
    let fallback = features.first().cloned().unwrap_or_default();

    coerce_to_list(raw)
        .into_iter()
        .enumerate()
        .map(|(i, element)| {
            let mut story = serde_json::from_value::<Story>(element.clone())
                .unwrap_or_else(|_| normalize_story(&element, &fallback));
            if story.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
                story.id = Some(format!("S-{:03}", i + 1));
            }
            if story.feature_id.trim().is_empty() {
                story.feature_id = fallback.reference();
            }
            story
        })
        .collect()
}

/// Turn a model reply into valid test cases, linking orphans to the first
/// input story.
pub fn tests_from_response(raw: Value, stories: &[Story]) -> Vec<TestCase> {
    let fallback_story_id = stories
        .first()
        .and_then(|s| s.id.clone())
        .unwrap_or_else(|| "S".to_string());

    coerce_to_list(raw)
        .into_iter()
        .map(|element| {
            serde_json::from_value::<TestCase>(element.clone())
                .unwrap_or_else(|_| normalize_testcase(&element, &fallback_story_id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn features() -> Vec<Feature> {
        vec![Feature {
            id: "F-1".to_string(),
            key: None,
            title: "Search".to_string(),
            description: String::new(),
        }]
    }

    #[test]
    fn bare_object_reply_becomes_a_one_story_batch() {
        let stories = stories_from_response(json!({"title": "Search by name"}), &features());

        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].id.as_deref(), Some("S-001"));
        assert_eq!(stories[0].title, "Search by name");
        assert_eq!(stories[0].feature_id, "F-1");
    }

    #[test]
    fn non_json_container_replies_become_empty_batches() {
        assert!(stories_from_response(json!("sorry, no"), &features()).is_empty());
        assert!(stories_from_response(json!(42), &features()).is_empty());
        assert!(tests_from_response(Value::Null, &[]).is_empty());
    }

    #[test]
    fn valid_elements_survive_strict_decoding_unchanged() {
        let reply = json!([{
            "id": "S-9",
            "featureId": "F-1",
            "title": "Search by name",
            "description": {"asA": "user", "iWant": "to search", "soThat": "I find things"},
            "acceptanceCriteria": [{"given": "g", "when": "w", "then": "t"}],
            "storyPoints": 8
        }]);

        let stories = stories_from_response(reply, &features());
        assert_eq!(stories[0].id.as_deref(), Some("S-9"));
        assert_eq!(stories[0].story_points.value(), 8);
    }

    #[test]
    fn invalid_elements_are_repaired_not_dropped() {
        let reply = json!([
            {"title": "ok", "storyPoints": 4},
            "garbage",
        ]);

        let stories = stories_from_response(reply, &features());
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].story_points.value(), 3);
        assert_eq!(stories[1].title, "Implement Search");
        assert_eq!(stories[1].id.as_deref(), Some("S-002"));
    }

    #[test]
    fn tests_inherit_the_first_story_id_when_orphaned() {
        let stories = crate::baseline::stories_from_features(&features());
        let tests = tests_from_response(json!([{"steps": "click"}]), &stories);

        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].story_id, "S-001");
    }

    #[tokio::test]
    async fn no_client_means_baseline_with_no_error_recorded() {
        let input = features();
        let generation = generate_stories(None, &input).await;

        assert_eq!(generation.engine, Engine::Fallback);
        assert!(generation.error.is_none());
        assert_eq!(
            generation.items.len(),
            crate::baseline::stories_from_features(&input).len()
        );
    }

    #[tokio::test]
    async fn unreachable_client_falls_back_and_records_the_error() {
        // Nothing listens on the discard port; the request fails fast.
        let client = GeminiClient::new("test-key", "test-model")
            .with_base_url("http://127.0.0.1:9/v1beta");
        let input = features();

        let generation = generate_stories(Some(&client), &input).await;

        assert_eq!(generation.engine, Engine::Fallback);
        assert!(generation.error.is_some());
        assert_eq!(
            generation.items.len(),
            crate::baseline::stories_from_features(&input).len()
        );
    }

    #[test]
    fn engine_serializes_to_lowercase_labels() {
        assert_eq!(serde_json::to_value(Engine::Ai).unwrap(), json!("ai"));
        assert_eq!(serde_json::to_value(Engine::Fallback).unwrap(), json!("fallback"));
    }
}
