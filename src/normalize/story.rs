use serde_json::{Map, Value};

use super::{as_trimmed, first_key};
use crate::models::{Feature, GivenWhenThen, Story, StoryDescription, StoryPoints};

const GIVEN_KEYS: [&str; 4] = ["given", "Given", "precondition", "context"];
const WHEN_KEYS: [&str; 4] = ["when", "When", "action", "event"];
const THEN_KEYS: [&str; 4] = ["then", "Then", "outcome", "result"];

/// Repair an arbitrary JSON element into a valid [`Story`].
///
/// `fallback` is the feature this story is being generated for; it supplies
/// the feature reference and title used wherever the element is missing or
/// malformed. The returned story's `id` is taken from the element when it is
/// a non-empty string — assigning one otherwise is the caller's job.
pub fn normalize_story(value: &Value, fallback: &Feature) -> Story {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    let feature_id = obj
        .get("featureId")
        .and_then(as_trimmed)
        .unwrap_or_else(|| fallback.reference());

    let feature_title = {
        let t = fallback.title.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    };

    let title = obj.get("title").and_then(as_trimmed).unwrap_or_else(|| {
        format!(
            "Implement {}",
            feature_title.as_deref().unwrap_or("feature")
        )
    });

    let description = normalize_description(obj.get("description"), feature_title.as_deref());

    let criteria_value = ["acceptanceCriteria", "acceptance_criteria", "AC"]
        .iter()
        .find_map(|k| obj.get(*k).filter(|v| !v.is_null()));
    let acceptance_criteria =
        normalize_criteria(criteria_value, feature_title.as_deref().unwrap_or("the feature"));

    let story_points = StoryPoints::coerce(obj.get("storyPoints").unwrap_or(&Value::Null));

    Story {
        id: obj.get("id").and_then(as_trimmed),
        feature_id,
        title,
        description,
        acceptance_criteria,
        story_points,
    }
}

fn normalize_description(value: Option<&Value>, feature_title: Option<&str>) -> StoryDescription {
    let default_goal = || {
        feature_title
            .map(str::to_string)
            .unwrap_or_else(|| "use the feature".to_string())
    };
    match value.and_then(Value::as_object) {
        Some(desc) => StoryDescription {
            as_a: first_key(desc, &["asA", "role"]).unwrap_or_else(|| "end-user".to_string()),
            i_want: first_key(desc, &["iWant", "goal"]).unwrap_or_else(default_goal),
            so_that: first_key(desc, &["soThat", "why"])
                .unwrap_or_else(|| "I get value quickly".to_string()),
        },
        None => StoryDescription {
            as_a: "end-user".to_string(),
            i_want: default_goal(),
            so_that: "I get value quickly".to_string(),
        },
    }
}

fn normalize_criteria(value: Option<&Value>, feature_title: &str) -> Vec<GivenWhenThen> {
    let items: Vec<&Value> = match value {
        Some(v @ Value::Object(_)) => vec![v],
        Some(Value::Array(items)) => items.iter().collect(),
        _ => vec![],
    };

    let normalized: Vec<GivenWhenThen> = items
        .into_iter()
        .filter_map(|item| item.as_object().map(normalize_gwt))
        .collect();

    if !normalized.is_empty() {
        return normalized;
    }

    // Nothing usable came back: synthesize a happy path and a validation path.
    let subject = feature_title.to_lowercase();
    vec![
        GivenWhenThen {
            given: "valid input".to_string(),
            when: format!("I use {}", subject),
            then: "the system completes successfully".to_string(),
        },
        GivenWhenThen {
            given: "invalid input".to_string(),
            when: format!("I use {}", subject),
            then: "a clear validation message is shown".to_string(),
        },
    ]
}

fn normalize_gwt(item: &Map<String, Value>) -> GivenWhenThen {
    GivenWhenThen {
        given: first_key(item, &GIVEN_KEYS).unwrap_or_default(),
        when: first_key(item, &WHEN_KEYS).unwrap_or_default(),
        then: first_key(item, &THEN_KEYS).unwrap_or_default(),
    }
}
