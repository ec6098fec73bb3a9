use serde_json::{Map, Value};

use super::{as_trimmed, stringify_element};
use crate::models::TestCase;

/// Repair an arbitrary JSON element into a valid [`TestCase`].
///
/// `fallback_story_id` links the test back to a story when the element does
/// not carry a usable `storyId` of its own.
pub fn normalize_testcase(value: &Value, fallback_story_id: &str) -> TestCase {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    // steps: a bare string is one step; anything that isn't a list is none.
    let steps: Vec<String> = match obj.get("steps") {
        Some(Value::String(s)) => {
            let t = s.trim();
            if t.is_empty() {
                vec![]
            } else {
                vec![t.to_string()]
            }
        }
        Some(Value::Array(items)) => items.iter().filter_map(stringify_element).collect(),
        _ => vec![],
    };

    // expected: never a list after this point.
    let expected = match obj.get("expected") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(stringify_element)
            .collect::<Vec<_>>()
            .join(" "),
        Some(Value::Null) | None => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    };

    let preconditions = match obj.get("preconditions") {
        Some(Value::Null) | None => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    };

    let story_id = obj
        .get("storyId")
        .and_then(as_trimmed)
        .or_else(|| {
            let t = fallback_story_id.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .unwrap_or_else(|| "S".to_string());

    let id = match obj.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => format!("TC-{}-{}", story_id, steps.len().max(1)),
    };

    TestCase {
        id,
        story_id,
        preconditions,
        steps,
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_string_step_and_list_expected_are_reshaped() {
        let test = normalize_testcase(
            &json!({"steps": "click button", "expected": ["ok", "done"], "preconditions": null}),
            "S-001",
        );

        assert_eq!(test.steps, vec!["click button"]);
        assert_eq!(test.expected, "ok done");
        assert_eq!(test.preconditions, "");
        assert_eq!(test.story_id, "S-001");
        assert_eq!(test.id, "TC-S-001-1");
    }

    #[test]
    fn empty_object_still_yields_a_complete_test_case() {
        let test = normalize_testcase(&json!({}), "S-002");

        assert!(test.steps.is_empty());
        assert_eq!(test.expected, "");
        assert_eq!(test.preconditions, "");
        assert_eq!(test.story_id, "S-002");
        // Step count floors at 1 for id synthesis even with no steps.
        assert_eq!(test.id, "TC-S-002-1");
    }

    #[test]
    fn steps_are_trimmed_and_empty_entries_dropped() {
        let test = normalize_testcase(
            &json!({"steps": ["  open page  ", "", "   ", null, 5]}),
            "S-003",
        );
        assert_eq!(test.steps, vec!["open page", "5"]);
        assert_eq!(test.id, "TC-S-003-2");
    }

    #[test]
    fn non_list_non_string_steps_become_empty() {
        let test = normalize_testcase(&json!({"steps": {"first": "x"}}), "S-004");
        assert!(test.steps.is_empty());
    }

    #[test]
    fn provided_ids_win_when_non_empty_strings() {
        let test = normalize_testcase(
            &json!({"id": " T-9 ", "storyId": " S-9 ", "steps": ["a"]}),
            "S-001",
        );
        assert_eq!(test.id, "T-9");
        assert_eq!(test.story_id, "S-9");

        let synthesized = normalize_testcase(&json!({"id": 42, "steps": ["a"]}), "S-001");
        assert_eq!(synthesized.id, "TC-S-001-1");
    }

    #[test]
    fn blank_fallback_story_id_defaults_to_literal() {
        let test = normalize_testcase(&json!({}), "  ");
        assert_eq!(test.story_id, "S");
    }

    #[test]
    fn normalizing_a_valid_test_case_is_idempotent() {
        let first = normalize_testcase(
            &json!({
                "id": "T-001",
                "storyId": "S-001",
                "preconditions": "logged in",
                "steps": ["open", "click"],
                "expected": "it works"
            }),
            "S-001",
        );
        let again = normalize_testcase(&serde_json::to_value(&first).unwrap(), "S-001");
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&again).unwrap()
        );
    }
}
