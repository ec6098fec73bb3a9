use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::Feature;

/// The estimation scale every story must use.
pub const POINT_SCALE: [u8; 6] = [1, 2, 3, 5, 8, 13];

/// A user story derived from a [`Feature`].
///
/// `feature_id` is an informal reference back to the originating feature;
/// referential integrity is not enforced. `id` is assigned by the
/// orchestrator when the upstream source did not provide one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    #[serde(default)]
    pub id: Option<String>,
    pub feature_id: String,
    pub title: String,
    pub description: StoryDescription,
    pub acceptance_criteria: Vec<GivenWhenThen>,
    pub story_points: StoryPoints,
}

/// The role/goal/benefit triple of a user story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDescription {
    pub as_a: String,
    pub i_want: String,
    pub so_that: String,
}

/// A single acceptance criterion: precondition, action, expected outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GivenWhenThen {
    pub given: String,
    pub when: String,
    pub then: String,
}

/// Story points restricted to the Fibonacci-like scale {1, 2, 3, 5, 8, 13}.
///
/// Deserialization is strict: any number outside the scale is rejected.
/// Repairing out-of-scale upstream values is the normalizer's job, via
/// [`StoryPoints::coerce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StoryPoints(u8);

/// A number outside the allowed estimation scale.
#[derive(Debug, Error)]
#[error("story points must be one of 1, 2, 3, 5, 8, 13 (got {0})")]
pub struct InvalidStoryPoints(pub i64);

impl StoryPoints {
    /// Default used when upstream data is unparseable.
    pub const DEFAULT: StoryPoints = StoryPoints(3);

    pub fn value(self) -> u8 {
        self.0
    }

    /// Coerce an arbitrary JSON value to the nearest scale value, ties
    /// breaking toward the lower value. Anything unparseable as an integer
    /// (null, floats, free text) becomes [`StoryPoints::DEFAULT`].
    pub fn coerce(value: &Value) -> Self {
        let n = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        let Some(n) = n else {
            return Self::DEFAULT;
        };
        let mut best = POINT_SCALE[0];
        for &candidate in &POINT_SCALE[1..] {
            if (i64::from(candidate) - n).abs() < (i64::from(best) - n).abs() {
                best = candidate;
            }
        }
        StoryPoints(best)
    }

    /// Largest scale value less than or equal to `estimate` (floor 1).
    pub fn from_estimate(estimate: u8) -> Self {
        let floored = POINT_SCALE
            .iter()
            .rev()
            .find(|&&v| v <= estimate)
            .copied()
            .unwrap_or(POINT_SCALE[0]);
        StoryPoints(floored)
    }

    /// The next lower value on the scale, saturating at the smallest.
    pub fn next_lower(self) -> Self {
        let idx = POINT_SCALE.iter().position(|&v| v == self.0).unwrap_or(0);
        StoryPoints(POINT_SCALE[idx.saturating_sub(1)])
    }
}

impl TryFrom<i64> for StoryPoints {
    type Error = InvalidStoryPoints;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        u8::try_from(n)
            .ok()
            .filter(|v| POINT_SCALE.contains(v))
            .map(StoryPoints)
            .ok_or(InvalidStoryPoints(n))
    }
}

impl<'de> Deserialize<'de> for StoryPoints {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let n = i64::deserialize(deserializer)?;
        StoryPoints::try_from(n).map_err(serde::de::Error::custom)
    }
}

/// Body for story generation. `features` absent means "use the session's
/// current features".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoriesRequest {
    #[serde(default)]
    pub features: Option<Vec<Feature>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_passes_scale_values_through() {
        for &v in &POINT_SCALE {
            assert_eq!(StoryPoints::coerce(&json!(v)).value(), v);
        }
    }

    #[test]
    fn coerce_rounds_to_nearest_with_ties_going_lower() {
        // 4 is equidistant from 3 and 5; the lower value wins.
        assert_eq!(StoryPoints::coerce(&json!(4)).value(), 3);
        assert_eq!(StoryPoints::coerce(&json!(6)).value(), 5);
        assert_eq!(StoryPoints::coerce(&json!(7)).value(), 8);
        assert_eq!(StoryPoints::coerce(&json!(100)).value(), 13);
        assert_eq!(StoryPoints::coerce(&json!(0)).value(), 1);
        assert_eq!(StoryPoints::coerce(&json!(-5)).value(), 1);
    }

    #[test]
    fn coerce_accepts_numeric_strings() {
        assert_eq!(StoryPoints::coerce(&json!(" 8 ")).value(), 8);
        assert_eq!(StoryPoints::coerce(&json!("4")).value(), 3);
    }

    #[test]
    fn coerce_defaults_malformed_input_to_three() {
        assert_eq!(StoryPoints::coerce(&Value::Null).value(), 3);
        assert_eq!(StoryPoints::coerce(&json!("a few")).value(), 3);
        assert_eq!(StoryPoints::coerce(&json!(2.5)).value(), 3);
        assert_eq!(StoryPoints::coerce(&json!({"points": 5})).value(), 3);
        assert_eq!(StoryPoints::coerce(&json!(true)).value(), 3);
    }

    #[test]
    fn from_estimate_floors_onto_the_scale() {
        assert_eq!(StoryPoints::from_estimate(2).value(), 2);
        assert_eq!(StoryPoints::from_estimate(4).value(), 3);
        assert_eq!(StoryPoints::from_estimate(5).value(), 5);
        assert_eq!(StoryPoints::from_estimate(0).value(), 1);
    }

    #[test]
    fn next_lower_steps_down_and_saturates() {
        assert_eq!(StoryPoints::from_estimate(5).next_lower().value(), 3);
        assert_eq!(StoryPoints::from_estimate(1).next_lower().value(), 1);
    }

    #[test]
    fn deserialize_rejects_out_of_scale_points() {
        let bad = json!({
            "featureId": "F-1",
            "title": "x",
            "description": {"asA": "a", "iWant": "b", "soThat": "c"},
            "acceptanceCriteria": [],
            "storyPoints": 4
        });
        assert!(serde_json::from_value::<Story>(bad).is_err());
    }

    #[test]
    fn story_round_trips_with_camel_case_wire_names() {
        let story = json!({
            "id": "S-001",
            "featureId": "F-1",
            "title": "Login: happy path",
            "description": {"asA": "end user", "iWant": "to log in", "soThat": "I can work"},
            "acceptanceCriteria": [{"given": "g", "when": "w", "then": "t"}],
            "storyPoints": 5
        });
        let parsed: Story = serde_json::from_value(story.clone()).unwrap();
        assert_eq!(parsed.story_points.value(), 5);
        assert_eq!(serde_json::to_value(&parsed).unwrap(), story);
    }
}
