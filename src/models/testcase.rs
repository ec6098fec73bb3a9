use serde::{Deserialize, Serialize};

use super::Story;

/// A manual test case derived from a [`Story`].
///
/// `steps` is execution-ordered; `expected` is always a single string, never
/// a list — upstream sources that return a list of expectations are joined
/// by the normalizer before a `TestCase` is ever constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    /// Informal reference to the originating story.
    pub story_id: String,
    pub preconditions: String,
    pub steps: Vec<String>,
    pub expected: String,
}

/// Body for test generation. `stories` absent means "use the session's
/// current stories".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestsRequest {
    #[serde(default)]
    pub stories: Option<Vec<Story>>,
}
