use serde::{Deserialize, Serialize};

/// A high-level requirement item ingested from an external source.
///
/// Features are immutable once created and live for one generation session:
/// each ingest call replaces the session's feature set wholesale. The `id`
/// may be empty for hand-written uploads; the normalizers and baseline
/// generators fall back through `id` → `key` → `title` when they need a
/// non-empty reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feature {
    /// Tracker-assigned id. May be empty for uploaded features.
    #[serde(default)]
    pub id: String,
    /// External tracker identifier (e.g. "PROJ-42"), if the feature came
    /// from the tracker.
    #[serde(default)]
    pub key: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Feature {
    /// Best available non-empty reference for linking stories back to this
    /// feature: id, then tracker key, then title, then the literal "F".
    pub fn reference(&self) -> String {
        non_empty(&self.id)
            .or_else(|| self.key.as_deref().and_then(non_empty))
            .or_else(|| non_empty(&self.title))
            .unwrap_or_else(|| "F".to_string())
    }
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Body for tracker ingestion: a JQL query to run against the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerIngestInput {
    pub jql: String,
}

/// Body for direct ingestion: a JSON document with a `features` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadInput {
    pub features: Vec<Feature>,
}
