//! Shared application state: one in-memory session plus the collaborator
//! clients.
//!
//! The session holds the accumulated features/stories/tests and the
//! diagnostics from the most recent generation call. Each ingest or
//! generation replaces its slice of the session wholesale. The mutex makes
//! individual reads and writes consistent; requests racing across whole
//! generation calls is an accepted limitation, not a guaranteed-safe design.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::generate::{Engine, Generation};
use crate::llm::GeminiClient;
use crate::models::{Feature, Story, TestCase};
use crate::tracker::TrackerClient;

/// Everything a handler needs: config, collaborator clients, session.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    llm: Option<GeminiClient>,
    tracker: Option<TrackerClient>,
    session: Arc<Mutex<Session>>,
}

/// One generation session. Created at startup, discarded on restart.
#[derive(Debug)]
struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    features: Vec<Feature>,
    stories: Vec<Story>,
    tests: Vec<TestCase>,
    engine: Option<Engine>,
    last_error: Option<String>,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            features: Vec::new(),
            stories: Vec::new(),
            tests: Vec::new(),
            engine: None,
            last_error: None,
        }
    }
}

/// Serializable view of the whole session, used by the export endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub features: Vec<Feature>,
    pub stories: Vec<Story>,
    pub tests: Vec<TestCase>,
}

/// Diagnostics from the most recent generation call.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub engine: Option<Engine>,
    pub error: Option<String>,
}

impl AppState {
    /// Build state from a config, constructing clients for whichever
    /// collaborators are configured.
    pub fn new(config: Config) -> Self {
        let llm = config
            .gemini_api_key
            .as_ref()
            .map(|key| GeminiClient::new(key, config.gemini_model.clone()));
        let tracker = config.tracker.as_ref().map(|t| {
            TrackerClient::new(t.base_url.clone(), t.email.clone(), t.api_token.clone())
        });

        Self {
            config,
            llm,
            tracker,
            session: Arc::new(Mutex::new(Session::new())),
        }
    }

    /// Replace the LLM client (tests inject one pointed at an unreachable
    /// address to exercise the fallback path).
    pub fn with_llm(mut self, client: GeminiClient) -> Self {
        self.llm = Some(client);
        self
    }

    pub fn llm(&self) -> Option<&GeminiClient> {
        self.llm.as_ref()
    }

    pub fn tracker(&self) -> Option<&TrackerClient> {
        self.tracker.as_ref()
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().expect("session lock poisoned")
    }

    pub fn replace_features(&self, features: Vec<Feature>) {
        self.lock().features = features;
    }

    pub fn features(&self) -> Vec<Feature> {
        self.lock().features.clone()
    }

    pub fn stories(&self) -> Vec<Story> {
        self.lock().stories.clone()
    }

    /// Store a story generation outcome: items plus diagnostics.
    pub fn record_stories(&self, generation: &Generation<Story>) {
        let mut session = self.lock();
        session.stories = generation.items.clone();
        session.engine = Some(generation.engine);
        session.last_error = generation.error.clone();
    }

    /// Store a test generation outcome: items plus diagnostics.
    pub fn record_tests(&self, generation: &Generation<TestCase>) {
        let mut session = self.lock();
        session.tests = generation.items.clone();
        session.engine = Some(generation.engine);
        session.last_error = generation.error.clone();
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let session = self.lock();
        Diagnostics {
            engine: session.engine,
            error: session.last_error.clone(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.lock();
        SessionSnapshot {
            session_id: session.id,
            started_at: session.started_at,
            features: session.features.clone(),
            stories: session.stories.clone(),
            tests: session.tests.clone(),
        }
    }
}
