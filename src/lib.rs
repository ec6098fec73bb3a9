//! storygen: a backend service that turns product features into user
//! stories and manual test cases.
//!
//! Ingestion pulls features from a ticket tracker or an uploaded JSON
//! document. Generation prefers a hosted LLM, repairs whatever JSON it
//! returns into strict domain records, and falls back to deterministic
//! rule-based generators whenever the AI path is unavailable or fails.
//! Accumulated state is in-memory only and exported as JSON or Markdown.

pub mod api;
pub mod baseline;
pub mod config;
pub mod export;
pub mod generate;
pub mod llm;
pub mod models;
pub mod normalize;
pub mod state;
pub mod tracker;
