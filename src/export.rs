//! Markdown rendering for the export endpoint.

use crate::models::Story;

/// Render a Markdown summary of the session's stories: one heading per
/// story with its role/goal/benefit sentence.
pub fn markdown_summary(stories: &[Story]) -> String {
    let mut lines = vec!["# Generated Stories & Tests".to_string(), String::new()];
    for story in stories {
        lines.push(format!(
            "## {} - {}",
            story.id.as_deref().unwrap_or(""),
            story.title
        ));
        lines.push(format!(
            "As a {}, I want {} so that {}.",
            story.description.as_a, story.description.i_want, story.description.so_that
        ));
    }
    lines.join("\n")
}
