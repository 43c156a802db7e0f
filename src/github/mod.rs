pub mod client;
pub mod normalize;

pub use client::GitHubClient;

use crate::error::Result;
use crate::model::Event;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use normalize::{normalize_events, RawEvent};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FetchMode {
    /// Push events from the user's public activity feed, dated by push time.
    Events,
    /// Commits authored by the user across their own repositories, dated by authorship.
    Commits,
}

/// Anything that can produce the user's recent activity.
pub trait ActivitySource {
    fn fetch(&self, username: &str, since: DateTime<Utc>) -> Result<Vec<Event>>;
}

/// Replays a saved JSON array of GitHub events.
pub struct EventsFile {
    path: PathBuf,
}

impl EventsFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl ActivitySource for EventsFile {
    fn fetch(&self, username: &str, _since: DateTime<Utc>) -> Result<Vec<Event>> {
        let bytes = std::fs::read(&self.path)?;
        let raw: Vec<RawEvent> = serde_json::from_slice(&bytes)?;
        let events = normalize_events(&raw);
        info!(
            username,
            path = %self.path.display(),
            events = events.len(),
            "loaded activity events from file"
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Gh3dError;
    use std::io::Write;

    #[test]
    fn events_file_is_normalised() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"type": "PushEvent", "created_at": "2024-01-03T12:00:00Z", "payload": {{"size": 5}}}},
                {{"type": "ForkEvent", "created_at": "2024-01-03T13:00:00Z", "payload": {{}}}}
            ]"#
        )
        .unwrap();

        let events = EventsFile::new(file.path()).fetch("octocat", Utc::now()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].weight, 5);
        assert!(!events[1].kind.is_contribution());
    }

    #[test]
    fn events_file_errors_propagate() {
        let missing = EventsFile::new("/nonexistent/gh3d-events.json").fetch("octocat", Utc::now());
        assert!(matches!(missing, Err(Gh3dError::Io(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let invalid = EventsFile::new(file.path()).fetch("octocat", Utc::now());
        assert!(matches!(invalid, Err(Gh3dError::Serde(_))));
    }
}
