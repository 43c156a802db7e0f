//! Conversion of raw GitHub API records into [`Event`]s.

use crate::model::{Event, EventKind};
use crate::util::parse_timestamp;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCommit {
    pub sha: String,
    pub commit: RawCommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCommitDetail {
    #[serde(default)]
    pub author: Option<RawSignature>,
    #[serde(default)]
    pub committer: Option<RawSignature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSignature {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRepo {
    pub full_name: String,
    #[serde(default)]
    pub size: u64,
}

pub fn normalize_event(raw: &RawEvent) -> Option<Event> {
    let created_at = raw.created_at.as_deref()?;
    let timestamp = match parse_timestamp(created_at) {
        Ok(ts) => ts,
        Err(e) => {
            debug!(kind = %raw.kind, error = %e, "dropping event with unparseable timestamp");
            return None;
        }
    };

    Some(Event {
        kind: EventKind::from_api(&raw.kind),
        timestamp,
        weight: push_weight(&raw.payload),
    })
}

pub fn normalize_events(raw: &[RawEvent]) -> Vec<Event> {
    raw.iter().filter_map(normalize_event).collect()
}

/// Commits are dated by authorship, falling back to the committer date.
pub fn normalize_commit(raw: &RawCommit) -> Option<Event> {
    let date = raw
        .commit
        .author
        .as_ref()
        .and_then(|a| a.date.as_deref())
        .or_else(|| raw.commit.committer.as_ref().and_then(|c| c.date.as_deref()))?;

    match parse_timestamp(date) {
        Ok(timestamp) => Some(Event::commit(timestamp)),
        Err(e) => {
            debug!(sha = %raw.sha, error = %e, "dropping commit with unparseable date");
            None
        }
    }
}

/// Number of commits in a push payload, or 0 when the payload doesn't say.
pub fn push_weight(payload: &Value) -> u64 {
    let Some(fields) = payload.as_object() else {
        return 0;
    };

    ["size", "distinct_size"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(as_count))
        .or_else(|| {
            fields
                .get("commits")
                .and_then(Value::as_array)
                .map(|commits| commits.len() as u64)
        })
        .unwrap_or(0)
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
