use super::normalize::{normalize_commit, normalize_events, RawCommit, RawEvent, RawRepo};
use super::{ActivitySource, FetchMode};
use crate::error::{Gh3dError, Result};
use crate::model::Event;
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const PER_PAGE: usize = 100;

const API_VERSION: &str = "2022-11-28";

/// Per-repository statuses that mean "nothing to count here" rather than a failed run.
const SKIPPABLE_REPO_STATUS: [u16; 3] = [404, 409, 451];

pub struct GitHubClient {
    client: Client,
    base_url: String,
    mode: FetchMode,
    max_pages: usize,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: &str, mode: FetchMode, max_pages: usize) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Gh3dError::Config("token contains invalid header characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("gh3d/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            mode,
            max_pages: max_pages.max(1),
        })
    }

    fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        page: usize,
    ) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("per_page", PER_PAGE), ("page", page)])
            .send()?;

        let resp = check_status(resp)?;
        Ok(resp.json()?)
    }

    fn paginate<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for page in 1..=self.max_pages {
            let batch: Vec<T> = self.get_page(path, query, page)?;
            let count = batch.len();
            items.extend(batch);
            debug!(path, page, count, "fetched page");
            if count < PER_PAGE {
                break;
            }
        }
        Ok(items)
    }

    fn fetch_push_events(&self, username: &str, since: DateTime<Utc>) -> Result<Vec<Event>> {
        let path = format!("/users/{username}/events");
        let mut events = Vec::new();
        let mut pages = 0;

        for page in 1..=self.max_pages {
            let raw: Vec<RawEvent> = self.get_page(&path, &[], page)?;
            pages = page;
            let count = raw.len();
            let batch = normalize_events(&raw);
            // Newest first: once a page reaches past the window start, later pages are older still.
            let reached_start = batch.iter().any(|e| e.timestamp < since);
            events.extend(batch);
            debug!(page, count, "fetched events page");
            if count < PER_PAGE || reached_start {
                break;
            }
        }

        info!(username, pages, events = events.len(), "fetched activity events");
        Ok(events)
    }

    fn fetch_commits(&self, username: &str, since: DateTime<Utc>) -> Result<Vec<Event>> {
        let repos: Vec<RawRepo> =
            self.paginate(&format!("/users/{username}/repos"), &[("type", "owner".to_string())])?;
        let query = [("author", username.to_string()), ("since", since.to_rfc3339())];
        let mut events = Vec::new();

        for repo in &repos {
            if repo.size == 0 {
                debug!(repo = %repo.full_name, "skipping empty repository");
                continue;
            }
            match self.paginate::<RawCommit>(&format!("/repos/{}/commits", repo.full_name), &query) {
                Ok(commits) => events.extend(commits.iter().filter_map(normalize_commit)),
                Err(Gh3dError::Api { status, .. }) if SKIPPABLE_REPO_STATUS.contains(&status) => {
                    warn!(repo = %repo.full_name, status, "skipping repository");
                }
                Err(e) => return Err(e),
            }
        }

        info!(username, repos = repos.len(), commits = events.len(), "fetched authored commits");
        Ok(events)
    }
}

impl ActivitySource for GitHubClient {
    fn fetch(&self, username: &str, since: DateTime<Utc>) -> Result<Vec<Event>> {
        match self.mode {
            FetchMode::Events => self.fetch_push_events(username, since),
            FetchMode::Commits => self.fetch_commits(username, since),
        }
    }
}

fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status().as_u16();
    if resp.status().is_success() {
        return Ok(resp);
    }

    let header = |name: &str| {
        resp.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let remaining = header("x-ratelimit-remaining");
    let reset = header("x-ratelimit-reset");
    let body = resp.text().unwrap_or_default();

    Err(status_error(status, remaining.as_deref(), reset.as_deref(), body))
}

/// Maps a non-success response to the error taxonomy; nothing here is retried.
pub fn status_error(status: u16, remaining: Option<&str>, reset: Option<&str>, body: String) -> Gh3dError {
    let exhausted = remaining.map(str::trim) == Some("0");
    match status {
        403 | 429 if exhausted => Gh3dError::RateLimited {
            reset: reset.and_then(|r| r.trim().parse().ok()),
        },
        429 => Gh3dError::RateLimited { reset: None },
        401 | 403 => Gh3dError::Auth { status },
        _ => Gh3dError::Api { status, body },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_auth() {
        assert!(matches!(
            status_error(401, None, None, String::new()),
            Gh3dError::Auth { status: 401 }
        ));
        assert!(matches!(
            status_error(403, Some("57"), None, String::new()),
            Gh3dError::Auth { status: 403 }
        ));
    }

    #[test]
    fn exhausted_quota_maps_to_rate_limited() {
        match status_error(403, Some("0"), Some("1704067200"), String::new()) {
            Gh3dError::RateLimited { reset } => assert_eq!(reset, Some(1_704_067_200)),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            status_error(429, None, None, String::new()),
            Gh3dError::RateLimited { reset: None }
        ));
    }

    #[test]
    fn other_statuses_keep_body() {
        match status_error(404, None, None, "{\"message\":\"Not Found\"}".into()) {
            Gh3dError::Api { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("Not Found"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let err = GitHubClient::new("https://api.github.com", "bad\ntoken", FetchMode::Events, 3)
            .err()
            .unwrap();
        assert!(matches!(err, Gh3dError::Config(_)));
    }
}
