use chrono::{DateTime, TimeDelta, Utc};
use gh3d::error::{Gh3dError, Result};
use gh3d::github::{ActivitySource, FetchMode, GitHubClient};
use gh3d::model::{Event, EventKind};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// `count` push events, newest first, one hour apart starting at `newest`.
fn push_page(count: usize, newest: DateTime<Utc>) -> Value {
    let events: Vec<Value> = (0..count)
        .map(|i| {
            let ts = newest - TimeDelta::hours(i as i64);
            json!({ "type": "PushEvent", "created_at": ts.to_rfc3339(), "payload": { "size": 1 } })
        })
        .collect();
    Value::Array(events)
}

/// Runs the blocking client off the async runtime that serves the mock.
async fn fetch(server: &MockServer, mode: FetchMode, max_pages: usize, since: DateTime<Utc>) -> Result<Vec<Event>> {
    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = GitHubClient::new(&uri, "t0ken", mode, max_pages)?;
        client.fetch("octocat", since)
    })
    .await
    .unwrap()
}

async fn requests(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test(flavor = "multi_thread")]
async fn events_stop_on_short_page() {
    let server = MockServer::start().await;
    let since = at("2023-01-01T00:00:00Z");
    Mock::given(method("GET"))
        .and(path("/users/octocat/events"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .and(header("authorization", "Bearer t0ken"))
        .and(header("x-github-api-version", "2022-11-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(push_page(100, at("2024-03-01T00:00:00Z"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/events"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(push_page(40, at("2024-02-20T00:00:00Z"))))
        .expect(1)
        .mount(&server)
        .await;

    let events = fetch(&server, FetchMode::Events, 3, since).await.unwrap();
    assert_eq!(events.len(), 140);
    assert!(events.iter().all(|e| e.kind == EventKind::Push && e.weight == 1));
    assert_eq!(requests(&server).await, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn events_stop_once_a_page_reaches_window_start() {
    let server = MockServer::start().await;
    // The 100 hourly events span about four days; the window starts two days back.
    let newest = at("2024-03-01T00:00:00Z");
    let since = newest - TimeDelta::days(2);
    Mock::given(method("GET"))
        .and(path("/users/octocat/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(push_page(100, newest)))
        .mount(&server)
        .await;

    let events = fetch(&server, FetchMode::Events, 3, since).await.unwrap();
    assert_eq!(events.len(), 100);
    assert_eq!(requests(&server).await, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn max_pages_bounds_full_feeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(push_page(100, at("2024-03-01T00:00:00Z"))))
        .mount(&server)
        .await;

    let events = fetch(&server, FetchMode::Events, 2, at("2020-01-01T00:00:00Z")).await.unwrap();
    assert_eq!(events.len(), 200);
    assert_eq!(requests(&server).await, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let uri = format!("{}/", server.uri());
    let events = tokio::task::spawn_blocking(move || {
        GitHubClient::new(&uri, "t0ken", FetchMode::Events, 3)?.fetch("octocat", Utc::now())
    })
    .await
    .unwrap()
    .unwrap();
    assert!(events.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_and_exhausted_quota_are_distinct() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/events"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message":"Bad credentials"}"#))
        .mount(&server)
        .await;
    let err = fetch(&server, FetchMode::Events, 3, Utc::now()).await.unwrap_err();
    assert!(matches!(err, Gh3dError::Auth { status: 401 }), "{err:?}");

    let limited = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "1704067200"),
        )
        .mount(&limited)
        .await;
    let err = fetch(&limited, FetchMode::Events, 3, Utc::now()).await.unwrap_err();
    assert!(matches!(err, Gh3dError::RateLimited { reset: Some(1_704_067_200) }), "{err:?}");
}

fn commit(date: &str) -> Value {
    json!({ "sha": "abc123", "commit": { "author": { "date": date } } })
}

async fn mount_repos(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .and(query_param("type", "owner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "full_name": "octocat/live", "size": 12 },
            { "full_name": "octocat/empty", "size": 0 },
            { "full_name": "octocat/gone", "size": 3 },
            { "full_name": "octocat/blocked", "size": 3 },
        ])))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn commits_mode_skips_missing_repositories() {
    let server = MockServer::start().await;
    mount_repos(&server).await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/live/commits"))
        .and(query_param("author", "octocat"))
        .and(query_param("since", "2024-01-01T00:00:00+00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            commit("2024-01-03T10:00:00Z"),
            commit("2024-01-09T10:00:00Z"),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/empty/commits"))
        .respond_with(ResponseTemplate::new(409))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/gone/commits"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/blocked/commits"))
        .respond_with(ResponseTemplate::new(451))
        .expect(1)
        .mount(&server)
        .await;

    let events = fetch(&server, FetchMode::Commits, 3, at("2024-01-01T00:00:00Z")).await.unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.kind == EventKind::Commit && e.weight == 1));
    assert_eq!(events[0].timestamp, at("2024-01-03T10:00:00Z"));
}

#[tokio::test(flavor = "multi_thread")]
async fn commits_mode_aborts_on_auth_failure() {
    let server = MockServer::start().await;
    mount_repos(&server).await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/live/commits"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/gone/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = fetch(&server, FetchMode::Commits, 3, at("2024-01-01T00:00:00Z")).await.unwrap_err();
    assert!(matches!(err, Gh3dError::Auth { status: 401 }), "{err:?}");
}
