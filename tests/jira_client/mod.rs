//! `JiraClient` tests.
//!
//! Each test registers the responses of the fake Jira with a
//! [`TestBuilder`], calls a client method, and checks both the decoded
//! result and the request that reached the server.

use crate::common::{Method::GET, Request, Response, TestBuilder, block_on};
use jira_weekly_report::jira::{EpicQuery, IssueTracker};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn epic_query() -> EpicQuery {
    EpicQuery {
        projects: vec!["PF".to_string(), "UXDENG".to_string()],
        affected_version: "Q3 2025".to_string(),
        updated_within_days: 6,
    }
}

/// Keeps the last request a handler saw so the test can inspect it.
fn capture() -> (Arc<Mutex<Option<Request>>>, Arc<Mutex<Option<Request>>>) {
    let slot = Arc::new(Mutex::new(None));
    (slot.clone(), slot)
}

#[test]
fn search_epics() {
    let (seen, slot) = capture();
    let ctx = TestBuilder::default()
        .api_handler(GET, "rest/api/2/search", move |req| {
            *slot.lock().unwrap() = Some(req);
            Response::json(json!({
                "startAt": 0,
                "maxResults": 100,
                "total": 2,
                "issues": [
                    {
                        "id": "1",
                        "key": "UXDENG-7",
                        "fields": {
                            "summary": "Design tokens",
                            "created": "2025-06-01T09:00:00.000+0000",
                            "updated": "2025-07-09T09:00:00.000+0000"
                        }
                    },
                    {
                        "id": "2",
                        "key": "PF-1",
                        "fields": { "summary": "Charts" }
                    }
                ]
            }))
        })
        .build();

    let issues = block_on(ctx.jira.search_epics(&epic_query())).unwrap();
    let keys: Vec<_> = issues.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["UXDENG-7", "PF-1"]);
    assert_eq!(issues[0].fields.summary, "Design tokens");
    assert_eq!(
        issues[0].fields.updated.as_deref(),
        Some("2025-07-09T09:00:00.000+0000")
    );
    assert!(issues[1].fields.created.is_none());

    let req = seen.lock().unwrap().take().unwrap();
    assert_eq!(
        req.query_param("jql"),
        Some(
            "project in (PF, UXDENG) AND type = \"Epic\" AND affectedVersion = \"Q3 2025\" AND updated >= -6d"
        )
    );
    assert_eq!(req.query_param("fields"), Some("key,summary,created,updated"));
    assert_eq!(req.query_param("maxResults"), Some("100"));
    assert_eq!(req.headers["authorization"], "Bearer sekrit-token");
    assert_eq!(req.headers["accept"], "application/json");
    ctx.events.assert_eq(&[(GET, "/rest/api/2/search")]);
}

#[test]
fn search_without_issues_field() {
    let ctx = TestBuilder::default()
        .api_handler(GET, "rest/api/2/search", |_| {
            Response::json(json!({ "total": 0 }))
        })
        .build();
    let issues = block_on(ctx.jira.search_epics(&epic_query())).unwrap();
    assert!(issues.is_empty());
}

#[test]
fn search_error_keeps_response_body() {
    let ctx = TestBuilder::default()
        .api_handler(GET, "rest/api/2/search", |_| {
            Response::json(json!({
                "errorMessages": ["The value 'Q9 2025' does not exist for the field 'affectedVersion'."]
            }))
            .status(400)
        })
        .build();
    let err = block_on(ctx.jira.search_epics(&epic_query())).unwrap_err();
    let msg = format!("{err:?}");
    assert!(msg.contains("searching for issues"), "{msg}");
    assert!(msg.contains("400"), "{msg}");
    assert!(msg.contains("does not exist for the field"), "{msg}");
}

#[test]
fn malformed_search_response() {
    let ctx = TestBuilder::default()
        .api_handler(GET, "rest/api/2/search", |_| {
            Response::json(json!({ "issues": [{ "key": 12, "fields": {} }] }))
        })
        .build();
    let err = block_on(ctx.jira.search_epics(&epic_query())).unwrap_err();
    let msg = format!("{err:?}");
    assert!(msg.contains("issues[0].key"), "{msg}");
}

#[test]
fn issue_comments() {
    let (seen, slot) = capture();
    let ctx = TestBuilder::default()
        .api_handler(GET, "rest/api/2/issue/{key}/comment", move |req| {
            let key = req.components["key"].clone();
            *slot.lock().unwrap() = Some(req);
            Response::json(json!({
                "startAt": 0,
                "maxResults": 1000,
                "total": 2,
                "comments": [
                    {
                        "id": "5001",
                        "author": { "name": "jdoe", "displayName": "Jane Doe" },
                        "body": format!("first comment on {key}"),
                        "created": "2025-07-08T10:00:00.000+0000",
                        "updated": "2025-07-08T10:00:00.000+0000"
                    },
                    {
                        "id": "5002",
                        "author": { "displayName": "GitHub Sync" },
                        "body": {
                            "type": "doc",
                            "version": 1,
                            "content": [
                                { "type": "paragraph", "content": [{ "type": "text", "text": "adf" }] }
                            ]
                        },
                        "created": "2025-07-09T10:00:00.000+0000",
                        "updated": "2025-07-09T11:00:00.000+0000"
                    }
                ]
            }))
        })
        .build();

    let comments = block_on(ctx.jira.issue_comments("PF-1")).unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].id, "5001");
    assert_eq!(comments[0].body, Some(json!("first comment on PF-1")));
    assert_eq!(comments[1].author.as_ref().unwrap().display_name, "GitHub Sync");
    assert_eq!(comments[1].created, "2025-07-09T10:00:00.000+0000");

    let req = seen.lock().unwrap().take().unwrap();
    assert_eq!(req.query_param("orderBy"), Some("created"));
    assert_eq!(req.query_param("maxResults"), Some("1000"));
    ctx.events.assert_eq(&[(GET, "/rest/api/2/issue/PF-1/comment")]);
}

#[test]
fn issue_comments_not_found() {
    let ctx = TestBuilder::default().build();
    let err = block_on(ctx.jira.issue_comments("PF-404")).unwrap_err();
    let msg = format!("{err:?}");
    assert!(msg.contains("fetching comments for issue PF-404"), "{msg}");
    assert!(msg.contains("404 not found"), "{msg}");
}

#[test]
fn browse_url_follows_base() {
    let ctx = TestBuilder::default().build();
    assert_eq!(
        ctx.jira.browse_url("PF-1"),
        format!("{}browse/PF-1", ctx.base_url)
    );
}
