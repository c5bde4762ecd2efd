//! Jira REST (v2) types and the [`IssueTracker`] seam used by report
//! generation.

use async_trait::async_trait;
use itertools::Itertools;

pub mod client;

pub use client::JiraClient;

/// Most issues returned by a single search. No further pages are requested.
pub const SEARCH_PAGE_SIZE: u32 = 100;
/// Most comments returned for a single issue.
pub const COMMENTS_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Issue {
    /// Project-prefixed key, e.g. `PF-1234`.
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    pub created: Option<String>,
    pub updated: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: Option<User>,
    pub created: String,
    pub updated: Option<String>,
    /// Either a plain string or a document tree; see [`crate::adf`].
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct User {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct SearchResults {
    #[serde(default)]
    pub(crate) issues: Vec<Issue>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct CommentPage {
    #[serde(default)]
    pub(crate) comments: Vec<Comment>,
}

/// Search predicate for the epics that go into a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicQuery {
    pub projects: Vec<String>,
    pub affected_version: String,
    /// Only issues updated within this many days are returned.
    pub updated_within_days: u32,
}

impl EpicQuery {
    /// Renders the query as JQL.
    pub fn jql(&self) -> String {
        format!(
            "project in ({}) AND type = \"Epic\" AND affectedVersion = \"{}\" AND updated >= -{}d",
            self.projects.iter().join(", "),
            self.affected_version.replace('"', "\\\""),
            self.updated_within_days,
        )
    }
}

/// The operations report generation needs from an issue tracker.
#[async_trait]
pub trait IssueTracker {
    /// Returns the first page of epics matching `query`, in tracker order.
    async fn search_epics(&self, query: &EpicQuery) -> anyhow::Result<Vec<Issue>>;

    /// Returns the comments of `issue_key`, oldest first.
    async fn issue_comments(&self, issue_key: &str) -> anyhow::Result<Vec<Comment>>;

    /// Human facing URL of an issue.
    fn browse_url(&self, issue_key: &str) -> String;
}
