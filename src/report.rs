//! Weekly report generation.
//!
//! The flow is: search the tracker for epics, then for each epic (strictly
//! one after the other, with a pause before every request) fetch its
//! comments, keep the recent ones, flatten their bodies to text, and collect
//! everything into a [`Report`] that is printed and saved as JSON.

use anyhow::Context as _;
use chrono::{DateTime, Datelike, Local, SecondsFormat, TimeDelta, Utc};
use itertools::Itertools;
use regex::Regex;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use crate::adf;
use crate::config::Config;
use crate::jira::{Comment, EpicQuery, Issue, IssueTracker};
use crate::utils::{format_date, parse_timestamp, truncate_text};

/// Comments (and issues) older than this many days are not reported.
pub const RECENT_DAYS: u32 = 6;
/// Label stored in the report's search criteria.
pub const COMMENTS_PERIOD: &str = "Last 7 days";
const UNKNOWN_AUTHOR: &str = "Unknown";
const COMMENT_PREVIEW_LEN: usize = 150;
const SUMMARY_TEMPLATE: &str = include_str!("../templates/summary.tt");

/// Comments mirrored from another system carry their original author in the
/// body. The name stops at the line ending, which may be `\r\n`.
static COMMENT_AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Comment Author: ([^\r\n]*)\r?\n").expect("Invalid regexp"));

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_at: String,
    pub search_criteria: SearchCriteria,
    pub issues: Vec<IssueSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub projects: Vec<String>,
    pub affected_version: String,
    pub comments_period: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary {
    pub issue_key: String,
    pub issue_summary: String,
    pub issue_url: String,
    pub recent_comments_count: usize,
    pub comments: Vec<FormattedComment>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FormattedComment {
    pub id: String,
    pub author: String,
    pub created: String,
    pub body: String,
    pub updated: Option<String>,
}

/// Switches coming from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Takes precedence over the configured version filter.
    pub affected_version: Option<String>,
    /// Print the report but don't write it to disk.
    pub dry_run: bool,
    /// List every comment in the console summary.
    pub show_comments: bool,
}

/// Version label of the quarter containing `date`, e.g. `Q3 2025`.
pub fn current_quarter(date: impl Datelike) -> String {
    format!("Q{} {}", (date.month() - 1) / 3 + 1, date.year())
}

/// Keeps the comments created strictly after `now` minus [`RECENT_DAYS`].
///
/// Comments with an unparseable creation time are dropped.
pub fn filter_recent_comments(comments: Vec<Comment>, now: DateTime<Utc>) -> Vec<Comment> {
    let cutoff = now - TimeDelta::days(RECENT_DAYS.into());
    comments
        .into_iter()
        .filter(|comment| {
            parse_timestamp(&comment.created)
                .is_some_and(|created| created.with_timezone(&Utc) > cutoff)
        })
        .collect()
}

pub fn format_comment(comment: &Comment) -> FormattedComment {
    let body = adf::extract_text(comment.body.as_ref());
    let author = match COMMENT_AUTHOR_RE.captures(&body) {
        Some(caps) => caps[1].to_string(),
        None => comment
            .author
            .as_ref()
            .map_or(UNKNOWN_AUTHOR, |a| a.display_name.as_str())
            .to_string(),
    };

    FormattedComment {
        id: comment.id.clone(),
        author,
        created: comment.created.clone(),
        body,
        updated: comment.updated.clone(),
    }
}

pub struct ReportGenerator<'a, T: ?Sized> {
    tracker: &'a T,
    query: EpicQuery,
    request_delay: Duration,
}

impl<'a, T: IssueTracker + ?Sized> ReportGenerator<'a, T> {
    pub fn new(tracker: &'a T, query: EpicQuery, request_delay: Duration) -> Self {
        ReportGenerator {
            tracker,
            query,
            request_delay,
        }
    }

    /// Builds the summary of a single issue.
    ///
    /// Returns `None` when the issue has no recent comments. Failing to fetch
    /// the comments is logged and treated as having none.
    pub async fn summarize_issue(&self, issue: &Issue, now: DateTime<Utc>) -> Option<IssueSummary> {
        println!("\nProcessing issue: {} - {}", issue.key, issue.fields.summary);

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
        let comments = match self.tracker.issue_comments(&issue.key).await {
            Ok(comments) => comments,
            Err(e) => {
                tracing::error!("Error fetching comments for issue {}: {:?}", issue.key, e);
                Vec::new()
            }
        };

        let recent = filter_recent_comments(comments, now);
        if recent.is_empty() {
            println!("No recent comments found for {}", issue.key);
            return None;
        }

        let comments: Vec<FormattedComment> = recent.iter().map(format_comment).collect();
        Some(IssueSummary {
            issue_key: issue.key.clone(),
            issue_summary: issue.fields.summary.clone(),
            issue_url: self.tracker.browse_url(&issue.key),
            recent_comments_count: comments.len(),
            comments,
        })
    }

    /// Searches for epics and summarizes them in search order.
    ///
    /// Only a failing search is an error.
    pub async fn generate(&self, now: DateTime<Utc>) -> anyhow::Result<Report> {
        let issues = self.tracker.search_epics(&self.query).await?;
        println!("Found {} issues with recent comments", issues.len());
        if issues.is_empty() {
            println!("No issues found matching the criteria.");
        }

        let mut summaries = Vec::new();
        for issue in &issues {
            if let Some(summary) = self.summarize_issue(issue, now).await {
                summaries.push(summary);
            }
        }

        Ok(Report {
            generated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            search_criteria: SearchCriteria {
                projects: self.query.projects.clone(),
                affected_version: self.query.affected_version.clone(),
                comments_period: COMMENTS_PERIOD.to_string(),
            },
            issues: summaries,
        })
    }
}

#[derive(serde::Serialize)]
struct SummaryView<'a> {
    generated_at: &'a str,
    projects: String,
    affected_version: &'a str,
    comments_period: &'a str,
    show_comments: bool,
    issues: Vec<IssueView<'a>>,
}

#[derive(serde::Serialize)]
struct IssueView<'a> {
    key: &'a str,
    summary: &'a str,
    url: &'a str,
    comment_count: usize,
    comments: Vec<CommentView<'a>>,
}

#[derive(serde::Serialize)]
struct CommentView<'a> {
    author: &'a str,
    date: String,
    text: Cow<'a, str>,
}

/// Renders the human readable summary printed at the end of a run.
pub fn render_summary(report: &Report, show_comments: bool) -> anyhow::Result<String> {
    let view = SummaryView {
        generated_at: &report.generated_at,
        projects: report.search_criteria.projects.iter().join(", "),
        affected_version: &report.search_criteria.affected_version,
        comments_period: &report.search_criteria.comments_period,
        show_comments,
        issues: report
            .issues
            .iter()
            .map(|issue| IssueView {
                key: &issue.issue_key,
                summary: &issue.issue_summary,
                url: &issue.issue_url,
                comment_count: issue.recent_comments_count,
                comments: issue
                    .comments
                    .iter()
                    .map(|c| CommentView {
                        author: &c.author,
                        date: format_date(&c.created),
                        text: truncate_text(&c.body, COMMENT_PREVIEW_LEN),
                    })
                    .collect(),
            })
            .collect(),
    };
    let context = tera::Context::from_serialize(&view)?;
    tera::Tera::one_off(SUMMARY_TEMPLATE, &context, false).context("rendering report summary")
}

/// Writes `report` as pretty JSON into `dir`, creating it if needed.
///
/// The file name carries the UTC date of `now`.
pub fn save_report(report: &Report, dir: &Path, now: DateTime<Utc>) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report directory {}", dir.display()))?;
    let path = dir.join(format!("jira-weekly-report-{}.json", now.format("%Y-%m-%d")));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    Ok(path)
}

/// Runs a whole report: search, summarize, print and save.
///
/// Returns the path of the written report, or `None` when nothing was
/// written (no issue had recent comments, or a dry run).
pub async fn generate_weekly_report<T: IssueTracker + ?Sized>(
    tracker: &T,
    config: &Config,
    options: &RunOptions,
    now: DateTime<Utc>,
) -> anyhow::Result<Option<PathBuf>> {
    let affected_version = options
        .affected_version
        .clone()
        .or_else(|| config.affected_version.clone())
        .unwrap_or_else(|| current_quarter(now.with_timezone(&Local).date_naive()));

    println!(
        "🔍 Searching for issues in {} projects with {affected_version} affected version...",
        config.projects.join(" and ")
    );

    let query = EpicQuery {
        projects: config.projects.clone(),
        affected_version,
        updated_within_days: RECENT_DAYS,
    };
    let report = ReportGenerator::new(tracker, query, config.request_delay)
        .generate(now)
        .await?;

    print!("{}", render_summary(&report, options.show_comments)?);

    if report.issues.is_empty() {
        return Ok(None);
    }
    if options.dry_run {
        tracing::info!("dry run, not saving the report");
        return Ok(None);
    }
    let path = save_report(&report, &config.output_dir, now)?;
    println!("\n💾 Report saved as: {}", path.display());
    Ok(Some(path))
}
