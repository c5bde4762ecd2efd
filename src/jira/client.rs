use anyhow::Context as _;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::Config;
use crate::jira::{
    COMMENTS_PAGE_SIZE, Comment, CommentPage, EpicQuery, Issue, IssueTracker, SEARCH_PAGE_SIZE,
    SearchResults,
};

const SEARCH_FIELDS: &str = "key,summary,created,updated";

#[derive(Clone)]
pub struct JiraClient {
    token: SecretString,
    client: Client,
    base_url: Url,
}

impl JiraClient {
    /// `base_url` must end with a `/`; API paths are joined below it.
    pub fn new(token: SecretString, base_url: Url) -> Self {
        JiraClient {
            client: Client::new(),
            token,
            base_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.token.clone(), config.base_url.clone())
    }

    async fn send_req(&self, req: RequestBuilder) -> anyhow::Result<(Bytes, String)> {
        tracing::debug!("send_req with {:?}", req);
        let req_dbg = format!("{req:?}");
        let req = req
            .build()
            .with_context(|| format!("building reqwest {req_dbg}"))?;

        let resp = self
            .client
            .execute(req)
            .await
            .with_context(|| format!("failed to send request {req_dbg}"))?;
        let maybe_err = resp.error_for_status_ref().err();
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("failed to read response body {req_dbg}"))?;
        if let Some(e) = maybe_err {
            return Err(anyhow::Error::new(e))
                .with_context(|| format!("response: {}", String::from_utf8_lossy(&body)));
        }

        Ok((body, req_dbg))
    }

    pub async fn json<T>(&self, req: RequestBuilder) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let (body, req_dbg) = self.send_req(req).await?;
        crate::deserialize_json(&body).with_context(|| format!("decoding response of {req_dbg}"))
    }

    fn get(&self, path: &str) -> anyhow::Result<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("invalid API path {path:?}"))?;
        tracing::trace!("get {:?}", url.as_str());
        let mut auth =
            HeaderValue::from_maybe_shared(format!("Bearer {}", self.token.expose_secret()))
                .context("Jira token is not a valid header value")?;
        auth.set_sensitive(true);
        Ok(self
            .client
            .get(url)
            .header(USER_AGENT, concat!("jira-weekly-report/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, auth))
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn search_epics(&self, query: &EpicQuery) -> anyhow::Result<Vec<Issue>> {
        let jql = query.jql();
        tracing::debug!("searching issues with `{jql}`");
        let max_results = SEARCH_PAGE_SIZE.to_string();
        let req = self.get("rest/api/2/search")?.query(&[
            ("jql", jql.as_str()),
            ("fields", SEARCH_FIELDS),
            ("maxResults", max_results.as_str()),
        ]);
        let results: SearchResults = self.json(req).await.context("searching for issues")?;
        Ok(results.issues)
    }

    async fn issue_comments(&self, issue_key: &str) -> anyhow::Result<Vec<Comment>> {
        let max_results = COMMENTS_PAGE_SIZE.to_string();
        let req = self
            .get(&format!("rest/api/2/issue/{issue_key}/comment"))?
            .query(&[("orderBy", "created"), ("maxResults", max_results.as_str())]);
        let page: CommentPage = self
            .json(req)
            .await
            .with_context(|| format!("fetching comments for issue {issue_key}"))?;
        Ok(page.comments)
    }

    fn browse_url(&self, issue_key: &str) -> String {
        format!("{}browse/{issue_key}", self.base_url)
    }
}
