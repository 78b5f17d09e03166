//! Report publishing to GitHub Discussions
//!
//! Publishes a rendered review report as a comment on a newly created
//! discussion, in the layout the Giscus widget expects: the discussion
//! title mirrors the docs pathname and the discussion body stays
//! minimal, with the report attached as the first comment.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::time::Duration;

/// GitHub GraphQL API endpoint
const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Client for publishing review reports to GitHub Discussions
pub struct DiscussionClient {
    token: String,
    endpoint: String,
    client: reqwest::blocking::Client,
}

/// Location of a published report
#[derive(Debug, Clone)]
pub struct PublishedReport {
    /// URL of the created discussion
    pub discussion_url: String,
    /// URL of the report comment
    pub comment_url: String,
}

impl DiscussionClient {
    /// Create a client for the public GitHub API
    pub fn new(token: &str) -> Result<Self> {
        Self::with_endpoint(token, GITHUB_GRAPHQL_URL)
    }

    /// Create a client against a custom GraphQL endpoint
    pub fn with_endpoint(token: &str, endpoint: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            token: token.to_string(),
            endpoint: endpoint.to_string(),
            client,
        })
    }

    /// Publish a report: create a discussion for the reviewed document
    /// and attach the report as a comment.
    ///
    /// `repo_name` must be `owner/name`; a malformed value is a caller
    /// error and fails the call before any request is sent.
    pub fn post_report(
        &self,
        repo_name: &str,
        category_id: &str,
        doc_source: &str,
        report: &str,
    ) -> Result<PublishedReport> {
        let (owner, name) = repo_name
            .split_once('/')
            .with_context(|| format!("Invalid repository name '{}', expected owner/name", repo_name))?;

        tracing::info!("fetching repository id for {}", repo_name);
        let repository_id = self.repository_id(owner, name)?;

        let title = discussion_title(doc_source);
        tracing::info!("creating discussion with title: {}", title);
        let (discussion_id, discussion_url) =
            self.create_discussion(&repository_id, category_id, &title)?;

        tracing::info!("adding report as comment");
        let comment_url = self.add_comment(&discussion_id, report)?;
        tracing::info!("report published at {}", comment_url);

        Ok(PublishedReport {
            discussion_url,
            comment_url,
        })
    }

    fn repository_id(&self, owner: &str, name: &str) -> Result<String> {
        let query = r#"
        query($owner: String!, $name: String!) {
            repository(owner: $owner, name: $name) {
                id
            }
        }
        "#;

        let data = self.graphql(query, json!({ "owner": owner, "name": name }))?;

        data["repository"]["id"]
            .as_str()
            .map(|s| s.to_string())
            .context("Repository id missing from GraphQL response")
    }

    fn create_discussion(
        &self,
        repository_id: &str,
        category_id: &str,
        title: &str,
    ) -> Result<(String, String)> {
        let mutation = r#"
        mutation($input: CreateDiscussionInput!) {
            createDiscussion(input: $input) {
                discussion {
                    id
                    url
                }
            }
        }
        "#;

        let variables = json!({
            "input": {
                "repositoryId": repository_id,
                "categoryId": category_id,
                "title": title,
                // The report lands as a comment; keep the body minimal
                "body": "Documentation review thread"
            }
        });

        let data = self.graphql(mutation, variables)?;
        let discussion = &data["createDiscussion"]["discussion"];

        let id = discussion["id"]
            .as_str()
            .context("Discussion id missing from GraphQL response")?;
        let url = discussion["url"].as_str().unwrap_or_default();

        Ok((id.to_string(), url.to_string()))
    }

    fn add_comment(&self, discussion_id: &str, body: &str) -> Result<String> {
        let mutation = r#"
        mutation($input: AddDiscussionCommentInput!) {
            addDiscussionComment(input: $input) {
                comment {
                    id
                    url
                }
            }
        }
        "#;

        let variables = json!({
            "input": {
                "discussionId": discussion_id,
                "body": body
            }
        });

        let data = self.graphql(mutation, variables)?;

        data["addDiscussionComment"]["comment"]["url"]
            .as_str()
            .map(|s| s.to_string())
            .context("Comment url missing from GraphQL response")
    }

    /// Execute one GraphQL request and unwrap its `data` payload
    fn graphql(&self, query: &str, variables: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("bearer {}", self.token))
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .context("Failed to send GraphQL request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!("GraphQL request failed: {} - {}", status, body);
        }

        let result: Value = response
            .json()
            .context("Failed to parse GraphQL response")?;

        if let Some(errors) = result.get("errors") {
            anyhow::bail!("GraphQL error: {}", errors);
        }

        result
            .get("data")
            .cloned()
            .context("GraphQL response has no data")
    }
}

/// Derive the discussion title from the documentation source path.
///
/// Docs sites map `.../content/docs/dev/stack/turborepo.mdx` to the
/// pathname `dev/stack/turborepo`; Giscus looks discussions up by that
/// pathname, so the title must match it. Falls back to the file stem
/// when the path does not follow the content layout.
pub fn discussion_title(doc_source: &str) -> String {
    let parts: Vec<&str> = doc_source.split('/').filter(|p| !p.is_empty()).collect();

    let content_idx = parts.iter().position(|p| *p == "content");
    let docs_idx = content_idx
        .and_then(|start| parts[start..].iter().position(|p| *p == "docs").map(|i| start + i));

    if let Some(docs_idx) = docs_idx {
        let tail = &parts[docs_idx + 1..];
        if !tail.is_empty() {
            let mut mapped: Vec<String> = tail.iter().map(|p| p.to_string()).collect();
            if let Some(last) = mapped.last_mut() {
                *last = last
                    .trim_end_matches(".mdx")
                    .trim_end_matches(".md")
                    .to_string();
            }
            return mapped.join("/");
        }
    }

    // Fallback: file stem without extension
    std::path::Path::new(doc_source)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| doc_source.to_string())
}
