pub mod types;

pub use types::RepoRef;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument};

use types::{ApiErrorBody, CreateCommentRequest};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid repository (expected owner/repo): {0}")]
    InvalidRepository(String),

    #[error("GitHub token not found in config or environment")]
    MissingToken,
}

/// Capability to create a new comment on an issue or pull request.
///
/// Always creates; never updates an existing comment.
#[async_trait]
pub trait CommentSink: Send + Sync {
    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<(), GitHubError>;
}

/// Parse an `owner/repo` string, as found in `GITHUB_REPOSITORY`.
pub fn parse_repository(raw: &str) -> Result<RepoRef, GitHubError> {
    let raw = raw.trim();
    let segments: Vec<_> = raw.split('/').collect();

    if segments.len() != 2 || segments.iter().any(|s| s.trim().is_empty()) {
        return Err(GitHubError::InvalidRepository(raw.to_string()));
    }

    Ok(RepoRef {
        owner: segments[0].to_string(),
        repo: segments[1].to_string(),
    })
}

/// reqwest-backed [`CommentSink`] talking to the GitHub REST API.
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    api_url: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>, api_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn comments_url(&self, owner: &str, repo: &str, issue_number: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, owner, repo, issue_number
        )
    }
}

#[async_trait]
impl CommentSink for GitHubClient {
    #[instrument(skip(self, body), fields(body_chars = body.chars().count()))]
    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<(), GitHubError> {
        let url = self.comments_url(owner, repo, issue_number);
        debug!(%url, "creating issue comment");

        let response = self
            .http
            .post(&url)
            .header("User-Agent", "stubs-clippy-comment")
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .json(&CreateCommentRequest { body })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or(text);
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), "comment created");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_parse_valid_repository() {
        let repo = parse_repository("python/typeshed").unwrap();
        assert_eq!(repo.owner, "python");
        assert_eq!(repo.repo, "typeshed");
    }

    #[test]
    fn test_parse_repository_trims_whitespace() {
        let repo = parse_repository("  python/typeshed\n").unwrap();
        assert_eq!(repo.to_string(), "python/typeshed");
    }

    #[test]
    fn test_parse_invalid_repository() {
        assert!(parse_repository("typeshed").is_err());
        assert!(parse_repository("python/").is_err());
        assert!(parse_repository("/typeshed").is_err());
        assert!(parse_repository("a/b/c").is_err());
        assert!(parse_repository("").is_err());
    }

    #[test]
    fn test_comments_url_strips_trailing_slash() {
        let client = GitHubClient::new("token", "https://ghe.example.com/api/v3/");
        assert_eq!(
            client.comments_url("org", "repo", 7),
            "https://ghe.example.com/api/v3/repos/org/repo/issues/7/comments"
        );
    }

    #[tokio::test]
    async fn test_create_comment_posts_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/python/typeshed/issues/42/comments")
            .match_header("authorization", "Bearer test-token")
            .match_header("user-agent", "stubs-clippy-comment")
            .match_body(Matcher::Json(serde_json::json!({ "body": "hello" })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":1,"body":"hello"}"#)
            .create_async()
            .await;

        let client = GitHubClient::new("test-token", &server.url());
        client
            .create_comment("python", "typeshed", 42, "hello")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_comment_surfaces_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/python/typeshed/issues/42/comments")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Resource not accessible by integration"}"#)
            .create_async()
            .await;

        let client = GitHubClient::new("test-token", &server.url());
        let err = client
            .create_comment("python", "typeshed", 42, "hello")
            .await
            .unwrap_err();

        match err {
            GitHubError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Resource not accessible by integration");
            }
            other => panic!("unexpected error: {other}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_comment_keeps_raw_body_when_not_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/repos/org/repo/issues/1/comments")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = GitHubClient::new("t", &server.url());
        let err = client.create_comment("org", "repo", 1, "x").await.unwrap_err();
        assert!(matches!(err, GitHubError::Api { status: 502, ref message } if message == "bad gateway"));
    }
}
