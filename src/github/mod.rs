pub mod auth;

pub use auth::{AuthError, GitHubAuth};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::pr::{PullRequestContext, RepoRef};

pub(crate) const USER_AGENT: &str = "pr-greeter";

/// Failure to create an issue comment.
///
/// `Api` carries GitHub's structured error; everything else is unstructured.
#[derive(Debug, Error)]
pub enum CommentPostError {
    #[error("GitHub API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("GitHub request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub authentication failed: {0}")]
    Auth(#[from] AuthError),
}

/// Where a comment goes: the PR's issue thread, under the delivering installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentTarget {
    pub repo: RepoRef,
    pub number: u64,
    pub installation_id: Option<u64>,
}

impl CommentTarget {
    pub fn for_pull_request(ctx: &PullRequestContext) -> Self {
        Self {
            repo: ctx.repo.clone(),
            number: ctx.number,
            installation_id: ctx.installation_id,
        }
    }
}

impl std::fmt::Display for CommentTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.repo.owner, self.repo.name, self.number)
    }
}

#[async_trait]
pub trait CommentPoster: Send + Sync {
    /// Create one issue comment. A single attempt; no retries.
    async fn create_comment(&self, target: &CommentTarget, body: &str) -> Result<(), CommentPostError>;
}

/// GitHub REST client for issue comments.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    auth: GitHubAuth,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, auth: GitHubAuth) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            auth,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pull `message` out of a GitHub error body, or fall back to the raw text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string())
}

#[async_trait]
impl CommentPoster for GitHubClient {
    #[instrument(skip_all, fields(pr = %target))]
    async fn create_comment(&self, target: &CommentTarget, body: &str) -> Result<(), CommentPostError> {
        let token = self
            .auth
            .token_for(&self.client, &self.api_url, target.installation_id)
            .await?;
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, target.repo.owner, target.repo.name, target.number
        );

        debug!("creating issue comment");
        let response = self
            .client
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&token)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CommentPostError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        debug!(status = status.as_u16(), "comment created");
        Ok(())
    }
}
