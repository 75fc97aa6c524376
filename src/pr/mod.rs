pub mod types;

pub use types::{MergeStatus, PullRequestContext, PullRequestEvent, RepoRef};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PrError {
    #[error("Invalid webhook payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Webhook payload is missing required field `{0}`")]
    MissingField(&'static str),
}

/// Decode a raw `pull_request` delivery body.
pub fn parse_event(body: &[u8]) -> Result<PullRequestEvent, PrError> {
    Ok(serde_json::from_slice(body)?)
}

impl PullRequestContext {
    /// Extract the per-delivery context from an opened-PR payload.
    ///
    /// Repository owner/name, PR number and author are required; a payload
    /// without them is rejected instead of producing a half-addressed comment.
    pub fn from_event(event: &PullRequestEvent) -> Result<Self, PrError> {
        let pr = event
            .pull_request
            .as_ref()
            .ok_or(PrError::MissingField("pull_request"))?;
        let repository = event
            .repository
            .as_ref()
            .ok_or(PrError::MissingField("repository"))?;

        let owner = repository
            .owner
            .as_ref()
            .and_then(|o| o.login.clone())
            .ok_or(PrError::MissingField("repository.owner.login"))?;
        let name = repository
            .name
            .clone()
            .ok_or(PrError::MissingField("repository.name"))?;
        let number = pr
            .number
            .ok_or(PrError::MissingField("pull_request.number"))?;
        let author = pr
            .user
            .as_ref()
            .and_then(|u| u.login.clone())
            .ok_or(PrError::MissingField("pull_request.user.login"))?;

        let full_name = repository
            .full_name
            .clone()
            .unwrap_or_else(|| format!("{}/{}", owner, name));
        let merge_status = MergeStatus::from_github(pr.mergeable, pr.mergeable_state.as_deref());
        debug!(repo = %full_name, pr = number, merge_status = %merge_status, "extracted PR context");

        Ok(PullRequestContext {
            title: pr.title.clone().unwrap_or_default(),
            body: pr.body.clone().unwrap_or_default(),
            author,
            repo: RepoRef { owner, name },
            full_name,
            number,
            merge_status,
            installation_id: event.installation.as_ref().map(|i| i.id),
        })
    }
}
