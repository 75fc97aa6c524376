use serde::Deserialize;

/// Host-reported merge classification, collapsed to what the greeter cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStatus {
    Mergeable,
    Conflicted,
    Unknown,
}

impl MergeStatus {
    /// Derive the status from GitHub's `mergeable` flag and `mergeable_state`.
    /// An explicit `false` or a `dirty` state both mean conflicts.
    pub fn from_github(mergeable: Option<bool>, mergeable_state: Option<&str>) -> Self {
        if mergeable == Some(false) || mergeable_state == Some("dirty") {
            MergeStatus::Conflicted
        } else if mergeable == Some(true) {
            MergeStatus::Mergeable
        } else {
            MergeStatus::Unknown
        }
    }
}

impl std::fmt::Display for MergeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeStatus::Mergeable => write!(f, "mergeable"),
            MergeStatus::Conflicted => write!(f, "conflicted"),
            MergeStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Owner/name pair addressing a repository on the GitHub REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

/// Everything the greeter knows about one opened pull request.
/// Built per delivery by `PullRequestContext::from_event` and never mutated.
#[derive(Debug, Clone)]
pub struct PullRequestContext {
    /// PR title, possibly empty
    pub title: String,
    /// PR description, possibly empty; the composer truncates it
    pub body: String,
    /// Author's GitHub login
    pub author: String,
    /// Repository the PR belongs to
    pub repo: RepoRef,
    /// `owner/name` as reported by GitHub
    pub full_name: String,
    /// PR number (also its issue number)
    pub number: u64,
    pub merge_status: MergeStatus,
    /// GitHub App installation that delivered the event, if any
    pub installation_id: Option<u64>,
}

/// Raw `pull_request` webhook payload.
/// Every field is optional so extraction can name exactly what is missing.
#[derive(Debug, Deserialize)]
pub struct PullRequestEvent {
    pub action: Option<String>,
    pub pull_request: Option<PullRequestPayload>,
    pub repository: Option<RepositoryPayload>,
    pub installation: Option<InstallationPayload>,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestPayload {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub user: Option<UserPayload>,
    pub mergeable: Option<bool>,
    pub mergeable_state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryPayload {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub owner: Option<UserPayload>,
}

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InstallationPayload {
    pub id: u64,
}
