use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

use crate::comment::CommentGenerator;
use crate::github::{CommentPostError, CommentPoster, CommentTarget};
use crate::pr::{MergeStatus, PullRequestContext};
use crate::report;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Failed to post merge-conflict warning: {0}")]
    ConflictWarning(#[source] CommentPostError),
}

/// A side effect the handler wants performed for an opened pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Tell the author their branch conflicts with the base.
    WarnConflict { body: String },
    /// Generate the greeting (or fall back) and post it.
    PostGenerated,
}

/// Decide what to post for an opened pull request. Pure.
pub fn plan(ctx: &PullRequestContext) -> Vec<Action> {
    let mut actions = Vec::with_capacity(2);
    if ctx.merge_status == MergeStatus::Conflicted {
        actions.push(Action::WarnConflict {
            body: conflict_warning(&ctx.author),
        });
    }
    actions.push(Action::PostGenerated);
    actions
}

fn conflict_warning(author: &str) -> String {
    format!(
        "@{} :warning: This pull request has merge conflicts with the base branch. \
         Please rebase or merge the latest changes and resolve the conflicts so it can be reviewed.",
        author
    )
}

/// Performs a plan against GitHub.
#[derive(Clone)]
pub struct Responder {
    comments: CommentGenerator,
    poster: Arc<dyn CommentPoster>,
}

impl Responder {
    pub fn new(comments: CommentGenerator, poster: Arc<dyn CommentPoster>) -> Self {
        Self { comments, poster }
    }

    /// Handle one opened pull request.
    ///
    /// A failed conflict warning aborts the delivery. A failed greeting is
    /// reported and swallowed: the delivery still counts as handled.
    #[instrument(skip_all, fields(repo = %ctx.full_name, pr = ctx.number))]
    pub async fn respond(&self, ctx: &PullRequestContext) -> Result<(), HandlerError> {
        let target = CommentTarget::for_pull_request(ctx);

        for action in plan(ctx) {
            match action {
                Action::WarnConflict { body } => {
                    info!(author = %ctx.author, "pull request has merge conflicts, warning author");
                    self.poster
                        .create_comment(&target, &body)
                        .await
                        .map_err(HandlerError::ConflictWarning)?;
                }
                Action::PostGenerated => {
                    let body = self.comments.get_comment(ctx).await;
                    match self.poster.create_comment(&target, &body).await {
                        Ok(()) => report::report_post_success(&target),
                        Err(e) => report::report_post_failure(&target, &e),
                    }
                }
            }
        }
        Ok(())
    }
}
