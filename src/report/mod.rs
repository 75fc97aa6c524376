pub mod types;

pub use types::DeliveryError;

use tracing::{error, info};

use crate::github::{CommentPostError, CommentTarget};

/// Record a successfully posted greeting.
pub fn report_post_success(target: &CommentTarget) {
    info!(
        repo = %format!("{}/{}", target.repo.owner, target.repo.name),
        pr = target.number,
        "posted comment"
    );
}

/// Record a failed comment post. Structured API failures log status and
/// message; anything else logs the raw error.
pub fn report_post_failure(target: &CommentTarget, err: &CommentPostError) {
    match err {
        CommentPostError::Api { status, message } => {
            error!(target_pr = %target, status = *status, message = %message, "failed to post comment");
        }
        other => {
            error!(target_pr = %target, error = %other, "failed to post comment");
        }
    }
}

/// Record a delivery that could not be processed. Observational only.
pub fn report_delivery_error(err: &DeliveryError) {
    match err {
        DeliveryError::Handler { delivery_id, source } => {
            error!(delivery = %delivery_id, error = %source, "error processing webhook delivery");
        }
        other => {
            error!(error = %other, "error processing webhook delivery");
        }
    }
}
