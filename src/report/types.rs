use thiserror::Error;

use crate::handler::HandlerError;
use crate::pr::PrError;
use crate::server::signature::SignatureError;

/// Anything that stops a webhook delivery from being processed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Rejected webhook signature: {0}")]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Payload(#[from] PrError),

    /// The handler itself failed; carries the delivery it was processing.
    #[error("Handler failed for delivery {delivery_id}: {source}")]
    Handler {
        delivery_id: String,
        #[source]
        source: HandlerError,
    },
}
