//! Domain error types.

use guest_store::StoreError;
use thiserror::Error;

use crate::rsvp::RsvpError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the guest store.
    #[error("Guest store error: {0}")]
    Store(#[from] StoreError),

    /// The RSVP was rejected by the workflow rules.
    #[error("RSVP error: {0}")]
    Rsvp(RsvpError),
}
