use thiserror::Error;

use crate::GuestId;

/// Errors that can occur when interacting with the guest store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No guest row exists with the given identifier.
    #[error("Guest not found: {0}")]
    GuestNotFound(GuestId),

    /// The guest row changed between read and commit: it is no longer
    /// pending, or its remaining capacity is too small for the party.
    #[error("Concurrency conflict for guest {guest_id}: row changed since it was read")]
    ConcurrencyConflict { guest_id: GuestId },

    /// A guest with the same name pair is already provisioned.
    #[error("Guest already exists: {first_name} {last_name}")]
    DuplicateGuest {
        first_name: String,
        last_name: String,
    },

    /// A stored column held a value outside its domain.
    #[error("Invalid value {value:?} in column {column}")]
    InvalidColumn { column: &'static str, value: String },

    /// The commit was rejected before touching the database.
    #[error("Invalid RSVP commit: {0}")]
    InvalidCommit(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for guest store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
