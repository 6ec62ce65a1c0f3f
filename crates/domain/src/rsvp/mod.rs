//! RSVP workflow: validated submissions, transition rules and the service
//! that applies them to the guest store.

mod commands;
mod service;
mod value_objects;
mod workflow;

pub use commands::{PartyMember, SubmitRsvp, UpdateRsvp};
pub use service::RsvpService;
pub use value_objects::{
    Decision, FieldError, GuestName, MAX_NAME_LEN, MAX_SELECTION, MIN_NAME_LEN, Selection,
    ValidationError,
};
pub use workflow::plan_rsvp;

use guest_store::Rsvp;
use thiserror::Error;

/// Errors that can occur when applying an RSVP.
#[derive(Debug, Error)]
pub enum RsvpError {
    /// No guest matches the submitted name pair.
    #[error("Guest not found: {first_name} {last_name}")]
    GuestNotFound {
        first_name: String,
        last_name: String,
    },

    /// The guest has already decided, or the submission repeats the stored status.
    #[error("RSVP already decided for {first_name} {last_name} (currently {current})")]
    AlreadyDecided {
        first_name: String,
        last_name: String,
        current: Rsvp,
    },

    /// The party does not fit in the guest's remaining capacity.
    #[error(
        "Disallowed guests for {first_name} {last_name}: party of {party_size} exceeds {avail_guests} available"
    )]
    DisallowedGuests {
        first_name: String,
        last_name: String,
        party_size: usize,
        avail_guests: i32,
    },
}

impl RsvpError {
    pub(crate) fn not_found(name: &GuestName) -> Self {
        RsvpError::GuestNotFound {
            first_name: name.first_name().to_string(),
            last_name: name.last_name().to_string(),
        }
    }
}
