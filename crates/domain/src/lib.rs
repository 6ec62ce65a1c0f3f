//! Domain layer for the RSVP service.
//!
//! This crate provides:
//! - validated value objects for guest names and RSVP decisions
//! - the RSVP workflow (status transition and capacity rules)
//! - `RsvpService`, which applies commands to a `GuestStore`

pub mod error;
pub mod rsvp;

pub use error::DomainError;
pub use rsvp::{
    Decision, FieldError, GuestName, PartyMember, RsvpError, RsvpService, Selection, SubmitRsvp,
    UpdateRsvp, ValidationError, plan_rsvp,
};
