//! Transition and capacity rules for an RSVP submission.

use chrono::{DateTime, Utc};
use guest_store::{Guest, RsvpCommit, SecondaryGuest};

use super::{RsvpError, SubmitRsvp};

/// Decides whether `submission` may be applied to the stored `guest` and
/// builds the writes if so.
///
/// Pure: nothing is persisted, so a rejection leaves the store untouched.
pub fn plan_rsvp(
    guest: &Guest,
    submission: &SubmitRsvp,
    now: DateTime<Utc>,
) -> Result<RsvpCommit, RsvpError> {
    let decision = submission.guest.decision;

    if !guest.rsvp.is_pending() || decision.rsvp() == guest.rsvp {
        return Err(RsvpError::AlreadyDecided {
            first_name: guest.first_name.clone(),
            last_name: guest.last_name.clone(),
            current: guest.rsvp,
        });
    }

    let party_size = submission.party.len();
    let avail_guests = usize::try_from(guest.avail_guests).unwrap_or(0);
    let attending_without_capacity =
        decision.is_attending() && avail_guests == 0 && party_size > 0;
    if attending_without_capacity || party_size > avail_guests {
        return Err(RsvpError::DisallowedGuests {
            first_name: guest.first_name.clone(),
            last_name: guest.last_name.clone(),
            party_size,
            avail_guests: guest.avail_guests,
        });
    }

    let mut updated = guest.clone();
    // party_size <= avail_guests, which came from an i32.
    updated.avail_guests -= party_size as i32;
    updated.selection = decision.selection();
    updated.rsvp = decision.rsvp();
    updated.updated_at = now;

    let party = submission
        .party
        .iter()
        .map(|member| {
            SecondaryGuest::new(
                guest.guest_id,
                member.name.first_name(),
                member.name.last_name(),
                member.decision.rsvp(),
                member.decision.selection(),
            )
        })
        .collect();

    Ok(RsvpCommit::new(updated, party))
}
