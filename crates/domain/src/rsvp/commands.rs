//! RSVP commands.

use guest_store::Rsvp;

use super::value_objects::join_field;
use super::{Decision, FieldError, GuestName};

/// One person in a submission: the primary guest or a party member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyMember {
    pub name: GuestName,
    pub decision: Decision,
}

impl PartyMember {
    pub fn new(name: GuestName, decision: Decision) -> Self {
        Self { name, decision }
    }

    /// Validates a raw person, reporting every failing field under `prefix`.
    pub fn parse_at(
        prefix: &str,
        first_name: &str,
        last_name: &str,
        rsvp: Rsvp,
        selection: i64,
    ) -> Result<Self, Vec<FieldError>> {
        let name = GuestName::parse_at(prefix, first_name, last_name);
        let decision = Decision::parse_at(prefix, rsvp, selection);
        match (name, decision) {
            (Ok(name), Ok(decision)) => Ok(Self { name, decision }),
            (name, decision) => {
                let mut errors = name.err().unwrap_or_default();
                errors.extend(decision.err());
                Err(errors)
            }
        }
    }
}

/// Command to record a primary guest's decision and attach their party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRsvp {
    /// The primary guest making the submission.
    pub guest: PartyMember,

    /// Additional guests, in submission order.
    pub party: Vec<PartyMember>,
}

impl SubmitRsvp {
    pub fn new(guest: PartyMember, party: Vec<PartyMember>) -> Self {
        Self { guest, party }
    }

    /// Creates a submission without a party.
    pub fn alone(guest: PartyMember) -> Self {
        Self::new(guest, Vec::new())
    }
}

/// Command to overwrite a guest's RSVP status (administrator override).
///
/// `None` reopens the guest as pending; otherwise the decision carries the
/// selection that must go with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRsvp {
    pub name: GuestName,
    pub decision: Option<Decision>,
}

impl UpdateRsvp {
    pub fn decided(name: GuestName, decision: Decision) -> Self {
        Self {
            name,
            decision: Some(decision),
        }
    }

    /// Creates an override that puts the guest back to pending.
    pub fn reopen(name: GuestName) -> Self {
        Self {
            name,
            decision: None,
        }
    }

    /// Validates a raw override. Pending takes no selection.
    pub fn parse_at(
        prefix: &str,
        first_name: &str,
        last_name: &str,
        rsvp: Rsvp,
        selection: i64,
    ) -> Result<Self, Vec<FieldError>> {
        let name = GuestName::parse_at(prefix, first_name, last_name);
        let decision = match rsvp {
            Rsvp::Pending if selection != 0 => Err(FieldError::new(
                join_field(prefix, "selection"),
                "must be 0 when pending",
            )),
            Rsvp::Pending => Ok(None),
            decided => Decision::parse_at(prefix, decided, selection).map(Some),
        };
        match (name, decision) {
            (Ok(name), Ok(decision)) => Ok(Self { name, decision }),
            (name, decision) => {
                let mut errors = name.err().unwrap_or_default();
                errors.extend(decision.err());
                Err(errors)
            }
        }
    }

    /// Returns the status to store.
    pub fn rsvp(&self) -> Rsvp {
        self.decision.map_or(Rsvp::Pending, |d| d.rsvp())
    }

    /// Returns the selection to store (0 unless attending).
    pub fn selection(&self) -> i16 {
        self.decision.map_or(0, |d| d.selection())
    }
}
