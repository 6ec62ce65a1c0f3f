use async_trait::async_trait;

use chrono::{DateTime, Utc};

use crate::{Guest, GuestId, Result, Rsvp, SecondaryGuest, StoreError};

/// The writes produced by an accepted RSVP submission.
///
/// A commit is applied atomically: the guest row is only updated if it is
/// still `PENDING`, and the party rows are inserted in the same transaction.
#[derive(Debug, Clone)]
pub struct RsvpCommit {
    /// The primary guest with its new status, selection and capacity.
    pub guest: Guest,
    /// Party members to insert, in submission order.
    pub party: Vec<SecondaryGuest>,
}

impl RsvpCommit {
    pub fn new(guest: Guest, party: Vec<SecondaryGuest>) -> Self {
        Self { guest, party }
    }

    /// Number of seats the party takes from the primary's capacity.
    pub fn seats(&self) -> i32 {
        i32::try_from(self.party.len()).unwrap_or(i32::MAX)
    }

    /// Checks that the commit is internally consistent.
    pub fn validate(&self) -> Result<()> {
        if self.guest.rsvp.is_pending() {
            return Err(StoreError::InvalidCommit(
                "guest RSVP must be decided".to_string(),
            ));
        }
        if self.guest.avail_guests < 0 {
            return Err(StoreError::InvalidCommit(format!(
                "avail_guests would become negative ({})",
                self.guest.avail_guests
            )));
        }
        if let Some(member) = self
            .party
            .iter()
            .find(|m| m.primary_guest_id != self.guest.guest_id)
        {
            return Err(StoreError::InvalidCommit(format!(
                "party member {} belongs to primary {}, not {}",
                member.guest_id, member.primary_guest_id, self.guest.guest_id
            )));
        }
        Ok(())
    }
}

/// Persistence for guests and their parties.
///
/// All implementations must be thread-safe (Send + Sync). Names passed to
/// lookups are expected to be lower-cased already.
#[async_trait]
pub trait GuestStore: Send + Sync {
    /// Provisions a new guest row.
    ///
    /// Fails with `DuplicateGuest` if the name pair is already taken.
    async fn insert_guest(&self, guest: &Guest) -> Result<()>;

    /// Finds a guest by exact first and last name.
    async fn find_guest_by_name(&self, first_name: &str, last_name: &str)
    -> Result<Option<Guest>>;

    /// Loads a guest by identifier.
    async fn get_guest(&self, guest_id: GuestId) -> Result<Option<Guest>>;

    /// Overwrites a guest's status, selection and modification time.
    ///
    /// No status check is performed and `avail_guests` is never written.
    /// Returns the stored row.
    async fn set_rsvp(
        &self,
        guest_id: GuestId,
        rsvp: Rsvp,
        selection: i16,
        updated_at: DateTime<Utc>,
    ) -> Result<Guest>;

    /// Applies an accepted RSVP.
    ///
    /// Capacity is decremented by the party size relative to the stored
    /// row. Fails with `ConcurrencyConflict` if the stored guest is no
    /// longer `PENDING` or has fewer seats left than the party needs; in
    /// that case nothing is written.
    async fn commit_rsvp(&self, commit: RsvpCommit) -> Result<Guest>;

    /// Lists the party members recorded for a primary guest, oldest first.
    async fn secondary_guests_for(&self, primary_guest_id: GuestId)
    -> Result<Vec<SecondaryGuest>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decided_guest() -> Guest {
        let mut guest = Guest::new("jane", "doe", "family", 1);
        guest.rsvp = Rsvp::Attending;
        guest.selection = 1;
        guest
    }

    #[test]
    fn valid_commit_passes() {
        let guest = decided_guest();
        let member = SecondaryGuest::new(guest.guest_id, "jon", "doe", Rsvp::Attending, 2);
        assert!(RsvpCommit::new(guest, vec![member]).validate().is_ok());
    }

    #[test]
    fn pending_commit_is_rejected() {
        let guest = Guest::new("jane", "doe", "family", 1);
        let err = RsvpCommit::new(guest, vec![]).validate().unwrap_err();
        assert!(matches!(err, StoreError::InvalidCommit(_)));
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let mut guest = decided_guest();
        guest.avail_guests = -1;
        assert!(RsvpCommit::new(guest, vec![]).validate().is_err());
    }

    #[test]
    fn foreign_party_member_is_rejected() {
        let guest = decided_guest();
        let member = SecondaryGuest::new(GuestId::new(), "jon", "doe", Rsvp::Attending, 2);
        let err = RsvpCommit::new(guest, vec![member]).validate().unwrap_err();
        assert!(err.to_string().contains("belongs to primary"));
    }
}
