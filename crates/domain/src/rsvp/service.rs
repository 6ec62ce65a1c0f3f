//! RSVP service providing the guest lookup, update and submission API.

use chrono::Utc;
use guest_store::{Guest, GuestStore, SecondaryGuest, StoreError};

use crate::error::DomainError;

use super::{GuestName, RsvpError, SubmitRsvp, UpdateRsvp, plan_rsvp};

impl From<RsvpError> for DomainError {
    fn from(e: RsvpError) -> Self {
        DomainError::Rsvp(e)
    }
}

/// Service for looking up guests and recording their RSVPs.
///
/// Holds no state besides the store; every call re-reads the
/// authoritative guest row.
pub struct RsvpService<S: GuestStore> {
    store: S,
}

impl<S: GuestStore> RsvpService<S> {
    /// Creates a new RSVP service with the given guest store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying guest store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Finds a guest by name.
    #[tracing::instrument(skip(self), fields(guest = %name))]
    pub async fn lookup_guest(&self, name: &GuestName) -> Result<Guest, DomainError> {
        let guest = self
            .store
            .find_guest_by_name(name.first_name(), name.last_name())
            .await?;

        metrics::counter!("guest_lookups_total", "found" => if guest.is_some() { "true" } else { "false" })
            .increment(1);

        guest.ok_or_else(|| RsvpError::not_found(name).into())
    }

    /// Overwrites a guest's RSVP status without any transition check.
    ///
    /// This is the administrator override: only status, selection and the
    /// modification time are written, so capacity is never touched.
    #[tracing::instrument(skip(self), fields(guest = %cmd.name, rsvp = %cmd.rsvp()))]
    pub async fn update_rsvp(&self, cmd: UpdateRsvp) -> Result<Guest, DomainError> {
        let guest = self.lookup_guest(&cmd.name).await?;

        let updated = match self
            .store
            .set_rsvp(guest.guest_id, cmd.rsvp(), cmd.selection(), Utc::now())
            .await
        {
            Ok(updated) => updated,
            Err(StoreError::GuestNotFound(_)) => return Err(RsvpError::not_found(&cmd.name).into()),
            Err(other) => return Err(other.into()),
        };
        metrics::counter!("guest_updates_total").increment(1);
        tracing::info!(guest_id = %updated.guest_id, "guest rsvp overwritten");
        Ok(updated)
    }

    /// Records a primary guest's decision and inserts their party.
    ///
    /// The guest row and party rows are written together, and only if the
    /// guest is still pending at commit time.
    #[tracing::instrument(skip(self, cmd), fields(guest = %cmd.guest.name, party_size = cmd.party.len()))]
    pub async fn submit_rsvp(&self, cmd: SubmitRsvp) -> Result<Guest, DomainError> {
        let result = self.try_submit_rsvp(&cmd).await;

        let outcome = match &result {
            Ok(_) => "accepted",
            Err(DomainError::Rsvp(RsvpError::GuestNotFound { .. })) => "not_found",
            Err(DomainError::Rsvp(RsvpError::AlreadyDecided { .. })) => "conflict",
            Err(DomainError::Rsvp(RsvpError::DisallowedGuests { .. })) => "disallowed_guests",
            Err(_) => "error",
        };
        metrics::counter!("rsvp_submissions_total", "outcome" => outcome).increment(1);

        match &result {
            Ok(guest) => tracing::info!(
                guest_id = %guest.guest_id,
                rsvp = %guest.rsvp,
                avail_guests = guest.avail_guests,
                "rsvp accepted"
            ),
            Err(e) => tracing::warn!(error = %e, outcome, "rsvp rejected"),
        }
        result
    }

    async fn try_submit_rsvp(&self, cmd: &SubmitRsvp) -> Result<Guest, DomainError> {
        let name = &cmd.guest.name;
        let guest = self.lookup_guest(name).await?;

        let commit = plan_rsvp(&guest, cmd, Utc::now())?;

        match self.store.commit_rsvp(commit).await {
            Ok(updated) => Ok(updated),
            // Another submission decided the guest between our read and commit.
            Err(StoreError::ConcurrencyConflict { guest_id }) => {
                let current = self
                    .store
                    .get_guest(guest_id)
                    .await?
                    .map_or(guest.rsvp, |g| g.rsvp);
                Err(RsvpError::AlreadyDecided {
                    first_name: guest.first_name,
                    last_name: guest.last_name,
                    current,
                }
                .into())
            }
            Err(StoreError::GuestNotFound(_)) => Err(RsvpError::not_found(name).into()),
            Err(other) => Err(other.into()),
        }
    }

    /// Lists the party members recorded for a guest.
    #[tracing::instrument(skip(self), fields(guest = %name))]
    pub async fn party_for(&self, name: &GuestName) -> Result<Vec<SecondaryGuest>, DomainError> {
        let guest = self.lookup_guest(name).await?;
        Ok(self.store.secondary_guests_for(guest.guest_id).await?)
    }
}
