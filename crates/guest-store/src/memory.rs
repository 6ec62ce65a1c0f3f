use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    Guest, GuestId, Result, Rsvp, SecondaryGuest, StoreError,
    store::{GuestStore, RsvpCommit},
};

#[derive(Default)]
struct Tables {
    guests: HashMap<GuestId, Guest>,
    secondary_guests: Vec<SecondaryGuest>,
}

/// In-memory guest store for tests and local runs.
///
/// Both tables sit behind one lock so an RSVP commit is observed
/// all-or-nothing, matching the PostgreSQL transaction.
#[derive(Clone, Default)]
pub struct InMemoryGuestStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryGuestStore {
    /// Creates a new empty in-memory guest store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of primary guests stored.
    pub async fn guest_count(&self) -> usize {
        self.tables.read().await.guests.len()
    }

    /// Returns the number of secondary guests stored across all parties.
    pub async fn secondary_guest_count(&self) -> usize {
        self.tables.read().await.secondary_guests.len()
    }
}

#[async_trait]
impl GuestStore for InMemoryGuestStore {
    async fn insert_guest(&self, guest: &Guest) -> Result<()> {
        let mut tables = self.tables.write().await;

        let taken = tables
            .guests
            .values()
            .any(|g| g.first_name == guest.first_name && g.last_name == guest.last_name);
        if taken {
            return Err(StoreError::DuplicateGuest {
                first_name: guest.first_name.clone(),
                last_name: guest.last_name.clone(),
            });
        }

        tables.guests.insert(guest.guest_id, guest.clone());
        Ok(())
    }

    async fn find_guest_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Guest>> {
        let tables = self.tables.read().await;
        Ok(tables
            .guests
            .values()
            .find(|g| g.first_name == first_name && g.last_name == last_name)
            .cloned())
    }

    async fn get_guest(&self, guest_id: GuestId) -> Result<Option<Guest>> {
        Ok(self.tables.read().await.guests.get(&guest_id).cloned())
    }

    async fn set_rsvp(
        &self,
        guest_id: GuestId,
        rsvp: Rsvp,
        selection: i16,
        updated_at: DateTime<Utc>,
    ) -> Result<Guest> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .guests
            .get_mut(&guest_id)
            .ok_or(StoreError::GuestNotFound(guest_id))?;
        stored.rsvp = rsvp;
        stored.selection = selection;
        stored.updated_at = updated_at;
        Ok(stored.clone())
    }

    async fn commit_rsvp(&self, commit: RsvpCommit) -> Result<Guest> {
        commit.validate()?;
        let seats = commit.seats();
        let RsvpCommit { guest, party } = commit;

        let mut tables = self.tables.write().await;

        // Conditional write: only a still-pending row with enough seats left.
        let stored = tables
            .guests
            .get_mut(&guest.guest_id)
            .ok_or(StoreError::GuestNotFound(guest.guest_id))?;
        if !stored.rsvp.is_pending() || stored.avail_guests < seats {
            return Err(StoreError::ConcurrencyConflict {
                guest_id: guest.guest_id,
            });
        }
        stored.avail_guests -= seats;
        stored.rsvp = guest.rsvp;
        stored.selection = guest.selection;
        stored.updated_at = guest.updated_at;
        let updated = stored.clone();

        tables.secondary_guests.extend(party);
        Ok(updated)
    }

    async fn secondary_guests_for(
        &self,
        primary_guest_id: GuestId,
    ) -> Result<Vec<SecondaryGuest>> {
        let tables = self.tables.read().await;
        Ok(tables
            .secondary_guests
            .iter()
            .filter(|s| s.primary_guest_id == primary_guest_id)
            .cloned()
            .collect())
    }
}
