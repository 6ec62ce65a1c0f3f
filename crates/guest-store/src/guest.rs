//! Guest and secondary guest records.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GuestId, StoreError};

/// RSVP status of a guest.
///
/// Stored as text in the `rsvp` column. `Pending` is the only state a
/// submission can move away from:
/// ```text
/// Pending ──┬──► Attending
///           └──► NotAttending
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rsvp {
    Attending,
    NotAttending,
    #[default]
    Pending,
}

impl Rsvp {
    /// Returns true if no decision has been recorded yet.
    pub fn is_pending(&self) -> bool {
        matches!(self, Rsvp::Pending)
    }

    /// Returns the column text for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rsvp::Attending => "ATTENDING",
            Rsvp::NotAttending => "NOT_ATTENDING",
            Rsvp::Pending => "PENDING",
        }
    }
}

impl std::fmt::Display for Rsvp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Rsvp {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ATTENDING" => Ok(Rsvp::Attending),
            "NOT_ATTENDING" => Ok(Rsvp::NotAttending),
            "PENDING" => Ok(Rsvp::Pending),
            other => Err(StoreError::InvalidColumn {
                column: "rsvp",
                value: other.to_string(),
            }),
        }
    }
}

/// A primary invitee and the capacity their invitation carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub guest_id: GuestId,
    pub first_name: String,
    pub last_name: String,
    pub guest_type: String,
    /// Remaining number of secondary guests this invitee may still bring.
    pub avail_guests: i32,
    pub rsvp: Rsvp,
    /// Meal choice, non-zero only while attending.
    pub selection: i16,
    pub updated_at: DateTime<Utc>,
}

impl Guest {
    /// Creates a pending guest with a fresh identifier.
    ///
    /// Names are lower-cased so they match case-insensitive lookups.
    pub fn new(
        first_name: impl AsRef<str>,
        last_name: impl AsRef<str>,
        guest_type: impl Into<String>,
        avail_guests: i32,
    ) -> Self {
        Self {
            guest_id: GuestId::new(),
            first_name: first_name.as_ref().to_lowercase(),
            last_name: last_name.as_ref().to_lowercase(),
            guest_type: guest_type.into(),
            avail_guests,
            rsvp: Rsvp::Pending,
            selection: 0,
            updated_at: Utc::now(),
        }
    }
}

/// A party member attached to a primary guest's RSVP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryGuest {
    pub guest_id: GuestId,
    pub primary_guest_id: GuestId,
    pub first_name: String,
    pub last_name: String,
    pub rsvp: Rsvp,
    pub selection: i16,
    pub created_at: DateTime<Utc>,
}

impl SecondaryGuest {
    /// Creates a party member owned by `primary_guest_id`.
    pub fn new(
        primary_guest_id: GuestId,
        first_name: impl AsRef<str>,
        last_name: impl AsRef<str>,
        rsvp: Rsvp,
        selection: i16,
    ) -> Self {
        Self {
            guest_id: GuestId::new(),
            primary_guest_id,
            first_name: first_name.as_ref().to_lowercase(),
            last_name: last_name.as_ref().to_lowercase(),
            rsvp,
            selection,
            created_at: Utc::now(),
        }
    }
}
