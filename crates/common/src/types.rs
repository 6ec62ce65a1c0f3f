use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a guest record.
///
/// Primary guests and secondary (party) guests share the same identifier
/// space, so a secondary guest's `primary_guest_id` is also a `GuestId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(Uuid);

impl GuestId {
    /// Creates a new random guest ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a guest ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for GuestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GuestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for GuestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<GuestId> for Uuid {
    fn from(id: GuestId) -> Self {
        id.0
    }
}
