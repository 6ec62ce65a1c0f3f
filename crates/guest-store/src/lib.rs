pub mod error;
pub mod guest;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::GuestId;
pub use error::{Result, StoreError};
pub use guest::{Guest, Rsvp, SecondaryGuest};
pub use memory::InMemoryGuestStore;
pub use postgres::PostgresGuestStore;
pub use store::{GuestStore, RsvpCommit};
