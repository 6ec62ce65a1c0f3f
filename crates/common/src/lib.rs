//! Identifier types shared by the store, domain and API crates.

pub mod types;

pub use types::GuestId;
