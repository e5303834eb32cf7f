//! # Contracts
//!
//! Frozen interface contracts shared by every relay crate: destination
//! identifiers, registry entries, delivery results, the `Transport` trait and
//! the `RelayBlueprint` configuration model.
//! Business crates depend on this crate, never the other way around.
//!
//! ## Identity Model
//! - A destination is an opaque chat identifier (`ChatId`), compared as a string
//! - Display names are best-effort labels and never part of identity

mod blueprint;
mod chat_id;
mod delivery;
mod entry;
mod error;
mod transport;

pub use blueprint::*;
pub use chat_id::ChatId;
pub use delivery::*;
pub use entry::*;
pub use error::*;
pub use transport::{LocalTransport, Transport};
