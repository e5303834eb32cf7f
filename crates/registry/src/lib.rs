//! # Registry
//!
//! Durable chat registry.
//!
//! Responsibilities:
//! - Remember every destination seen, one `id|display_name` line each
//! - Deduplicate by id (first display name wins)
//! - Serve insertion-ordered snapshots to the dispatcher
//!
//! # Example
//!
//! ```no_run
//! use registry::Registry;
//!
//! let registry = Registry::open("chat_ids.txt").unwrap();
//! registry.register("5239347550", Some("Alice")).unwrap();
//! for entry in registry.load_all().unwrap() {
//!     println!("{} -> {}", entry.id, entry.display_name);
//! }
//! ```

mod error;
pub mod record;
mod registry;

pub use contracts::{ChatId, RegistryEntry, UNKNOWN_DISPLAY_NAME};
pub use error::RegistryError;
pub use registry::{Registration, Registry};
