//! Preference store with change notification.
//!
//! Holds the `[chat]` section of the config in memory, persists writes
//! back to the config file, and broadcasts the key of every preference
//! whose value actually changed.

mod service;


pub use service::{PrefKey, PrefService};
