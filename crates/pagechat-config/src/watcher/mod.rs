//! File watcher for live config reload.
//!
//! Uses the `notify` crate to watch the config file for changes,
//! debounced so editor save sequences produce a single reload.

mod config_watcher;


pub use config_watcher::{ConfigWatcher, DEBOUNCE};
