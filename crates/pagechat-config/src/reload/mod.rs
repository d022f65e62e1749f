//! Live config reload: the file watcher plus a validated re-read, feeding a
//! `watch` channel the chat session follows.

mod manager;


pub use manager::ReloadManager;
