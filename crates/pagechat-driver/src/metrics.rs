//! Usage counters for chat activity.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Sink for usage events the driver records.
pub trait ChatMetrics: Send + Sync {
    /// The user has opted in to the feature.
    fn record_enabled(&self);

    /// A conversation received its first turn.
    fn record_new_chat(&self);

    /// The user sent a prompt.
    fn record_new_prompt(&self);
}

/// In-process counters.
///
/// `enabled` latches: repeated opt-in notifications count once.
#[derive(Debug, Default)]
pub struct UsageMetrics {
    enabled: AtomicBool,
    chats: AtomicU64,
    prompts: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub enabled: bool,
    pub chats: u64,
    pub prompts: u64,
}

impl UsageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            enabled: self.enabled.load(Ordering::Relaxed),
            chats: self.chats.load(Ordering::Relaxed),
            prompts: self.prompts.load(Ordering::Relaxed),
        }
    }
}

impl ChatMetrics for UsageMetrics {
    fn record_enabled(&self) {
        if !self.enabled.swap(true, Ordering::Relaxed) {
            tracing::debug!("chat enabled");
        }
    }

    fn record_new_chat(&self) {
        self.chats.fetch_add(1, Ordering::Relaxed);
    }

    fn record_new_prompt(&self) {
        self.prompts.fetch_add(1, Ordering::Relaxed);
    }
}
