//! Per-page chat coordination for pagechat.
//!
//! [`ChatDriver`] is the conversation state machine: it decides when to fetch
//! page text, when to ask the engine for suggested questions, and when a user
//! turn may be sent, then folds the asynchronous results back into history
//! and tells its observers. [`ChatSession`] runs a driver on a single task and
//! feeds it host commands, engine results and preference changes.

pub mod dispatch;
pub mod driver;
pub mod error;
pub mod host;
pub mod metrics;
pub mod observer;
pub mod session;

#[cfg(test)]
mod testing;

pub use dispatch::{Emitter, EngineEvent, EngineEventKind};
pub use driver::{ChatDriver, SubmitOutcome, SuggestedQuestions};
pub use error::DriverError;
pub use host::{PageContent, PageHost};
pub use metrics::{ChatMetrics, UsageMetrics, UsageSnapshot};
pub use observer::{BusObserver, ChatObserver, ObserverId};
pub use session::{ChatCommand, ChatSession, SessionHandle, SessionSnapshot};
