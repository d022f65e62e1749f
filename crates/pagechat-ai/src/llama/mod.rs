//! Llama 2 chat engine.
//!
//! Talks to a llama.cpp-compatible `/completion` server. The conversation is
//! rendered into a single Llama 2 chat prompt (`[INST]` / `<<SYS>>` markers)
//! and the answer streams back as SSE `data:` lines carrying `content`.

mod api;
mod client;
mod prompt;

pub use client::LlamaRemote;
