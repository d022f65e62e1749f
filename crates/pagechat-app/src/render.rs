//! Terminal output for chat events.

use std::io::{self, Write};

use pagechat_common::{ApiError, ChatEvent, CharacterType, ConversationTurn};
use tokio::sync::broadcast;
use tracing::warn;

/// Prints streamed answers incrementally: each `HistoryUpdated` carries the
/// whole conversation, and only the part of the trailing answer not yet on
/// screen is written.
pub struct Renderer<W: Write> {
    out: W,
    /// Index of the assistant turn being streamed.
    streaming: Option<usize>,
    printed: String,
    line_open: bool,
    turns_seen: usize,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            streaming: None,
            printed: String::new(),
            line_open: false,
            turns_seen: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render(&mut self, event: &ChatEvent) -> io::Result<()> {
        match event {
            ChatEvent::HistoryUpdated { history } => self.history(history)?,
            ChatEvent::PageHasContent { has_content } => {
                if *has_content {
                    writeln!(self.out, "[page loaded]")?;
                } else {
                    self.finish_line()?;
                    writeln!(self.out, "[no page content]")?;
                }
            }
            ChatEvent::SuggestedQuestionsChanged { questions, .. } => {
                if !questions.is_empty() {
                    self.finish_line()?;
                    writeln!(self.out, "Suggestions:")?;
                    for (i, question) in questions.iter().enumerate() {
                        writeln!(self.out, "  {}. {question}", i + 1)?;
                    }
                }
            }
            ChatEvent::RequestInProgress(false) => self.finish_line()?,
            ChatEvent::ApiResponseError(Some(error)) => {
                self.finish_line()?;
                writeln!(self.out, "error: {} ({})", error, error_hint(*error))?;
            }
            ChatEvent::RequestInProgress(true)
            | ChatEvent::ApiResponseError(None)
            | ChatEvent::FaviconImageDataChanged
            | ChatEvent::Shutdown
            | ChatEvent::Unknown => {}
        }
        self.out.flush()
    }

    fn history(&mut self, history: &[ConversationTurn]) -> io::Result<()> {
        if history.len() < self.turns_seen {
            // Cleared or truncated for a retry
            self.finish_line()?;
            self.streaming = None;
            self.printed.clear();
        }
        self.turns_seen = history.len();

        let Some((index, last)) = history.iter().enumerate().next_back() else {
            return Ok(());
        };
        if last.character_type != CharacterType::Assistant {
            return Ok(());
        }

        if self.streaming != Some(index) {
            self.finish_line()?;
            self.streaming = Some(index);
            self.printed.clear();
            write!(self.out, "assistant> ")?;
            self.line_open = true;
        }

        match last.text.strip_prefix(self.printed.as_str()) {
            Some("") => {}
            Some(rest) => {
                write!(self.out, "{rest}")?;
                self.line_open = true;
            }
            None => {
                // The answer was rewritten rather than extended
                if self.line_open {
                    writeln!(self.out)?;
                }
                write!(self.out, "assistant> {}", last.text)?;
                self.line_open = true;
            }
        }
        self.printed.clone_from(&last.text);
        Ok(())
    }

    fn finish_line(&mut self) -> io::Result<()> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        Ok(())
    }
}

fn error_hint(error: ApiError) -> &'static str {
    match error {
        ApiError::ConnectionIssue => "check the engine URL and try /retry",
        ApiError::RateLimitReached => "wait a moment, then /retry",
        ApiError::InternalError => "the engine rejected the request",
    }
}

/// Render bus events to stdout until shutdown.
pub async fn run(mut events: broadcast::Receiver<ChatEvent>) {
    let mut renderer = Renderer::new(io::stdout());
    loop {
        match events.recv().await {
            Ok(ChatEvent::Shutdown) | Err(broadcast::error::RecvError::Closed) => break,
            Ok(event) => {
                if let Err(e) = renderer.render(&event) {
                    warn!(error = %e, "failed to write to terminal");
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "renderer fell behind");
            }
        }
    }
}
