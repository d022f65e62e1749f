//! Line-oriented chat loop.

use pagechat_ai::all_models;
use pagechat_common::PageChatError;
use pagechat_config::{PrefKey, PrefService};
use pagechat_driver::{DriverError, SessionHandle, SubmitOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

const HELP: &str = "\
Type a question to send it. Commands:
  /ask N        send suggestion number N
  /questions    suggest questions about the page
  /retry        resend the last question
  /clear        start the conversation over
  /model KEY    switch model (/models lists them)
  /auto on|off  generate suggestions automatically
  /agree        accept the disclaimer and opt in
  /quit         exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Turn(String),
    Ask(usize),
    Questions,
    Retry,
    Clear,
    Model(String),
    Models,
    AutoQuestions(bool),
    Agree,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Turn(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match (name, arg) {
        ("quit" | "exit" | "q", "") => Input::Quit,
        ("help" | "?", "") => Input::Help,
        ("retry", "") => Input::Retry,
        ("questions", "") => Input::Questions,
        ("clear", "") => Input::Clear,
        ("models", "") => Input::Models,
        ("agree", "") => Input::Agree,
        ("model", key) if !key.is_empty() => Input::Model(key.to_string()),
        ("ask", n) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Input::Ask(n),
            _ => Input::Unknown(line.to_string()),
        },
        ("auto", "on") => Input::AutoQuestions(true),
        ("auto", "off") => Input::AutoQuestions(false),
        _ => Input::Unknown(line.to_string()),
    }
}

/// Read lines until `/quit` or end of input.
pub async fn run<R>(input: R, session: &SessionHandle, prefs: &PrefService) -> Result<(), PageChatError>
where
    R: AsyncBufRead + Unpin,
{
    println!("{HELP}");
    if !prefs.get_boolean(PrefKey::HasSeenDisclaimer) {
        println!("Questions are held until you opt in with /agree (or start with --yes).");
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let input = parse_line(&line);
        debug!(?input, "repl input");
        match input {
            Input::Empty => {}
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Turn(text) => submit(session, text).await?,
            Input::Ask(n) => {
                let snapshot = session.snapshot().await?;
                match snapshot.suggested.questions.get(n - 1) {
                    Some(question) => {
                        println!("> {question}");
                        submit(session, question.clone()).await?;
                    }
                    None => println!("[no suggestion number {n}]"),
                }
            }
            Input::Questions => session.generate_questions().await?,
            Input::Retry => session.retry().await?,
            Input::Clear => {
                session.clear_history().await?;
                println!("[conversation cleared]");
            }
            Input::Model(key) => match session.change_model(key.as_str()).await {
                Ok(()) => println!("[model: {key}]"),
                Err(DriverError::UnknownModel(key)) => {
                    println!("[unknown model {key}, try /models]");
                }
                Err(e) => return Err(e.into()),
            },
            Input::Models => {
                let current = session.snapshot().await?.model_key;
                for model in all_models() {
                    let marker = if model.key == current { '*' } else { ' ' };
                    println!(
                        "{marker} {:<22} {} {}",
                        model.key, model.display_maker, model.display_name
                    );
                }
            }
            Input::AutoQuestions(enabled) => {
                prefs.set_boolean(PrefKey::AutoGenerateQuestions, enabled)?;
                println!("[automatic suggestions {}]", if enabled { "on" } else { "off" });
            }
            Input::Agree => {
                prefs.set_boolean(PrefKey::HasSeenDisclaimer, true)?;
                println!("[opted in]");
            }
            Input::Unknown(line) => println!("[unknown command {line}, try /help]"),
        }
    }
    Ok(())
}

async fn submit(session: &SessionHandle, text: String) -> Result<(), PageChatError> {
    match session.submit(text).await? {
        SubmitOutcome::Sent => {}
        SubmitOutcome::Queued => println!("[held until you opt in with /agree]"),
        SubmitOutcome::Busy => println!("[still answering, try again when it finishes]"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pagechat_ai::{EngineSettings, RemoteEngineFactory, DEFAULT_MODEL_KEY};
    use pagechat_driver::ChatSession;
    use url::Url;

    use super::*;
    use crate::page::CliPageHost;

    #[test]
    fn plain_text_is_a_turn() {
        assert_eq!(
            parse_line("  What is this about?  "),
            Input::Turn("What is this about?".into())
        );
        assert_eq!(parse_line("   "), Input::Empty);
    }

    #[test]
    fn commands() {
        assert_eq!(parse_line("/quit"), Input::Quit);
        assert_eq!(parse_line("/exit"), Input::Quit);
        assert_eq!(parse_line("/retry"), Input::Retry);
        assert_eq!(parse_line("/questions"), Input::Questions);
        assert_eq!(parse_line("/clear"), Input::Clear);
        assert_eq!(parse_line("/models"), Input::Models);
        assert_eq!(parse_line("/agree"), Input::Agree);
        assert_eq!(parse_line("/help"), Input::Help);
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(
            parse_line("/model  chat-claude-instant "),
            Input::Model("chat-claude-instant".into())
        );
        assert_eq!(parse_line("/ask 2"), Input::Ask(2));
        assert_eq!(parse_line("/auto on"), Input::AutoQuestions(true));
        assert_eq!(parse_line("/auto off"), Input::AutoQuestions(false));
    }

    #[test]
    fn bad_arguments_are_unknown() {
        assert_eq!(parse_line("/model"), Input::Unknown("/model".into()));
        assert_eq!(parse_line("/ask 0"), Input::Unknown("/ask 0".into()));
        assert_eq!(parse_line("/ask two"), Input::Unknown("/ask two".into()));
        assert_eq!(parse_line("/auto maybe"), Input::Unknown("/auto maybe".into()));
        assert_eq!(parse_line("/retry now"), Input::Unknown("/retry now".into()));
        assert_eq!(parse_line("/frobnicate"), Input::Unknown("/frobnicate".into()));
    }

    /// A handle whose session has already gone away.
    fn closed_handle(prefs: &Arc<PrefService>) -> SessionHandle {
        let host = CliPageHost::new(Url::parse("data:,page").unwrap(), false).unwrap();
        let (session, handle) = ChatSession::new(
            prefs.clone(),
            Arc::new(RemoteEngineFactory::new(EngineSettings::default())),
            Arc::new(host),
            DEFAULT_MODEL_KEY,
        )
        .unwrap();
        drop(session);
        handle
    }

    #[tokio::test]
    async fn agree_and_auto_update_prefs() {
        let prefs = Arc::new(PrefService::new(Default::default()));
        let session = closed_handle(&prefs);

        // Nothing after /quit is read
        let input: &[u8] = b"/agree\n/auto on\n/quit\nhello\n";
        run(input, &session, &prefs).await.unwrap();

        assert!(prefs.get_boolean(PrefKey::HasSeenDisclaimer));
        assert!(prefs.get_boolean(PrefKey::AutoGenerateQuestions));
    }

    #[tokio::test]
    async fn closed_session_is_an_error() {
        let prefs = Arc::new(PrefService::new(Default::default()));
        let session = closed_handle(&prefs);

        let input: &[u8] = b"hello\n";
        let err = run(input, &session, &prefs).await.unwrap_err();
        let PageChatError::Driver(source) = &err else {
            panic!("expected a driver error, got {err:?}");
        };
        assert!(matches!(
            source.downcast_ref::<DriverError>(),
            Some(DriverError::SessionClosed)
        ));
    }

    #[tokio::test]
    async fn end_of_input_stops_cleanly() {
        let prefs = Arc::new(PrefService::new(Default::default()));
        let session = closed_handle(&prefs);

        let input: &[u8] = b"\n/frobnicate\n";
        run(input, &session, &prefs).await.unwrap();
    }
}
