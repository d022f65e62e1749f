use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use pagechat_ai::DEFAULT_MODEL_KEY;
use pagechat_common::{ChatEvent, EventBus};
use pagechat_config::schema::ChatPrefs;
use pagechat_config::{PageChatConfig, PrefKey, PrefService};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use super::*;
use crate::host::PageContent;
use crate::observer::BusObserver;
use crate::testing::{FakeEngine, FakeFactory, FakeHost};

struct Running {
    handle: SessionHandle,
    task: JoinHandle<()>,
    engine: Arc<FakeEngine>,
    prefs: Arc<PrefService>,
}

fn build(prefs: ChatPrefs) -> (ChatSession, SessionHandle, Arc<FakeEngine>, Arc<FakeFactory>, Arc<PrefService>) {
    let engine = Arc::new(FakeEngine::default());
    let factory = Arc::new(FakeFactory::new(engine.clone()));
    let host = FakeHost::new(
        "https://example.com/article",
        PageContent::page("Rust is a systems programming language."),
    );
    // Nothing is fetched until a test reports the load as complete
    host.loaded.store(false, Ordering::SeqCst);
    let prefs = Arc::new(PrefService::new(prefs));

    let (session, handle) =
        ChatSession::new(prefs.clone(), factory.clone(), Arc::new(host), DEFAULT_MODEL_KEY).unwrap();
    (session, handle, engine, factory, prefs)
}

fn start(prefs: ChatPrefs) -> Running {
    let (session, handle, engine, _factory, prefs) = build(prefs);
    let task = tokio::spawn(session.run());
    Running {
        handle,
        task,
        engine,
        prefs,
    }
}

fn opted_in() -> ChatPrefs {
    ChatPrefs {
        has_seen_disclaimer: true,
        auto_generate_questions: None,
    }
}

/// Poll snapshots until `done` holds.
async fn wait_for(handle: &SessionHandle, done: impl Fn(&SessionSnapshot) -> bool) -> SessionSnapshot {
    for _ in 0..100 {
        let snapshot = handle.snapshot().await.unwrap();
        if done(&snapshot) {
            return snapshot;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("session never reached the expected state");
}

fn texts(snapshot: &SessionSnapshot) -> Vec<String> {
    snapshot.history.iter().map(|t| t.text.clone()).collect()
}

#[tokio::test]
async fn submitted_turn_is_answered() {
    let s = start(opted_in());
    s.handle.set_active(true).await.unwrap();

    assert_eq!(s.handle.submit("hi").await.unwrap(), SubmitOutcome::Sent);

    let snapshot = wait_for(&s.handle, |s| !s.is_request_in_progress && s.history.len() == 2).await;
    assert_eq!(texts(&snapshot), vec!["hi", "Hello"]);
    assert_eq!(snapshot.current_error, None);
    assert_eq!(s.engine.sent()[0].question, "hi");
}

#[tokio::test]
async fn opting_in_releases_the_queued_turn() {
    let s = start(ChatPrefs::default());
    s.handle.set_active(true).await.unwrap();

    assert_eq!(s.handle.submit("hi").await.unwrap(), SubmitOutcome::Queued);
    let snapshot = s.handle.snapshot().await.unwrap();
    assert!(snapshot.history.is_empty());
    assert!(s.engine.sent().is_empty());

    s.prefs.set_boolean(PrefKey::HasSeenDisclaimer, true).unwrap();

    let snapshot = wait_for(&s.handle, |s| s.history.len() == 2).await;
    assert_eq!(texts(&snapshot), vec!["hi", "Hello"]);
}

#[tokio::test]
async fn config_reload_applies_prefs_and_model() {
    let (session, handle, engine, factory, prefs) = build(ChatPrefs::default());
    let (config_tx, config_rx) = watch::channel(PageChatConfig::default());
    let task = tokio::spawn(session.with_config_updates(config_rx).run());

    handle.set_active(true).await.unwrap();
    assert_eq!(handle.submit("hi").await.unwrap(), SubmitOutcome::Queued);

    let mut config = PageChatConfig::default();
    config.chat.has_seen_disclaimer = true;
    config.engine.model_key = "chat-claude-instant".into();
    config_tx.send(config).unwrap();

    let snapshot = wait_for(&handle, |s| s.history.len() == 2).await;
    assert_eq!(snapshot.model_key, "chat-claude-instant");
    assert!(prefs.get_boolean(PrefKey::HasSeenDisclaimer));
    assert!(factory
        .created
        .lock()
        .unwrap()
        .contains(&"chat-claude-instant".to_string()));
    assert_eq!(engine.sent().len(), 1);

    handle.shutdown().await.unwrap();
    timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn unknown_model_in_reload_keeps_current() {
    let (session, handle, _engine, _factory, _prefs) = build(opted_in());
    let (config_tx, config_rx) = watch::channel(PageChatConfig::default());
    tokio::spawn(session.with_config_updates(config_rx).run());

    let mut config = PageChatConfig::default();
    config.chat.has_seen_disclaimer = true;
    config.engine.model_key = "chat-nope".into();
    config_tx.send(config).unwrap();
    drop(config_tx);

    sleep(Duration::from_millis(50)).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.model_key, DEFAULT_MODEL_KEY);
}

#[tokio::test]
async fn chat_only_reload_keeps_a_switched_model() {
    let (session, handle, _engine, _factory, prefs) = build(ChatPrefs::default());
    let (config_tx, config_rx) = watch::channel(PageChatConfig::default());
    tokio::spawn(session.with_config_updates(config_rx).run());

    handle.change_model("chat-leo-expanded").await.unwrap();

    let mut config = PageChatConfig::default();
    config.chat.auto_generate_questions = Some(true);
    config_tx.send(config).unwrap();

    for _ in 0..100 {
        if prefs.get_boolean(PrefKey::AutoGenerateQuestions) {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    assert!(prefs.get_boolean(PrefKey::AutoGenerateQuestions));
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.model_key, "chat-leo-expanded");
}

#[tokio::test]
async fn change_model_reports_unknown_keys() {
    let s = start(opted_in());

    let err = s.handle.change_model("chat-nope").await.unwrap_err();
    assert!(matches!(err, DriverError::UnknownModel(key) if key == "chat-nope"));

    s.handle.change_model("chat-leo-expanded").await.unwrap();
    let snapshot = s.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.model_key, "chat-leo-expanded");
}

#[tokio::test]
async fn navigation_clears_the_conversation() {
    let s = start(opted_in());
    s.handle.set_active(true).await.unwrap();
    s.handle.submit("hi").await.unwrap();
    wait_for(&s.handle, |s| s.history.len() == 2).await;

    let next = NavigationId(1);
    s.handle.navigated(next, false).await.unwrap();

    let snapshot = s.handle.snapshot().await.unwrap();
    assert!(snapshot.history.is_empty());
    assert_eq!(snapshot.navigation_id, next);
    assert!(!snapshot.has_page_content);
}

#[tokio::test]
async fn shutdown_stops_the_session() {
    let s = start(opted_in());
    s.handle.shutdown().await.unwrap();
    timeout(Duration::from_secs(1), s.task).await.unwrap().unwrap();

    assert!(s.engine.clears.load(Ordering::SeqCst) >= 1);
    assert!(matches!(
        s.handle.snapshot().await,
        Err(DriverError::SessionClosed)
    ));
    assert!(s.handle.is_closed());
}

#[tokio::test]
async fn dropping_every_handle_stops_the_session() {
    let s = start(opted_in());
    drop(s.handle);
    timeout(Duration::from_secs(1), s.task).await.unwrap().unwrap();
}

#[tokio::test]
async fn bus_observer_sees_history_updates() {
    let (mut session, handle, _engine, _factory, _prefs) = build(opted_in());
    let bus = Arc::new(EventBus::new(64));
    let mut rx = bus.subscribe();
    session.add_observer(Arc::new(BusObserver::new(bus.clone())));
    tokio::spawn(session.run());

    handle.set_active(true).await.unwrap();
    handle.submit("hi").await.unwrap();

    let history = timeout(Duration::from_secs(1), async {
        loop {
            if let ChatEvent::HistoryUpdated { history } = rx.recv().await.unwrap() {
                break history;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(history[0].text, "hi");
}
