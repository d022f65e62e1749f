mod cli;
mod page;
mod render;
mod repl;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use pagechat_ai::{EngineSettings, RemoteEngineFactory};
use pagechat_common::{ChatEvent, EventBus, PageChatError};
use pagechat_config::schema::{EngineConfig, PageChatConfig};
use pagechat_config::toml_loader::{self, create_default_config, default_config_path};
use pagechat_config::{PrefKey, PrefService, ReloadManager};
use pagechat_driver::{BusObserver, ChatSession, UsageMetrics};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

const EVENT_BUS_CAPACITY: usize = 256;

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        eprintln!("\n--- pagechat crashed ---");
        eprintln!("Run with --log-level pagechat=debug and report what led up to it.");
        eprintln!("------------------------\n");
        default_hook(info);
    }));
}

/// `--log-level` wins, then `RUST_LOG`, then `[logging] level`.
fn init_logging(override_directive: Option<&str>, config: &PageChatConfig) {
    let default_directive = config.logging.level.directive();
    let filter = match override_directive {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|e| {
            eprintln!("invalid --log-level {directive:?}: {e}");
            EnvFilter::new(default_directive)
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The config file in use, created from the template when it is the default
/// location and missing.
fn config_path(override_path: Option<PathBuf>) -> Result<PathBuf, PageChatError> {
    if let Some(path) = override_path {
        return Ok(path);
    }
    let path = default_config_path()?;
    if !path.exists() {
        create_default_config(&path)?;
    }
    Ok(path)
}

fn engine_settings(engine: &EngineConfig) -> EngineSettings {
    EngineSettings {
        claude_api_url: engine.claude_api_url.clone(),
        llama_api_url: engine.llama_api_url.clone(),
        connect_timeout: Duration::from_secs(engine.connect_timeout_secs.into()),
        request_timeout: Duration::from_secs(engine.request_timeout_secs.into()),
        max_tokens: engine.max_tokens,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    install_panic_hook();
    let args = cli::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("pagechat: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: cli::Args) -> Result<(), PageChatError> {
    let path = config_path(args.config.clone())?;
    let config = toml_loader::load_or_default(&path)?;
    init_logging(args.log_level.as_deref(), &config);

    tracing::info!("pagechat v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("using config {}", path.display());

    let config_updates = ReloadManager::spawn(path.clone(), config.clone());

    let prefs = Arc::new(PrefService::with_store_path(config.chat.clone(), path));
    if args.yes && !prefs.get_boolean(PrefKey::HasSeenDisclaimer) {
        prefs.set_boolean(PrefKey::HasSeenDisclaimer, true)?;
        tracing::info!("opted in from the command line");
    }

    let page_url = page::resolve_page(&args.page)?;
    let host = Arc::new(page::CliPageHost::new(page_url.clone(), args.video)?);
    let factory = Arc::new(RemoteEngineFactory::new(engine_settings(&config.engine)));
    let model_key = args.model.as_deref().unwrap_or(&config.engine.model_key);

    let bus = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));
    let metrics = Arc::new(UsageMetrics::new());
    let (mut session, handle) = ChatSession::new(prefs.clone(), factory, host, model_key)?;
    session.add_observer(Arc::new(BusObserver::new(bus.clone())));
    let session = session
        .with_metrics(metrics.clone())
        .with_config_updates(config_updates);

    tracing::info!(session = %session.id(), page = %page_url, model = model_key, "chat ready");

    let renderer = tokio::spawn(render::run(bus.subscribe()));
    let session_task = tokio::spawn(session.run());

    let result = async {
        handle.set_active(true).await?;
        let stdin = BufReader::new(tokio::io::stdin());
        repl::run(stdin, &handle, &prefs).await
    }
    .await;

    // The session may already be gone if it failed; shutdown is best effort
    let _ = handle.shutdown().await;
    let _ = session_task.await;
    bus.publish(ChatEvent::Shutdown);
    let _ = renderer.await;

    let usage = metrics.snapshot();
    tracing::info!(
        enabled = usage.enabled,
        chats = usage.chats,
        prompts = usage.prompts,
        "shutdown complete"
    );
    result
}
