//! Publishes config file changes on a `watch` channel.

use std::path::PathBuf;

use pagechat_common::ConfigError;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

use crate::schema::PageChatConfig;
use crate::toml_loader;
use crate::validation;
use crate::watcher::ConfigWatcher;

/// Re-reads the config file whenever the watcher reports a change and
/// publishes it if it differs from the current one.
pub struct ReloadManager {
    config_path: PathBuf,
}

impl ReloadManager {
    /// Publish `initial` and start following `config_path`.
    ///
    /// The watcher keeps running when the file does not exist yet, so it can
    /// be created later. Must be called from within a tokio runtime.
    pub fn spawn(config_path: PathBuf, initial: PageChatConfig) -> watch::Receiver<PageChatConfig> {
        let (config_tx, config_rx) = watch::channel(initial);
        let manager = ReloadManager { config_path };
        tokio::spawn(async move {
            manager.run(config_tx).await;
        });
        config_rx
    }

    async fn run(&self, config_tx: watch::Sender<PageChatConfig>) {
        let watcher = match ConfigWatcher::new(self.config_path.clone()) {
            Ok(w) => w,
            Err(e) => {
                error!("failed to create config watcher: {e}");
                return;
            }
        };

        let (change_tx, mut change_rx) = broadcast::channel::<()>(16);
        tokio::spawn(async move {
            if let Err(e) = watcher.watch(change_tx).await {
                error!("config watcher error: {e}");
            }
        });

        loop {
            match change_rx.recv().await {
                Ok(()) => {
                    if config_tx.is_closed() {
                        info!("config no longer followed, stopping reload");
                        break;
                    }
                    match self.reload() {
                        Ok(config) => {
                            if publish(&config_tx, config) {
                                info!("config reloaded from {}", self.config_path.display());
                            }
                        }
                        // The previous config stays in effect
                        Err(e) => warn!("config reload rejected: {e}"),
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("config watcher lagged by {n} events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("config watcher channel closed");
                    break;
                }
            }
        }
    }

    fn reload(&self) -> Result<PageChatConfig, ConfigError> {
        let config = toml_loader::load_from_path(&self.config_path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

/// Replace the published config if `config` differs from it.
pub(crate) fn publish(tx: &watch::Sender<PageChatConfig>, config: PageChatConfig) -> bool {
    tx.send_if_modified(|current| {
        if *current == config {
            return false;
        }
        if current.logging != config.logging {
            warn!("logging changes take effect on restart");
        }
        *current = config;
        true
    })
}
