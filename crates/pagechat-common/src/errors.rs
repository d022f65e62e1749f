use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("config watch error: {0}")]
    WatchError(String),

    #[error("failed to write {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PageChatError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(String),

    /// A chat session failure, kept whole so callers can downcast it.
    #[error("driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("page error: {0}")]
    Page(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("engine.model_key is empty".into());
        assert_eq!(
            err.to_string(),
            "config validation error: engine.model_key is empty"
        );

        let err = ConfigError::WatchError("inotify limit reached".into());
        assert_eq!(err.to_string(), "config watch error: inotify limit reached");

        let err = ConfigError::WriteError {
            path: PathBuf::from("/tmp/config.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to write /tmp/config.toml: denied");
    }

    #[test]
    fn pagechat_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: PageChatError = config_err.into();
        assert!(matches!(err, PageChatError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn pagechat_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: PageChatError = io_err.into();
        assert!(matches!(err, PageChatError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn pagechat_error_other_variants() {
        let err = PageChatError::Network("timeout".into());
        assert_eq!(err.to_string(), "network error: timeout");

        let err = PageChatError::Driver("unknown model".into());
        assert_eq!(err.to_string(), "driver error: unknown model");
        assert!(std::error::Error::source(&err).is_some());

        let err = PageChatError::Page("unsupported scheme".into());
        assert_eq!(err.to_string(), "page error: unsupported scheme");
    }
}
