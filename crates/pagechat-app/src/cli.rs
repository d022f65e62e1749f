use std::path::PathBuf;

use clap::Parser;

/// pagechat: chat with an AI model about a web page or document.
#[derive(Parser, Debug)]
#[command(name = "pagechat", version, about)]
pub struct Args {
    /// Page to chat about: a local file, a `file:`/`data:` URL, or an
    /// `http(s)` address.
    pub page: String,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter override (e.g. `pagechat=debug`).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Model key to start with instead of `engine.model_key`.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Treat the page text as a video transcript.
    #[arg(long)]
    pub video: bool,

    /// Accept the disclaimer and opt in without asking.
    #[arg(short = 'y', long)]
    pub yes: bool,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_is_required() {
        assert!(Args::try_parse_from(["pagechat"]).is_err());
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["pagechat", "notes.html"]).unwrap();
        assert_eq!(args.page, "notes.html");
        assert!(args.config.is_none());
        assert!(args.model.is_none());
        assert!(!args.video);
        assert!(!args.yes);
    }

    #[test]
    fn all_flags() {
        let args = Args::try_parse_from([
            "pagechat",
            "--config",
            "/tmp/pagechat.toml",
            "--log-level",
            "pagechat=debug",
            "-m",
            "chat-claude-instant",
            "--video",
            "-y",
            "https://example.com/watch",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/pagechat.toml")));
        assert_eq!(args.log_level.as_deref(), Some("pagechat=debug"));
        assert_eq!(args.model.as_deref(), Some("chat-claude-instant"));
        assert!(args.video);
        assert!(args.yes);
        assert_eq!(args.page, "https://example.com/watch");
    }
}
