use clap::Parser;
use std::path::PathBuf;

/// Tronbun: drive native window and tray helpers from Rust.
#[derive(Parser, Debug)]
#[command(name = "tronbun", version, about)]
pub struct Args {
    /// Window title.
    #[arg(long, default_value = "Tronbun Demo")]
    pub title: String,

    /// Load this URL instead of the built-in demo page.
    #[arg(long, conflicts_with = "html")]
    pub url: Option<String>,

    /// Show this HTML instead of the built-in demo page.
    #[arg(long)]
    pub html: Option<String>,

    #[arg(long, default_value_t = 800)]
    pub width: u32,

    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Also show a tray icon using this image.
    #[arg(long)]
    pub tray_icon: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["tronbun"]);
        assert_eq!(args.title, "Tronbun Demo");
        assert_eq!((args.width, args.height), (800, 600));
        assert!(args.url.is_none() && args.tray_icon.is_none());
    }

    #[test]
    fn url_and_html_conflict() {
        let result = Args::try_parse_from(["tronbun", "--url", "https://a", "--html", "<p>"]);
        assert!(result.is_err());
    }

    #[test]
    fn all_flags() {
        let args = Args::parse_from([
            "tronbun",
            "--url",
            "file:///tmp/index.html",
            "--width",
            "1024",
            "--tray-icon",
            "icon.png",
            "--config",
            "/etc/tronbun.toml",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.url.as_deref(), Some("file:///tmp/index.html"));
        assert_eq!(args.width, 1024);
        assert_eq!(args.tray_icon.as_deref(), Some("icon.png"));
        assert_eq!(args.config, Some(PathBuf::from("/etc/tronbun.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }
}
