mod cli;
mod demo;

use std::sync::Arc;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;
use tronbun_common::ConfigError;
use tronbun_config::TronbunConfig;
use tronbun_ipc::Callback;
use tronbun_tray::{Tray, TrayMenuItem, TrayOptions};
use tronbun_webview::{WebViewOptions, WindowBridge};

use demo::{DemoWindow, DEMO_HTML};

/// `bridge.debug` already reflects `TRONBUN_DEBUG` once the config is loaded.
fn log_directive(args: &cli::Args, bridge_debug: bool) -> String {
    if let Some(level) = &args.log_level {
        return level.clone();
    }
    if bridge_debug {
        "tronbun=debug".into()
    } else {
        "tronbun=info".into()
    }
}

fn window_options(args: &cli::Args, config: &TronbunConfig) -> WebViewOptions {
    let options = WebViewOptions::new()
        .title(&args.title)
        .size(args.width, args.height)
        .center(true)
        .debug(config.bridge.debug);
    match (&args.url, &args.html) {
        (Some(url), _) => options.url(url),
        (None, Some(html)) => options.html(html),
        (None, None) => options.html(DEMO_HTML),
    }
}

fn tray_menu(quit: Arc<Notify>) -> Vec<TrayMenuItem> {
    vec![
        TrayMenuItem::new("show", "Tronbun Demo").enabled(false),
        TrayMenuItem::separator("sep1"),
        TrayMenuItem::submenu(
            "more",
            "More",
            vec![
                TrayMenuItem::new("about", "About").on_click(Callback::new(|_| {
                    tracing::info!("Tronbun v{}", env!("CARGO_PKG_VERSION"));
                })),
                TrayMenuItem::new("docs", "Documentation").on_click(Callback::new(|id| {
                    tracing::info!("menu item '{id}' clicked");
                })),
            ],
        ),
        TrayMenuItem::separator("sep2"),
        TrayMenuItem::new("quit", "Quit").on_click(Callback::new(move |_| quit.notify_one())),
    ]
}

#[tokio::main]
async fn main() {
    let args = cli::parse();

    // Config is read before logging starts so `bridge.debug` can raise the level.
    let loaded: Result<TronbunConfig, ConfigError> =
        tronbun_config::load_config(args.config.as_deref());
    let bridge_debug = loaded.as_ref().map(|c| c.bridge.debug).unwrap_or(false);

    let directive = log_directive(&args, bridge_debug);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                directive
                    .parse()
                    .unwrap_or_else(|_| "tronbun=info".parse().unwrap()),
            ),
        )
        .init();

    tracing::info!("Tronbun v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Some(path) = &args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        TronbunConfig::default()
    });
    tracing::debug!(
        timeout_ms = config.bridge.command_timeout_ms,
        hot_reload = config.dev.hot_reload,
        "config loaded"
    );

    let bridge = match WindowBridge::new(
        DemoWindow::default(),
        window_options(&args, &config),
        &config,
    ) {
        Ok(bridge) => bridge,
        Err(e) => {
            tracing::error!("Failed to open window: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Window '{}' open with handlers {:?}",
        bridge.window_name(),
        bridge.handler_names()
    );

    let quit = Arc::new(Notify::new());
    let tray = args.tray_icon.as_ref().and_then(|icon| {
        if !Tray::is_supported() {
            tracing::warn!("Tray icons are not supported on this platform");
            return None;
        }
        let options = TrayOptions::new(icon)
            .tooltip(&args.title)
            .menu(tray_menu(quit.clone()));
        Tray::open(options, &config)
            .map_err(|e| tracing::warn!("Tray unavailable: {e}"))
            .ok()
    });

    tokio::select! {
        _ = bridge.window().closed() => tracing::info!("Window closed"),
        _ = quit.notified() => tracing::info!("Quit requested"),
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
    }

    if let Some(tray) = &tray {
        tray.destroy().await;
    }
    bridge.close();
    tracing::info!("Shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn explicit_log_level_wins() {
        let args = cli::Args::parse_from(["tronbun", "--log-level", "warn"]);
        assert_eq!(log_directive(&args, true), "warn");
    }

    #[test]
    fn config_debug_raises_level() {
        let args = cli::Args::parse_from(["tronbun"]);
        assert_eq!(log_directive(&args, true), "tronbun=debug");
    }

    #[test]
    fn demo_page_is_default_content() {
        let args = cli::Args::parse_from(["tronbun"]);
        let options = window_options(&args, &TronbunConfig::default());
        assert_eq!(options.html.as_deref(), Some(DEMO_HTML));
        assert!(options.url.is_none());
        assert!(options.center);

        let args = cli::Args::parse_from(["tronbun", "--url", "https://example.com"]);
        let options = window_options(&args, &TronbunConfig::default());
        assert_eq!(options.url.as_deref(), Some("https://example.com"));
        assert!(options.html.is_none());
    }

    #[test]
    fn tray_menu_nests_more_submenu() {
        let menu = tray_menu(Arc::new(Notify::new()));
        let more = menu.iter().find(|item| item.id == "more").unwrap();
        assert_eq!(more.submenu.as_ref().map(Vec::len), Some(2));
        assert!(menu.iter().any(|item| item.id == "quit" && item.callback.is_some()));
    }
}
