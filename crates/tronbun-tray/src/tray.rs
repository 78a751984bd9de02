//! Command surface of the tray helper.

use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tronbun_common::{TransportError, TronbunError};
use tronbun_config::{resolve_helper, BridgeConfig, HelperKind, TronbunConfig};
use tronbun_ipc::{Callback, Transport, TransportConfig};

use crate::menu::{TrayMenuItem, TrayOptions};
use crate::router::TrayRouter;

/// One tray helper process.
///
/// Construction returns immediately; the icon, tooltip and menu from
/// [`TrayOptions`] are applied in the background once the helper had a
/// moment to start. [`Tray::initialized`] resolves when that is done.
#[derive(Clone)]
pub struct Tray {
    transport: Transport,
    router: Arc<TrayRouter>,
    initialized: CancellationToken,
}

#[derive(Debug, Clone, Copy)]
struct Delays {
    startup: Duration,
    step: Duration,
}

impl From<&BridgeConfig> for Delays {
    fn from(bridge: &BridgeConfig) -> Self {
        Self {
            startup: bridge.tray_startup_delay(),
            step: bridge.tray_step_delay(),
        }
    }
}

impl Tray {
    /// Locate the tray helper and start it.
    pub fn open(options: TrayOptions, config: &TronbunConfig) -> Result<Self, TronbunError> {
        let path = resolve_helper(HelperKind::Tray, &config.helpers)?;
        Ok(Self::spawn(&path, options, config)?)
    }

    pub fn spawn(
        path: &Path,
        options: TrayOptions,
        config: &TronbunConfig,
    ) -> Result<Self, TransportError> {
        let router = Arc::new(TrayRouter::new());
        let transport = Transport::spawn(path, transport_config(config), router.clone())?;
        Ok(Self::start(transport, router, options, Delays::from(&config.bridge)))
    }

    /// Drive a tray helper that is already connected through `stdin`/`stdout`.
    pub fn attach<W, R>(stdin: W, stdout: R, options: TrayOptions, config: &TronbunConfig) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
    {
        let router = Arc::new(TrayRouter::new());
        let transport =
            Transport::from_streams(stdin, stdout, transport_config(config), router.clone());
        Self::start(transport, router, options, Delays::from(&config.bridge))
    }

    fn start(
        transport: Transport,
        router: Arc<TrayRouter>,
        options: TrayOptions,
        delays: Delays,
    ) -> Self {
        let tray = Self {
            transport,
            router,
            initialized: CancellationToken::new(),
        };
        let this = tray.clone();
        tokio::spawn(async move {
            if let Err(e) = this.apply_options(options, delays).await {
                warn!("tray initialization failed: {e}");
            }
            this.initialized.cancel();
        });
        tray
    }

    async fn apply_options(&self, options: TrayOptions, delays: Delays) -> Result<(), TransportError> {
        tokio::time::sleep(delays.startup).await;

        self.set_icon(&options.icon).await?;
        tokio::time::sleep(delays.step).await;

        if let Some(tooltip) = &options.tooltip {
            self.set_tooltip(tooltip).await?;
            tokio::time::sleep(delays.step).await;
        }
        if let Some(menu) = &options.menu {
            self.set_menu(menu).await?;
        }
        info!("tray ready");
        Ok(())
    }

    /// Resolves once the initial options were applied (or failed to apply).
    pub async fn initialized(&self) {
        self.initialized.cancelled().await
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn router(&self) -> &Arc<TrayRouter> {
        &self.router
    }

    pub fn is_destroyed(&self) -> bool {
        self.transport.is_destroyed()
    }

    pub async fn closed(&self) {
        self.transport.closed().await
    }

    async fn run(&self, method: &str, params: Value) -> Result<(), TransportError> {
        self.transport.send_command(method, params).await.map(drop)
    }

    pub async fn set_icon(&self, icon: &str) -> Result<(), TransportError> {
        self.run("tray_set_icon", json!({ "icon": icon })).await
    }

    pub async fn set_tooltip(&self, tooltip: &str) -> Result<(), TransportError> {
        self.run("tray_set_tooltip", json!({ "tooltip": tooltip }))
            .await
    }

    /// Replace the menu. Inline callbacks are registered before it is sent.
    pub async fn set_menu(&self, menu: &[TrayMenuItem]) -> Result<(), TransportError> {
        self.router.register_menu(menu);
        self.run("tray_set_menu", json!({ "menu": menu })).await
    }

    /// Remove the icon and stop the helper. Does nothing once destroyed.
    pub async fn destroy(&self) {
        if self.is_destroyed() {
            return;
        }
        if let Err(e) = self.run("tray_destroy", json!({})).await {
            debug!("tray_destroy failed: {e}");
        }
        self.router.clear();
        self.transport.cleanup();
    }

    /// Handle clicks on `menu_id`, replacing any inline callback.
    pub fn on_menu_click(&self, menu_id: &str, callback: Callback) {
        self.router.set_handler(menu_id, callback);
    }

    pub fn off_menu_click(&self, menu_id: &str) {
        self.router.remove_handler(menu_id);
    }

    /// Tray icons are available on the major desktop platforms.
    pub fn is_supported() -> bool {
        cfg!(any(
            target_os = "windows",
            target_os = "macos",
            target_os = "linux"
        ))
    }
}

fn transport_config(config: &TronbunConfig) -> TransportConfig {
    let mut transport = TransportConfig::new(HelperKind::Tray.label())
        .with_timeout(config.bridge.command_timeout());
    transport.relay_stderr = config.bridge.debug;
    transport
}

impl std::fmt::Debug for Tray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tray")
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
