//! Application window: a window helper plus per-channel handlers and
//! optional dev-mode hot reload.

use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tronbun_common::{HandlerError, TransportError, TronbunError, WindowId};
use tronbun_config::reload::file_url_path;
use tronbun_config::{DevConfig, DevReloadWatcher, TronbunConfig};

use crate::handler::ipc_handler;
use crate::options::WebViewOptions;
use crate::router::WebviewRouter;
use crate::script::RELOAD_SCRIPT;
use crate::webview::Webview;

pub struct Window {
    id: WindowId,
    webview: Webview,
    dev: DevConfig,
    current_url: Arc<Mutex<Option<String>>>,
    hot_reload: Mutex<Option<HotReload>>,
}

impl Window {
    pub fn open(options: WebViewOptions, config: &TronbunConfig) -> Result<Self, TronbunError> {
        Self::open_with_router(options, config, Arc::new(WebviewRouter::new()))
    }

    pub fn open_with_router(
        options: WebViewOptions,
        config: &TronbunConfig,
        router: Arc<WebviewRouter>,
    ) -> Result<Self, TronbunError> {
        let url = options.url.clone();
        let webview = Webview::open_with_router(options, config, router)?;
        let window = Self::from_webview(webview, config.dev.clone());
        if let Some(url) = url {
            window.track_url(&url);
        }
        Ok(window)
    }

    pub fn from_webview(webview: Webview, dev: DevConfig) -> Self {
        let id = WindowId::new();
        debug!(window = %id, "window created");
        Self {
            id,
            webview,
            dev,
            current_url: Arc::new(Mutex::new(None)),
            hot_reload: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &WindowId {
        &self.id
    }

    pub fn webview(&self) -> &Webview {
        &self.webview
    }

    pub fn current_url(&self) -> Option<String> {
        lock(&self.current_url).clone()
    }

    pub fn is_hot_reloading(&self) -> bool {
        lock(&self.hot_reload).is_some()
    }

    // ---- Handlers ----

    /// Answer `window.tronbun.invoke(channel, data)` from the page.
    pub fn register_ipc_handler<F, Fut>(&self, channel: &str, f: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.webview
            .router()
            .set_ipc_handler(channel, ipc_handler(f));
    }

    pub fn unregister_ipc_handler(&self, channel: &str) -> bool {
        self.webview.router().remove_ipc_handler(channel)
    }

    // ---- Content ----

    pub async fn set_title(&self, title: &str) -> Result<(), TransportError> {
        self.webview.set_title(title).await
    }

    pub async fn set_size(&self, width: u32, height: u32) -> Result<(), TransportError> {
        self.webview.set_size(width, height).await
    }

    pub async fn set_html(&self, html: &str) -> Result<(), TransportError> {
        self.webview.set_html(html).await?;
        *lock(&self.current_url) = None;
        self.stop_hot_reload();
        Ok(())
    }

    pub async fn navigate(&self, url: &str) -> Result<(), TransportError> {
        self.webview.navigate(url).await?;
        self.track_url(url);
        Ok(())
    }

    pub async fn execute_script(&self, js: &str) -> Result<Value, TransportError> {
        self.webview.eval(js).await
    }

    pub async fn init(&self, js: &str) -> Result<(), TransportError> {
        self.webview.init(js).await
    }

    /// Resolves once the window helper has exited.
    pub async fn closed(&self) {
        self.webview.closed().await
    }

    pub fn close(&self) {
        self.stop_hot_reload();
        self.webview.router().clear_ipc_handlers();
        self.webview.close();
    }

    // ---- Hot reload ----

    fn track_url(&self, url: &str) {
        *lock(&self.current_url) = Some(url.to_string());

        match file_url_path(url) {
            Some(path) if self.dev.hot_reload => {
                let reload = HotReload::start(
                    self.webview.clone(),
                    &path,
                    self.dev.reload_debounce(),
                    Arc::clone(&self.current_url),
                );
                // Replacing drops (and stops) the previous watcher.
                *lock(&self.hot_reload) = Some(reload);
            }
            _ => self.stop_hot_reload(),
        }
    }

    fn stop_hot_reload(&self) {
        if lock(&self.hot_reload).take().is_some() {
            debug!(window = %self.id, "hot reload stopped");
        }
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("destroyed", &self.webview.is_destroyed())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Watcher and reload tasks for one page. Both stop when dropped.
struct HotReload {
    watcher: JoinHandle<()>,
    reloader: JoinHandle<()>,
}

impl HotReload {
    fn start(
        webview: Webview,
        page: &Path,
        debounce: Duration,
        current_url: Arc<Mutex<Option<String>>>,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<u64>(4);
        let signal = DevReloadWatcher::for_asset(page, debounce);
        info!("hot reload enabled for {}", page.display());

        let watcher = tokio::spawn(async move {
            if let Err(e) = signal.watch(tx).await {
                warn!("hot reload watcher failed: {e}");
            }
        });

        let reloader = tokio::spawn(async move {
            loop {
                let stamp = tokio::select! {
                    _ = webview.closed() => break,
                    stamp = rx.recv() => match stamp {
                        Some(stamp) => stamp,
                        None => break,
                    },
                };
                info!(stamp, "reloading page");
                match webview.eval(RELOAD_SCRIPT).await {
                    Ok(_) => {}
                    Err(e) if e.is_destroyed() => break,
                    Err(e) => {
                        warn!("script reload failed, navigating instead: {e}");
                        let url = lock(&current_url).clone();
                        if let Some(url) = url {
                            if let Err(e) = webview.navigate(&url).await {
                                warn!("reload navigation failed: {e}");
                            }
                        }
                    }
                }
            }
        });

        Self { watcher, reloader }
    }
}

impl Drop for HotReload {
    fn drop(&mut self) {
        self.watcher.abort();
        self.reloader.abort();
    }
}
