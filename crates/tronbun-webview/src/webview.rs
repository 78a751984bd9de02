//! Command surface of the window helper.

use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;
use tronbun_common::{TransportError, TronbunError};
use tronbun_config::{resolve_helper, HelperKind, TronbunConfig};
use tronbun_ipc::{Callback, Transport, TransportConfig};

use crate::handler::BindHandler;
use crate::options::{ContextMenuItem, SizeHint, WebViewOptions};
use crate::router::WebviewRouter;

type CommandResult<T> = Result<T, TransportError>;

/// One window helper process.
///
/// Clones share the same process and callback tables.
#[derive(Clone)]
pub struct Webview {
    transport: Transport,
    router: Arc<WebviewRouter>,
}

impl Webview {
    /// Locate the window helper, start it and apply `options`.
    pub fn open(options: WebViewOptions, config: &TronbunConfig) -> Result<Self, TronbunError> {
        Self::open_with_router(options, config, Arc::new(WebviewRouter::new()))
    }

    /// Like [`Webview::open`], with callbacks already registered on `router`.
    pub fn open_with_router(
        options: WebViewOptions,
        config: &TronbunConfig,
        router: Arc<WebviewRouter>,
    ) -> Result<Self, TronbunError> {
        let path = resolve_helper(HelperKind::Webview, &config.helpers)?;
        let transport_config = transport_config(&options, config);
        Ok(Self::spawn(&path, options, transport_config, router)?)
    }

    /// Start the helper at `path`.
    pub fn spawn(
        path: &Path,
        options: WebViewOptions,
        transport_config: TransportConfig,
        router: Arc<WebviewRouter>,
    ) -> CommandResult<Self> {
        let transport = Transport::spawn(path, transport_config, router.clone())?;
        let webview = Self { transport, router };
        webview.apply_options(options);
        Ok(webview)
    }

    /// Drive a helper that is already connected through `stdin`/`stdout`.
    pub fn attach<W, R>(
        stdin: W,
        stdout: R,
        options: WebViewOptions,
        transport_config: TransportConfig,
        router: Arc<WebviewRouter>,
    ) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
    {
        let transport = Transport::from_streams(stdin, stdout, transport_config, router.clone());
        let webview = Self { transport, router };
        webview.apply_options(options);
        webview
    }

    /// Queue the initial commands in order. Failures are only logged.
    fn apply_options(&self, options: WebViewOptions) {
        let send = |method: &str, params: Value| self.transport.send_detached(method, params);

        if let Some(title) = &options.title {
            send("set_title", json!({ "title": title }));
        }
        if let (Some(width), Some(height)) = (options.width, options.height) {
            send(
                "set_size",
                json!({ "width": width, "height": height, "hints": SizeHint::None.code() }),
            );
        }
        // Init scripts must be in place before the first page loads.
        for js in &options.init_scripts {
            send("init", json!({ "js": js }));
        }
        if let Some(html) = &options.html {
            send("set_html", json!({ "html": html }));
        }
        if let Some(url) = &options.url {
            send("navigate", json!({ "url": url }));
        }
        if options.always_on_top {
            send("window_set_always_on_top", json!({ "on_top": 1 }));
        }
        if options.transparent {
            send("window_set_transparent", json!({}));
        }
        if options.opaque {
            send("window_set_opaque", json!({}));
        }
        if options.blur {
            send("window_enable_blur", json!({}));
        }
        if options.decorations == Some(false) {
            send("window_remove_decorations", json!({}));
        }
        if let Some(resizable) = options.resizable {
            send("window_set_resizable", json!({ "resizable": u8::from(resizable) }));
        }
        if let Some(position) = options.position {
            send("window_set_position", json!({ "x": position.x, "y": position.y }));
        }
        if options.center {
            send("window_center", json!({}));
        }
        if options.hidden {
            send("window_hide", json!({}));
        }
        if let Some(items) = &options.context_menu {
            self.install_menu_callbacks(items);
            send("window_set_context_menu", json!({ "menu": items }));
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn router(&self) -> &Arc<WebviewRouter> {
        &self.router
    }

    pub fn is_destroyed(&self) -> bool {
        self.transport.is_destroyed()
    }

    /// Resolves once the helper has gone away.
    pub async fn closed(&self) {
        self.transport.closed().await
    }

    /// Kill the helper immediately.
    pub fn close(&self) {
        self.transport.close();
    }

    async fn call(&self, method: &str, params: Value) -> CommandResult<Value> {
        self.transport.send_command(method, params).await
    }

    async fn run(&self, method: &str, params: Value) -> CommandResult<()> {
        self.call(method, params).await.map(drop)
    }

    // === Content ===

    pub async fn set_title(&self, title: &str) -> CommandResult<()> {
        self.run("set_title", json!({ "title": title })).await
    }

    pub async fn set_size(&self, width: u32, height: u32) -> CommandResult<()> {
        self.set_size_with_hint(width, height, SizeHint::None).await
    }

    pub async fn set_size_with_hint(
        &self,
        width: u32,
        height: u32,
        hint: SizeHint,
    ) -> CommandResult<()> {
        self.run(
            "set_size",
            json!({ "width": width, "height": height, "hints": hint.code() }),
        )
        .await
    }

    pub async fn navigate(&self, url: &str) -> CommandResult<()> {
        self.run("navigate", json!({ "url": url })).await
    }

    pub async fn set_html(&self, html: &str) -> CommandResult<()> {
        self.run("set_html", json!({ "html": html })).await
    }

    /// Evaluate `js` in the page.
    pub async fn eval(&self, js: &str) -> CommandResult<Value> {
        self.call("eval", json!({ "js": js })).await
    }

    /// Register `js` to run before every page load.
    pub async fn init(&self, js: &str) -> CommandResult<()> {
        self.run("init", json!({ "js": js })).await
    }

    /// Expose a global function `name` to the page. Calls arrive as
    /// `bind_callback` events and are passed to `callback`.
    pub async fn bind(&self, name: &str, callback: Option<BindHandler>) -> CommandResult<()> {
        if let Some(callback) = callback {
            self.router.set_binding(name, callback);
        }
        self.run("bind", json!({ "name": name })).await
    }

    pub async fn unbind(&self, name: &str) -> CommandResult<()> {
        self.router.remove_binding(name);
        self.run("unbind", json!({ "name": name })).await
    }

    pub async fn terminate(&self) -> CommandResult<()> {
        self.run("terminate", json!({})).await
    }

    /// Native window handle as reported by the helper.
    pub async fn get_window(&self) -> CommandResult<Value> {
        self.call("get_window", json!({})).await
    }

    /// Helper library version. String results are decoded as JSON.
    pub async fn get_version(&self) -> CommandResult<Value> {
        let result = self.call("get_version", json!({})).await?;
        match result {
            Value::String(text) => serde_json::from_str(&text).map_err(|e| {
                TransportError::CommandError {
                    method: "get_version".into(),
                    message: format!("invalid version payload: {e}"),
                }
            }),
            other => Ok(other),
        }
    }

    pub async fn is_ready(&self) -> CommandResult<bool> {
        let result = self.call("isready", json!({})).await?;
        Ok(match result {
            Value::Bool(ready) => ready,
            Value::String(text) => text == "true",
            _ => false,
        })
    }

    // === Window state ===

    pub async fn set_transparent(&self) -> CommandResult<()> {
        self.run("window_set_transparent", json!({})).await
    }

    pub async fn set_opaque(&self) -> CommandResult<()> {
        self.run("window_set_opaque", json!({})).await
    }

    pub async fn enable_blur(&self) -> CommandResult<()> {
        self.run("window_enable_blur", json!({})).await
    }

    pub async fn remove_decorations(&self) -> CommandResult<()> {
        self.run("window_remove_decorations", json!({})).await
    }

    pub async fn add_decorations(&self) -> CommandResult<()> {
        self.run("window_add_decorations", json!({})).await
    }

    pub async fn set_always_on_top(&self, on_top: bool) -> CommandResult<()> {
        self.run(
            "window_set_always_on_top",
            json!({ "on_top": u8::from(on_top) }),
        )
        .await
    }

    /// Opacity from 0.0 (invisible) to 1.0 (opaque).
    pub async fn set_opacity(&self, opacity: f64) -> CommandResult<()> {
        self.run(
            "window_set_opacity",
            json!({ "opacity": opacity.to_string() }),
        )
        .await
    }

    pub async fn set_resizable(&self, resizable: bool) -> CommandResult<()> {
        self.run(
            "window_set_resizable",
            json!({ "resizable": u8::from(resizable) }),
        )
        .await
    }

    pub async fn set_position(&self, x: i32, y: i32) -> CommandResult<()> {
        self.run("window_set_position", json!({ "x": x, "y": y }))
            .await
    }

    pub async fn center(&self) -> CommandResult<()> {
        self.run("window_center", json!({})).await
    }

    pub async fn minimize(&self) -> CommandResult<()> {
        self.run("window_minimize", json!({})).await
    }

    pub async fn maximize(&self) -> CommandResult<()> {
        self.run("window_maximize", json!({})).await
    }

    pub async fn restore(&self) -> CommandResult<()> {
        self.run("window_restore", json!({})).await
    }

    pub async fn hide(&self) -> CommandResult<()> {
        self.run("window_hide", json!({})).await
    }

    pub async fn show(&self) -> CommandResult<()> {
        self.run("window_show", json!({})).await
    }

    // === Context menu ===

    fn install_menu_callbacks(&self, items: &[ContextMenuItem]) {
        let callbacks = items.iter().filter(|item| !item.is_separator()).filter_map(|item| {
            item.callback
                .clone()
                .map(|callback| (item.id.clone(), callback))
        });
        self.router.replace_menu_callbacks(callbacks);
    }

    /// Replace the right-click menu. Callbacks on `items` replace all
    /// previously registered menu callbacks.
    pub async fn set_context_menu(&self, items: &[ContextMenuItem]) -> CommandResult<()> {
        self.install_menu_callbacks(items);
        self.run("window_set_context_menu", json!({ "menu": items }))
            .await
    }

    pub async fn clear_context_menu(&self) -> CommandResult<()> {
        self.router.clear_menu_callbacks();
        self.run("window_clear_context_menu", json!({})).await
    }

    pub fn register_context_menu_callback(&self, item_id: &str, callback: Callback) {
        debug!(item_id, "context menu callback registered");
        self.router.set_menu_callback(item_id, callback);
    }

    pub fn unregister_context_menu_callback(&self, item_id: &str) {
        self.router.remove_menu_callback(item_id);
    }
}

/// Transport settings for a window helper.
pub fn transport_config(options: &WebViewOptions, config: &TronbunConfig) -> TransportConfig {
    let mut transport = TransportConfig::new(HelperKind::Webview.label())
        .with_timeout(config.bridge.command_timeout());
    transport.relay_stderr = options.debug || config.bridge.debug;
    transport
}
