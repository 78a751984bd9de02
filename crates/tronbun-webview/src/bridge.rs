//! A window whose page can call the declared handlers of a Rust type.

use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;
use tronbun_common::{TransportError, TronbunError};
use tronbun_config::{DevConfig, TronbunConfig};
use tronbun_ipc::TransportConfig;

use crate::options::WebViewOptions;
use crate::registry::{self, IpcWindow, WindowMetadata};
use crate::router::WebviewRouter;
use crate::script::client_stub;
use crate::webview::Webview;
use crate::window::Window;

/// Binds an [`IpcWindow`] instance to a window.
///
/// Every declared handler is registered as an invoke channel before the
/// helper starts, and a stub script exposing
/// `window.<name>.<handler>(data)` is installed ahead of the first page.
/// Dropping the bridge closes the window.
pub struct WindowBridge<T: IpcWindow> {
    inner: Arc<T>,
    window: Window,
    metadata: WindowMetadata,
    stub: String,
}

struct Prepared<T> {
    inner: Arc<T>,
    metadata: WindowMetadata,
    stub: String,
    router: Arc<WebviewRouter>,
}

fn prepare<T: IpcWindow>(inner: T) -> Result<Prepared<T>, TronbunError> {
    registry::ensure_declared::<T>();
    let metadata = registry::metadata::<T>().unwrap_or_else(|| WindowMetadata {
        name: "Unknown".into(),
        handlers: Vec::new(),
    });
    let stub = client_stub(&metadata.name, &metadata.handler_names())?;

    let inner = Arc::new(inner);
    let router = Arc::new(WebviewRouter::new());
    for (channel, handler) in registry::bind_handlers(&inner) {
        router.set_ipc_handler(channel, handler);
    }

    Ok(Prepared {
        inner,
        metadata,
        stub,
        router,
    })
}

impl<T: IpcWindow> WindowBridge<T> {
    /// Open a window for `inner`, locating the helper through `config`.
    pub fn new(
        inner: T,
        options: WebViewOptions,
        config: &TronbunConfig,
    ) -> Result<Self, TronbunError> {
        let prepared = prepare(inner)?;
        let options = options.init_script(prepared.stub.clone());
        let window = Window::open_with_router(options, config, prepared.router)?;
        Ok(Self::assemble(prepared.inner, window, prepared.metadata, prepared.stub))
    }

    /// Like [`WindowBridge::new`] over an already connected helper.
    pub fn attach<W, R>(
        inner: T,
        stdin: W,
        stdout: R,
        options: WebViewOptions,
        transport_config: TransportConfig,
        dev: DevConfig,
    ) -> Result<Self, TronbunError>
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
    {
        let prepared = prepare(inner)?;
        let options = options.init_script(prepared.stub.clone());
        let webview = Webview::attach(stdin, stdout, options, transport_config, prepared.router);
        let window = Window::from_webview(webview, dev);
        Ok(Self::assemble(prepared.inner, window, prepared.metadata, prepared.stub))
    }

    fn assemble(inner: Arc<T>, window: Window, metadata: WindowMetadata, stub: String) -> Self {
        info!(
            window = %metadata.name,
            handlers = metadata.handlers.len(),
            "window bridge ready"
        );
        Self {
            inner,
            window,
            metadata,
            stub,
        }
    }

    pub fn window_name(&self) -> &str {
        &self.metadata.name
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.metadata.handler_names()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn inner(&self) -> &Arc<T> {
        &self.inner
    }

    /// The generated client stub.
    pub fn client_script(&self) -> &str {
        &self.stub
    }

    /// Install the client stub again, e.g. after the helper dropped its
    /// init scripts.
    pub async fn initialize(&self) -> Result<(), TransportError> {
        self.window.init(&self.stub).await
    }

    pub fn close(&self) {
        self.window.close();
    }
}

impl<T: IpcWindow> Drop for WindowBridge<T> {
    fn drop(&mut self) {
        self.window.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHelper;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DemoWindow {
        calls: AtomicUsize,
    }

    impl IpcWindow for DemoWindow {
        fn declare(decl: &mut registry::Declaration<Self>) {
            decl.name("DemoWindow")
                .handler("greet", |this: Arc<Self>, data| async move {
                    this.calls.fetch_add(1, Ordering::SeqCst);
                    let name = data["name"].as_str().unwrap_or("stranger").to_string();
                    Ok(Value::String(format!("Hello, {name}!")))
                })
                .handler("calc", |this: Arc<Self>, data| async move {
                    this.calls.fetch_add(1, Ordering::SeqCst);
                    let a = data["a"].as_f64().unwrap_or(0.0);
                    let b = data["b"].as_f64().unwrap_or(0.0);
                    Ok(json!(a + b))
                });
        }
    }

    fn attach() -> (WindowBridge<DemoWindow>, FakeHelper) {
        let (host_stdin, helper_stdin) = tokio::io::duplex(64 * 1024);
        let (helper_stdout, host_stdout) = tokio::io::duplex(64 * 1024);
        let bridge = WindowBridge::attach(
            DemoWindow {
                calls: AtomicUsize::new(0),
            },
            host_stdin,
            host_stdout,
            WebViewOptions::new().title("Demo"),
            TransportConfig::new("WebView"),
            DevConfig::default(),
        )
        .unwrap();
        (bridge, FakeHelper::from_pipes(helper_stdin, helper_stdout))
    }

    fn invoke(seq: &str, channel: &str, data: Value) -> Value {
        let req = json!({"type": "invoke", "channel": channel, "data": data});
        json!({
            "type": "ipc:call",
            "id": "__bunwebview_invoke",
            "seq": seq,
            "req": ["0", req.to_string()],
        })
    }

    #[tokio::test]
    async fn stub_is_installed_after_options() {
        let (bridge, mut helper) = attach();

        assert_eq!(bridge.window_name(), "DemoWindow");
        assert_eq!(bridge.handler_names(), vec!["greet", "calc"]);

        assert_eq!(helper.next_command().await["method"], "set_title");
        let init = helper.next_command().await;
        assert_eq!(init["method"], "init");
        let js = init["params"]["js"].as_str().unwrap();
        assert_eq!(js, bridge.client_script());
        assert!(js.contains("window.DemoWindow.greet = function(data)"));
        assert!(js.contains("window.tronbun.invoke('calc', data)"));
    }

    #[tokio::test]
    async fn declared_handlers_answer_invokes() {
        let (bridge, mut helper) = attach();
        helper.expect("init").await;

        helper
            .send(invoke("1", "greet", json!({"name": "Ada"})))
            .await;
        let reply = helper.next_command().await;
        assert_eq!(reply["id"], "1");
        assert_eq!(reply["params"]["result"], "Hello, Ada!");

        helper.send(invoke("2", "calc", json!({"a": 2, "b": 3}))).await;
        let reply = helper.next_command().await;
        assert_eq!(reply["params"]["result"], 5.0);

        assert_eq!(bridge.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn initialize_resends_stub() {
        let (bridge, mut helper) = attach();
        let first = helper.expect("init").await;

        let b = Arc::new(bridge);
        let task = {
            let b = Arc::clone(&b);
            tokio::spawn(async move { b.initialize().await })
        };
        let again = helper.next_command().await;
        assert_eq!(again["method"], "init");
        assert_eq!(again["params"], first["params"]);
        helper.ack(&again).await;
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn drop_closes_window() {
        let (bridge, _helper) = attach();
        let webview = bridge.window().webview().clone();
        drop(bridge);

        webview.closed().await;
        assert!(webview.is_destroyed());
    }
}
