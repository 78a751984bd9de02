//! Window helper bridge.
//!
//! Drives the native window helper and routes what its pages send back:
//! - **Host -> page**: title, size, content, scripts and window state are
//!   commands on the helper's stdin.
//! - **Page -> host**: `window.tronbun.invoke(channel, data)` arrives as an
//!   `ipc:call` event and is answered with `ipc:response` under the same id.
//! - **Typed windows**: an [`IpcWindow`] declares its handlers once, and a
//!   [`WindowBridge`] exposes them to the page as `window.<name>.<handler>`.

pub mod bridge;
pub mod events;
pub mod handler;
pub mod options;
pub mod registry;
pub mod router;
pub mod script;
pub mod webview;
pub mod window;

#[cfg(test)]
mod testing;

pub use bridge::WindowBridge;
pub use events::{InvokeRequest, WebviewEvent};
pub use handler::{bind_handler, ipc_handler, BindHandler, IpcHandler};
pub use options::{ContextMenuItem, MenuItemKind, Position, SizeHint, WebViewOptions};
pub use registry::{Declaration, HandlerMetadata, IpcWindow, WindowMetadata};
pub use router::WebviewRouter;
pub use script::client_stub;
pub use webview::Webview;
pub use window::Window;
