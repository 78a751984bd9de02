//! Event routing for the window helper.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, warn};
use tronbun_ipc::{Callback, EventRouter, InboundMessage, Transport};

use crate::events::{InvokeRequest, WebviewEvent};
use crate::handler::{BindHandler, IpcHandler};

/// Per-window callback tables consulted for every unsolicited message.
///
/// Entries are keyed by name; registering a name again replaces the
/// previous callback.
#[derive(Default)]
pub struct WebviewRouter {
    ipc_handlers: RwLock<HashMap<String, IpcHandler>>,
    context_menu: RwLock<HashMap<String, Callback>>,
    bindings: RwLock<HashMap<String, BindHandler>>,
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl WebviewRouter {
    pub fn new() -> Self {
        Self::default()
    }

    // -- invoke channels --

    pub fn set_ipc_handler(&self, channel: impl Into<String>, handler: IpcHandler) {
        write(&self.ipc_handlers).insert(channel.into(), handler);
    }

    pub fn remove_ipc_handler(&self, channel: &str) -> bool {
        write(&self.ipc_handlers).remove(channel).is_some()
    }

    pub fn clear_ipc_handlers(&self) {
        write(&self.ipc_handlers).clear();
    }

    pub fn ipc_channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = read(&self.ipc_handlers).keys().cloned().collect();
        channels.sort();
        channels
    }

    // -- context menu --

    pub fn set_menu_callback(&self, item_id: impl Into<String>, callback: Callback) {
        write(&self.context_menu).insert(item_id.into(), callback);
    }

    pub fn remove_menu_callback(&self, item_id: &str) -> bool {
        write(&self.context_menu).remove(item_id).is_some()
    }

    /// Replace every menu callback at once.
    pub fn replace_menu_callbacks(&self, callbacks: impl IntoIterator<Item = (String, Callback)>) {
        let mut map = write(&self.context_menu);
        map.clear();
        map.extend(callbacks);
    }

    pub fn clear_menu_callbacks(&self) {
        write(&self.context_menu).clear();
    }

    /// Run the callback registered for a menu item. Returns false when none is.
    pub async fn click_menu_item(&self, item_id: &str) -> bool {
        let callback = read(&self.context_menu).get(item_id).cloned();
        match callback {
            Some(callback) => {
                callback.invoke(item_id).await;
                true
            }
            None => {
                debug!(item_id, "no context menu callback");
                false
            }
        }
    }

    // -- bound functions --

    pub fn set_binding(&self, name: impl Into<String>, handler: BindHandler) {
        write(&self.bindings).insert(name.into(), handler);
    }

    pub fn remove_binding(&self, name: &str) -> bool {
        write(&self.bindings).remove(name).is_some()
    }

    pub fn has_binding(&self, name: &str) -> bool {
        read(&self.bindings).contains_key(name)
    }

    // -- dispatch --

    /// Context-menu clicks run in line so they keep their order. Invoke
    /// handlers run on their own task and answer when they finish.
    async fn handle_ipc_call(&self, seq: String, request: InvokeRequest, transport: &Transport) {
        debug!(channel = %request.channel, seq = %seq, "ipc:call");

        if let Some(item_id) = request.context_menu_item() {
            self.click_menu_item(&item_id).await;
            reply(transport, &seq, json!({"id": seq, "result": "ok"}));
            return;
        }

        let handler = read(&self.ipc_handlers).get(&request.channel).cloned();
        tokio::spawn(answer_ipc_call(seq, request, handler, transport.clone()));
    }
}

async fn answer_ipc_call(
    seq: String,
    request: InvokeRequest,
    handler: Option<IpcHandler>,
    transport: Transport,
) {
    let outcome = match handler {
        Some(handler) => handler(request.data.clone()).await,
        None => {
            info!(channel = %request.channel, data = %request.data, "no ipc handler registered");
            Ok(Value::Null)
        }
    };

    if !request.expects_reply() {
        return;
    }
    let params = match outcome {
        Ok(Value::Null) => json!({"id": seq, "result": ""}),
        Ok(result) => json!({"id": seq, "result": result}),
        Err(e) => {
            warn!(channel = %request.channel, error = %e, "ipc handler failed");
            json!({"id": seq, "result": "", "error": e.to_string()})
        }
    };
    reply(&transport, &seq, params);
}

fn reply(transport: &Transport, seq: &str, params: Value) {
    transport.send_detached_with_id("ipc:response", params, Some(seq.to_string()));
}

#[async_trait]
impl EventRouter for WebviewRouter {
    async fn route(&self, message: InboundMessage, transport: Transport) {
        match WebviewEvent::decode(message) {
            WebviewEvent::IpcCall { seq, request } => {
                self.handle_ipc_call(seq, request, &transport).await;
            }
            WebviewEvent::BindCallback { name, args } => {
                let handler = read(&self.bindings).get(&name).cloned();
                match handler {
                    Some(handler) => handler(args).await,
                    None => debug!(name = %name, "no callback for bound function"),
                }
            }
            WebviewEvent::ContextMenuClick { id } => {
                self.click_menu_item(&id).await;
            }
            WebviewEvent::Malformed { seq, reason } => {
                warn!(reason = %reason, "malformed window event");
                if let Some(seq) = seq {
                    reply(&transport, &seq, json!({"id": seq, "result": ""}));
                }
            }
            WebviewEvent::Unknown(message) => {
                debug!(kind = message.kind(), "unhandled window event");
            }
        }
    }

    fn on_destroyed(&self) {
        write(&self.bindings).clear();
        write(&self.context_menu).clear();
        write(&self.ipc_handlers).clear();
    }
}
