//! Typed view of unsolicited window helper messages.

use serde::Deserialize;
use serde_json::Value;
use tronbun_ipc::protocol::value_as_id;
use tronbun_ipc::InboundMessage;

/// Channel used by the built-in context menu to report clicks through the
/// invoke bridge.
pub const CONTEXT_MENU_CHANNEL: &str = "context_menu_click";

pub const IPC_CALL: &str = "ipc:call";
pub const BIND_CALLBACK: &str = "bind_callback";
pub const CONTEXT_MENU_CLICK: &str = "context_menu_click";

/// Request built by `window.tronbun.invoke` / `send` in the page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InvokeRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub channel: String,
    #[serde(default)]
    pub data: Value,
}

impl InvokeRequest {
    /// `send` requests have no caller waiting for a result.
    pub fn expects_reply(&self) -> bool {
        self.kind != "send"
    }

    /// Menu item id when this request reports a context-menu click.
    pub fn context_menu_item(&self) -> Option<String> {
        if self.channel != CONTEXT_MENU_CHANNEL {
            return None;
        }
        self.data.get("id").and_then(value_as_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebviewEvent {
    /// Two-way call from page content, answered with `ipc:response` under `seq`.
    IpcCall { seq: String, request: InvokeRequest },
    /// A function registered with `bind` was called from the page.
    BindCallback { name: String, args: Value },
    ContextMenuClick { id: String },
    /// Recognised tag with an unusable payload.
    Malformed { seq: Option<String>, reason: String },
    Unknown(InboundMessage),
}

impl WebviewEvent {
    pub fn decode(message: InboundMessage) -> Self {
        match message.kind() {
            IPC_CALL => decode_ipc_call(&message),
            BIND_CALLBACK => match message.id.clone() {
                Some(name) => Self::BindCallback {
                    name,
                    args: message.field("req").cloned().unwrap_or(Value::Null),
                },
                None => Self::Malformed {
                    seq: None,
                    reason: "bind_callback without a name".into(),
                },
            },
            CONTEXT_MENU_CLICK => match message.id.clone() {
                Some(id) => Self::ContextMenuClick { id },
                None => Self::Malformed {
                    seq: None,
                    reason: "context_menu_click without an id".into(),
                },
            },
            _ => Self::Unknown(message),
        }
    }
}

fn decode_ipc_call(message: &InboundMessage) -> WebviewEvent {
    let seq = message.field("seq").and_then(value_as_id);
    let malformed = |reason: String| WebviewEvent::Malformed {
        seq: seq.clone(),
        reason,
    };

    // req = [<js call id>, "<json-encoded request>"]
    let Some(raw) = message
        .field("req")
        .and_then(|req| req.get(1))
        .and_then(Value::as_str)
    else {
        return malformed("ipc:call without a request string".into());
    };
    let request: InvokeRequest = match serde_json::from_str(raw) {
        Ok(request) => request,
        Err(e) => return malformed(format!("bad ipc:call request: {e}")),
    };
    match seq.clone() {
        Some(seq) => WebviewEvent::IpcCall { seq, request },
        None => malformed("ipc:call without seq".into()),
    }
}
