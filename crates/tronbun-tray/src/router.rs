//! Menu click routing for the tray helper.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;
use tronbun_ipc::protocol::value_as_id;
use tronbun_ipc::{Callback, EventRouter, InboundMessage, Transport};

use crate::menu::{flatten_callbacks, TrayMenuItem};

pub const MENU_CLICK: &str = "menu_click";

/// Flat menu id -> callback table, whatever the menu nesting.
#[derive(Default)]
pub struct TrayRouter {
    handlers: RwLock<HashMap<String, Callback>>,
}

impl TrayRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_handler(&self, menu_id: impl Into<String>, callback: Callback) {
        self.write().insert(menu_id.into(), callback);
    }

    pub fn remove_handler(&self, menu_id: &str) -> bool {
        self.write().remove(menu_id).is_some()
    }

    pub fn has_handler(&self, menu_id: &str) -> bool {
        self.read().contains_key(menu_id)
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Register every inline callback in `items`, submenus included.
    pub fn register_menu(&self, items: &[TrayMenuItem]) {
        let callbacks = flatten_callbacks(items);
        debug!(count = callbacks.len(), "registering tray menu callbacks");
        self.write().extend(callbacks);
    }

    /// Run the callback for `menu_id`. Returns false when none is registered.
    pub async fn click(&self, menu_id: &str) -> bool {
        let callback = self.read().get(menu_id).cloned();
        match callback {
            Some(callback) => {
                callback.invoke(menu_id).await;
                true
            }
            None => {
                debug!(menu_id, "no tray menu handler");
                false
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Callback>> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Callback>> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl EventRouter for TrayRouter {
    async fn route(&self, message: InboundMessage, _transport: Transport) {
        if message.kind() != MENU_CLICK {
            debug!(kind = message.kind(), "unhandled tray event");
            return;
        }
        let menu_id = message
            .field("data")
            .and_then(|data| data.get("menuId"))
            .and_then(value_as_id);
        match menu_id {
            Some(menu_id) => {
                self.click(&menu_id).await;
            }
            None => debug!("menu_click without a menuId"),
        }
    }

    fn on_destroyed(&self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Callback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |tag: &str| {
            let sink = sink.clone();
            let tag = tag.to_string();
            Callback::new(move |id| sink.lock().unwrap().push(format!("{tag}:{id}")))
        };
        (log, make)
    }

    #[tokio::test]
    async fn nested_leaf_fires_only_its_callback() {
        let (log, cb) = recorder();
        let router = TrayRouter::new();
        router.register_menu(&[
            TrayMenuItem::new("top", "Top").on_click(cb("top")),
            TrayMenuItem::submenu(
                "more",
                "More",
                vec![
                    TrayMenuItem::new("sibling", "Sibling").on_click(cb("sibling")),
                    TrayMenuItem::submenu(
                        "deeper",
                        "Deeper",
                        vec![TrayMenuItem::new("leaf", "Leaf").on_click(cb("leaf"))],
                    ),
                ],
            ),
        ]);

        assert!(router.click("leaf").await);
        assert_eq!(*log.lock().unwrap(), vec!["leaf:leaf".to_string()]);
        assert!(!router.click("deeper").await);
    }

    #[tokio::test]
    async fn explicit_handler_overrides_inline() {
        let (log, cb) = recorder();
        let router = TrayRouter::new();
        router.register_menu(&[TrayMenuItem::new("quit", "Quit").on_click(cb("inline"))]);
        router.set_handler("quit", cb("explicit"));

        router.click("quit").await;
        assert_eq!(*log.lock().unwrap(), vec!["explicit:quit".to_string()]);

        assert!(router.remove_handler("quit"));
        assert!(!router.click("quit").await);
    }

    #[test]
    fn destroy_clears_handlers() {
        let (_log, cb) = recorder();
        let router = TrayRouter::new();
        router.set_handler("x", cb("x"));
        router.on_destroyed();
        assert!(!router.has_handler("x"));
    }
}
