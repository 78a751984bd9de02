//! Tray menu model.

use serde::{Deserialize, Serialize};
use tronbun_ipc::Callback;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrayItemKind {
    #[default]
    Normal,
    Separator,
    Checkbox,
    Submenu,
}

/// One tray menu entry. Submenus nest to any depth.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrayMenuItem {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub kind: TrayItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submenu: Option<Vec<TrayMenuItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerator: Option<String>,
    #[serde(skip)]
    pub callback: Option<Callback>,
}

impl TrayMenuItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn separator(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: TrayItemKind::Separator,
            ..Default::default()
        }
    }

    pub fn checkbox(id: impl Into<String>, label: impl Into<String>, checked: bool) -> Self {
        Self {
            kind: TrayItemKind::Checkbox,
            checked: Some(checked),
            ..Self::new(id, label)
        }
    }

    pub fn submenu(
        id: impl Into<String>,
        label: impl Into<String>,
        items: Vec<TrayMenuItem>,
    ) -> Self {
        Self {
            kind: TrayItemKind::Submenu,
            submenu: Some(items),
            ..Self::new(id, label)
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn accelerator(mut self, accelerator: impl Into<String>) -> Self {
        self.accelerator = Some(accelerator.into());
        self
    }

    pub fn on_click(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }
}

/// Every inline callback in `items`, depth-first, keyed by item id.
pub fn flatten_callbacks(items: &[TrayMenuItem]) -> Vec<(String, Callback)> {
    let mut out = Vec::new();
    collect(items, &mut out);
    out
}

fn collect(items: &[TrayMenuItem], out: &mut Vec<(String, Callback)>) {
    for item in items {
        if let (Some(callback), false) = (&item.callback, item.id.is_empty()) {
            out.push((item.id.clone(), callback.clone()));
        }
        if let Some(children) = &item.submenu {
            collect(children, out);
        }
    }
}

/// Initial tray state.
#[derive(Debug, Clone, Default)]
pub struct TrayOptions {
    pub icon: String,
    pub tooltip: Option<String>,
    pub menu: Option<Vec<TrayMenuItem>>,
}

impl TrayOptions {
    pub fn new(icon: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            ..Default::default()
        }
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn menu(mut self, items: Vec<TrayMenuItem>) -> Self {
        self.menu = Some(items);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop() -> Callback {
        Callback::new(|_| {})
    }

    #[test]
    fn wire_shape_omits_callbacks() {
        let menu = vec![
            TrayMenuItem::new("open", "Open").on_click(noop()),
            TrayMenuItem::separator("sep"),
            TrayMenuItem::submenu(
                "more",
                "More",
                vec![TrayMenuItem::checkbox("dark", "Dark mode", true).accelerator("Ctrl+D")],
            ),
        ];
        assert_eq!(
            serde_json::to_value(&menu).unwrap(),
            json!([
                {"id": "open", "label": "Open", "type": "normal"},
                {"id": "sep", "label": "", "type": "separator"},
                {"id": "more", "label": "More", "type": "submenu", "submenu": [
                    {"id": "dark", "label": "Dark mode", "type": "checkbox",
                     "checked": true, "accelerator": "Ctrl+D"}
                ]}
            ])
        );
    }

    #[test]
    fn flatten_walks_depth_first() {
        let menu = vec![
            TrayMenuItem::new("a", "A").on_click(noop()),
            TrayMenuItem::submenu(
                "b",
                "B",
                vec![
                    TrayMenuItem::new("b1", "B1").on_click(noop()),
                    TrayMenuItem::submenu(
                        "b2",
                        "B2",
                        vec![TrayMenuItem::new("b2x", "Deep").on_click(noop())],
                    ),
                ],
            ),
            TrayMenuItem::new("c", "C"),
            TrayMenuItem::new("d", "D").on_click(noop()),
        ];

        let ids: Vec<String> = flatten_callbacks(&menu).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b1", "b2x", "d"]);
    }

    #[test]
    fn items_without_id_are_skipped() {
        let menu = vec![TrayMenuItem::new("", "Nameless").on_click(noop())];
        assert!(flatten_callbacks(&menu).is_empty());
    }
}
