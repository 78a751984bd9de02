//! Window construction options and context-menu model.

use serde::{Deserialize, Serialize};
use tronbun_ipc::Callback;

/// Screen position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Size constraint passed along with `set_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeHint {
    #[default]
    None,
    Min,
    Max,
    Fixed,
}

impl SizeHint {
    pub fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Min => 1,
            Self::Max => 2,
            Self::Fixed => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemKind {
    #[default]
    Normal,
    Separator,
}

/// One entry of a right-click menu.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextMenuItem {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: MenuItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip)]
    pub callback: Option<Callback>,
}

impl ContextMenuItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn separator(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: MenuItemKind::Separator,
            ..Default::default()
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn on_click(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn is_separator(&self) -> bool {
        self.kind == MenuItemKind::Separator
    }
}

/// Initial state applied right after the window helper starts.
///
/// Each set field becomes one command, sent in a fixed order without
/// waiting for completions.
#[derive(Debug, Clone, Default)]
pub struct WebViewOptions {
    pub title: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub html: Option<String>,
    pub url: Option<String>,
    /// Scripts registered before any content loads.
    pub init_scripts: Vec<String>,
    pub always_on_top: bool,
    pub transparent: bool,
    pub opaque: bool,
    pub blur: bool,
    /// `Some(false)` strips the title bar and borders.
    pub decorations: Option<bool>,
    pub resizable: Option<bool>,
    pub position: Option<Position>,
    pub center: bool,
    pub hidden: bool,
    pub context_menu: Option<Vec<ContextMenuItem>>,
    /// Relay the helper's stderr diagnostics.
    pub debug: bool,
}

impl WebViewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn init_script(mut self, js: impl Into<String>) -> Self {
        self.init_scripts.push(js.into());
        self
    }

    pub fn always_on_top(mut self, on_top: bool) -> Self {
        self.always_on_top = on_top;
        self
    }

    pub fn transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn decorations(mut self, decorations: bool) -> Self {
        self.decorations = Some(decorations);
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = Some(resizable);
        self
    }

    pub fn position(mut self, x: i32, y: i32) -> Self {
        self.position = Some(Position { x, y });
        self
    }

    pub fn center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn context_menu(mut self, items: Vec<ContextMenuItem>) -> Self {
        self.context_menu = Some(items);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
