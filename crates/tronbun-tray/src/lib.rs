//! Status-tray helper bridge.
//!
//! The tray helper shows an icon with a tooltip and a (possibly nested)
//! menu. Clicks come back as `menu_click` events carrying the item id and
//! are dispatched through a flat id -> callback table.

pub mod menu;
pub mod router;
pub mod tray;

pub use menu::{TrayItemKind, TrayMenuItem, TrayOptions};
pub use router::TrayRouter;
pub use tray::Tray;
