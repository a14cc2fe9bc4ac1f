//! # Tagsheet
//!
//! A sheet-native price tag layout engine.
//!
//! A tag sheet is a stack of physical pages. Every tag is a rectangle with a
//! known size, and the page boundary is a hard constraint: tags are never
//! sliced or scaled to fit. They flow *into* pages, row by row, in exactly the
//! order the product list gives them.
//!
//! ## Architecture
//!
//! ```text
//! Input (CSV / settings JSON / commands)
//!       ↓
//!   [import]   — CSV rows into tag items
//!   [settings] — Defensive load of the persisted settings blob
//!       ↓
//!   [command]  — Reducer over (products, configuration), with [history]
//!       ↓
//!   [style]    — Per-tag overrides layered on global defaults
//!       ↓
//!   [layout]   — Greedy, order-preserving row/page flow
//!       ↓
//!   LayoutInfo (JSON geometry for a renderer)
//! ```
//!
//! [resize] sits beside the pipeline: it turns a pointer drag into snapped
//! preview dimensions and hands the final value back as a command.

pub mod command;
pub mod error;
pub mod history;
pub mod import;
pub mod layout;
pub mod model;
pub mod resize;
pub mod settings;
pub mod style;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::TagsheetError;

use layout::{LayoutInfo, SheetConfig};
use model::AppState;

/// Lay out a state's product list on its configured sheet.
///
/// This is the primary entry point. The result is a pure function of the
/// state: calling it twice yields the same pages.
pub fn layout_state(state: &AppState) -> layout::SheetLayout {
    let config = SheetConfig::from_configuration(&state.config);
    layout::layout(&state.products, &config)
}

/// Parse CSV product text and a settings blob, and return the page geometry
/// as pretty-printed JSON.
pub fn layout_csv(csv: &str, settings_json: Option<&str>) -> Result<String, TagsheetError> {
    let config = settings::load_configuration(settings_json);
    let state = AppState {
        products: import::import_products(csv),
        config,
    };
    let sheet = layout_state(&state);
    let info = LayoutInfo::from_layout(&sheet);
    Ok(serde_json::to_string_pretty(&info)?)
}
