use wasm_bindgen::prelude::*;

use crate::command::{self, Command};
use crate::model::AppState;

/// Lay out CSV text against a settings blob; returns page geometry JSON.
#[wasm_bindgen]
pub fn layout_csv(csv: &str, settings_json: Option<String>) -> Result<String, JsValue> {
    crate::layout_csv(csv, settings_json.as_deref())
        .map_err(|e| JsValue::from_str(&format!("Layout error: {}", e)))
}

/// Parse CSV text into tag items with fresh ids.
#[wasm_bindgen]
pub fn import_csv(csv: &str) -> Result<JsValue, JsValue> {
    let items = crate::import::import_products(csv);
    serde_wasm_bindgen::to_value(&items).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Apply one command to a state. Both are plain JS objects.
#[wasm_bindgen]
pub fn apply_command(state: JsValue, command: JsValue) -> Result<JsValue, JsValue> {
    let state: AppState = serde_wasm_bindgen::from_value(state)
        .map_err(|e| JsValue::from_str(&format!("Invalid state: {}", e)))?;
    let command: Command = serde_wasm_bindgen::from_value(command)
        .map_err(|e| JsValue::from_str(&format!("Invalid command: {}", e)))?;
    let next = command::apply(&state, &command);
    serde_wasm_bindgen::to_value(&next).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Read a stored settings blob with every fallback applied.
#[wasm_bindgen]
pub fn load_settings(raw: Option<String>) -> Result<JsValue, JsValue> {
    let config = crate::settings::load_configuration(raw.as_deref());
    serde_wasm_bindgen::to_value(&config).map_err(|e| JsValue::from_str(&e.to_string()))
}
