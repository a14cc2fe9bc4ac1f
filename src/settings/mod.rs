//! # Persisted Settings
//!
//! The settings blob is a flat JSON object stored under one fixed key. It is
//! written by whatever version of the tool was running at the time, so the
//! loader trusts nothing: every field is read on its own and falls back to
//! the built-in default when it is missing, mistyped or out of range. A
//! blob that does not parse at all yields the full defaults. Loading never
//! fails.
//!
//! Older versions stored tag sizes in pixels. Those values are far larger
//! than any real tag in centimetres, so anything above
//! [`LEGACY_DIMENSION_LIMIT`] is treated as legacy and reset.

pub mod store;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::model::{
    AppConfiguration, FlowDirection, Orientation, PaperSize, Section, SeparatorStyle,
    SheetSettings, TagLabels, VisualSettings,
};
use crate::style;
use crate::TagsheetError;

pub use store::{FileSettingsStore, MemorySettingsStore, SettingsStore};

/// The key the blob is stored under.
pub const SETTINGS_KEY: &str = "price-tag-settings";

/// Tag sizes above this many centimetres are pixel-era values.
pub const LEGACY_DIMENSION_LIMIT: f64 = 50.0;

/// Font scales above this are treated as corrupt.
pub const FONT_SCALE_LIMIT: f64 = 10.0;

/// Load a configuration from an optional raw blob.
pub fn load_configuration(raw: Option<&str>) -> AppConfiguration {
    let Some(raw) = raw else {
        return AppConfiguration::default();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => merge_with_defaults(&map),
        Ok(other) => {
            warn!(kind = json_kind(&other), "settings blob is not an object; using defaults");
            AppConfiguration::default()
        }
        Err(e) => {
            warn!(error = %e, "settings blob is corrupt; using defaults");
            AppConfiguration::default()
        }
    }
}

/// Fill a configuration field by field from a stored object.
pub fn merge_with_defaults(stored: &Map<String, Value>) -> AppConfiguration {
    let defaults = AppConfiguration::default();
    let dv = &defaults.visual;
    let ds = &defaults.sheet;

    let mut visual = VisualSettings {
        tag_width: tag_dimension(stored, "tagWidth", dv.tag_width),
        tag_height: tag_dimension(stored, "tagHeight", dv.tag_height),
        padding_x: non_negative(stored, "tagPaddingX", dv.padding_x),
        padding_y: non_negative(stored, "tagPaddingY", dv.padding_y),
        font_scale: number(stored, "fontScale")
            .filter(|v| *v > 0.0 && *v <= FONT_SCALE_LIMIT)
            .unwrap_or(dv.font_scale),
        text_scales: text_scales(stored.get("textScales"), &dv.text_scales),
        separator: stored
            .get("separatorStyle")
            .and_then(Value::as_str)
            .and_then(parse_separator)
            .unwrap_or(dv.separator),
        separator_thickness: non_negative(stored, "separatorThickness", dv.separator_thickness),
        section_order: section_order(stored.get("sectionOrder"), &dv.section_order),
        flow: flow(stored, "contentFlow").unwrap_or(dv.flow),
    };

    if !visual.is_valid() {
        warn!(
            padding_x = visual.padding_x,
            padding_y = visual.padding_y,
            "stored tag padding leaves no interior; resetting padding"
        );
        visual.padding_x = dv.padding_x;
        visual.padding_y = dv.padding_y;
        if !visual.is_valid() {
            visual.tag_width = dv.tag_width;
            visual.tag_height = dv.tag_height;
        }
    }

    let sheet = SheetSettings {
        padding_x: non_negative(stored, "pagePaddingX", ds.padding_x),
        padding_y: non_negative(stored, "pagePaddingY", ds.padding_y),
        gap_x: non_negative(stored, "gapX", ds.gap_x),
        gap_y: non_negative(stored, "gapY", ds.gap_y),
        flow: flow(stored, "sheetFlow").unwrap_or(ds.flow),
    };

    AppConfiguration {
        labels: labels(stored.get("labels"), &defaults.labels),
        visual,
        sheet,
        paper: stored
            .get("paperSize")
            .and_then(parse_paper)
            .unwrap_or(defaults.paper),
        orientation: stored
            .get("orientation")
            .and_then(Value::as_str)
            .and_then(parse_orientation)
            .unwrap_or(defaults.orientation),
        page_orientations: page_orientations(stored.get("pageOrientations")),
    }
}

/// The blob as written to storage.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsBlob<'a> {
    labels: &'a TagLabels,
    tag_width: f64,
    tag_height: f64,
    tag_padding_x: f64,
    tag_padding_y: f64,
    font_scale: f64,
    text_scales: &'a BTreeMap<Section, f64>,
    separator_style: SeparatorStyle,
    separator_thickness: f64,
    section_order: &'a [Section],
    content_flow: FlowDirection,
    page_padding_x: f64,
    page_padding_y: f64,
    gap_x: f64,
    gap_y: f64,
    sheet_flow: FlowDirection,
    paper_size: Value,
    orientation: Orientation,
    page_orientations: &'a BTreeMap<usize, Orientation>,
}

/// Serialize a configuration into the blob format.
pub fn save_configuration(config: &AppConfiguration) -> Result<String, TagsheetError> {
    let v = &config.visual;
    let s = &config.sheet;
    let blob = SettingsBlob {
        labels: &config.labels,
        tag_width: v.tag_width,
        tag_height: v.tag_height,
        tag_padding_x: v.padding_x,
        tag_padding_y: v.padding_y,
        font_scale: v.font_scale,
        text_scales: &v.text_scales,
        separator_style: v.separator,
        separator_thickness: v.separator_thickness,
        section_order: &v.section_order,
        content_flow: v.flow,
        page_padding_x: s.padding_x,
        page_padding_y: s.padding_y,
        gap_x: s.gap_x,
        gap_y: s.gap_y,
        sheet_flow: s.flow,
        paper_size: paper_value(&config.paper),
        orientation: config.orientation,
        page_orientations: &config.page_orientations,
    };
    Ok(serde_json::to_string_pretty(&blob)?)
}

/// Read the blob from a store. Store failures degrade to defaults.
pub fn load_from(store: &dyn SettingsStore) -> AppConfiguration {
    match store.read(SETTINGS_KEY) {
        Ok(raw) => load_configuration(raw.as_deref()),
        Err(e) => {
            warn!(error = %e, "could not read settings; using defaults");
            AppConfiguration::default()
        }
    }
}

/// Write the blob to a store.
pub fn save_to(store: &mut dyn SettingsStore, config: &AppConfiguration) -> Result<(), TagsheetError> {
    let blob = save_configuration(config)?;
    store.write(SETTINGS_KEY, &blob)
}

// ── Field readers ──────────────────────────────────────────────

fn number(stored: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match stored.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

fn non_negative(stored: &Map<String, Value>, key: &str, default: f64) -> f64 {
    match number(stored, key) {
        Some(v) if v >= 0.0 => v,
        Some(v) => {
            debug!(key, value = v, "negative setting replaced by default");
            default
        }
        None => default,
    }
}

fn tag_dimension(stored: &Map<String, Value>, key: &str, default: f64) -> f64 {
    match number(stored, key) {
        Some(v) if v > LEGACY_DIMENSION_LIMIT => {
            warn!(key, value = v, "legacy pixel-scale tag size; resetting to default");
            default
        }
        Some(v) if v > 0.0 => v,
        _ => default,
    }
}

fn text_scales(value: Option<&Value>, defaults: &BTreeMap<Section, f64>) -> BTreeMap<Section, f64> {
    let mut overlay = BTreeMap::new();
    if let Some(Value::Object(map)) = value {
        for (id, scale) in map {
            let Some(section) = Section::parse(id) else {
                continue;
            };
            if let Some(scale) = scale.as_f64().filter(|s| s.is_finite() && *s > 0.0) {
                overlay.insert(section, scale);
            }
        }
    }
    style::merge_text_scales(defaults, &overlay)
}

fn section_order(value: Option<&Value>, defaults: &[Section]) -> Vec<Section> {
    match value {
        Some(Value::Array(ids)) => {
            let ids: Vec<&str> = ids.iter().filter_map(Value::as_str).collect();
            style::sanitize_section_order(&ids)
        }
        _ => defaults.to_vec(),
    }
}

fn labels(value: Option<&Value>, defaults: &TagLabels) -> TagLabels {
    let Some(Value::Object(map)) = value else {
        return defaults.clone();
    };
    let text = |key: &str, default: &String| {
        map.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| default.clone())
    };
    TagLabels {
        mrp_label: text("mrpLabel", &defaults.mrp_label),
        price_label: text("priceLabel", &defaults.price_label),
        savings_label: text("savingsLabel", &defaults.savings_label),
        currency_symbol: text("currencySymbol", &defaults.currency_symbol),
    }
}

fn page_orientations(value: Option<&Value>) -> BTreeMap<usize, Orientation> {
    let mut out = BTreeMap::new();
    if let Some(Value::Object(map)) = value {
        for (page, orientation) in map {
            let (Ok(page), Some(orientation)) = (
                page.parse::<usize>(),
                orientation.as_str().and_then(parse_orientation),
            ) else {
                debug!(page = %page, "ignoring invalid page orientation entry");
                continue;
            };
            out.insert(page, orientation);
        }
    }
    out
}

fn flow(stored: &Map<String, Value>, key: &str) -> Option<FlowDirection> {
    match stored.get(key)?.as_str()? {
        "row" => Some(FlowDirection::Row),
        "column" => Some(FlowDirection::Column),
        _ => None,
    }
}

fn parse_separator(s: &str) -> Option<SeparatorStyle> {
    match s {
        "solid" => Some(SeparatorStyle::Solid),
        "dashed" => Some(SeparatorStyle::Dashed),
        "dotted" => Some(SeparatorStyle::Dotted),
        "none" => Some(SeparatorStyle::None),
        _ => None,
    }
}

fn parse_orientation(s: &str) -> Option<Orientation> {
    match s {
        "portrait" => Some(Orientation::Portrait),
        "landscape" => Some(Orientation::Landscape),
        _ => None,
    }
}

fn parse_paper(value: &Value) -> Option<PaperSize> {
    match value {
        Value::String(s) => match s.to_ascii_uppercase().as_str() {
            "A4" => Some(PaperSize::A4),
            "A5" => Some(PaperSize::A5),
            "LETTER" => Some(PaperSize::Letter),
            _ => None,
        },
        Value::Object(map) => {
            let width = map.get("width")?.as_f64()?;
            let height = map.get("height")?.as_f64()?;
            let plausible = |v: f64| v.is_finite() && v > 0.0 && v <= 200.0;
            (plausible(width) && plausible(height)).then_some(PaperSize::Custom { width, height })
        }
        _ => None,
    }
}

fn paper_value(paper: &PaperSize) -> Value {
    match paper {
        PaperSize::A4 => Value::from("A4"),
        PaperSize::A5 => Value::from("A5"),
        PaperSize::Letter => Value::from("Letter"),
        PaperSize::Custom { width, height } => serde_json::json!({ "width": width, "height": height }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
