//! # Style Resolution
//!
//! A tag's effective appearance is its own overrides layered over the global
//! [`VisualSettings`]. Like a cascade with exactly two levels: any field the
//! item sets wins, anything it leaves as `None` is inherited.
//!
//! Text scales are the one nested field, and they merge key by key: keys the
//! item sets are added or overwritten, and no default key is ever dropped.

use std::collections::BTreeMap;

use crate::model::{Section, TagItem, VisualOverrides, VisualSettings};

/// Resolve an item's effective visual settings.
pub fn resolve(defaults: &VisualSettings, overrides: Option<&VisualOverrides>) -> VisualSettings {
    let Some(o) = overrides else {
        return defaults.clone();
    };

    VisualSettings {
        tag_width: o.tag_width.unwrap_or(defaults.tag_width),
        tag_height: o.tag_height.unwrap_or(defaults.tag_height),
        padding_x: o.padding_x.unwrap_or(defaults.padding_x),
        padding_y: o.padding_y.unwrap_or(defaults.padding_y),
        font_scale: o.font_scale.unwrap_or(defaults.font_scale),
        text_scales: merge_text_scales(&defaults.text_scales, &o.text_scales),
        separator: o.separator.unwrap_or(defaults.separator),
        separator_thickness: o.separator_thickness.unwrap_or(defaults.separator_thickness),
        section_order: o
            .section_order
            .clone()
            .unwrap_or_else(|| defaults.section_order.clone()),
        flow: o.flow.unwrap_or(defaults.flow),
    }
}

/// Resolve the visuals for one item.
pub fn resolve_item(defaults: &VisualSettings, item: &TagItem) -> VisualSettings {
    resolve(defaults, item.style.as_ref())
}

/// Merge a partial text-scale map over a base map.
pub fn merge_text_scales(
    base: &BTreeMap<Section, f64>,
    overlay: &BTreeMap<Section, f64>,
) -> BTreeMap<Section, f64> {
    let mut merged = base.clone();
    for (section, scale) in overlay {
        merged.insert(*section, *scale);
    }
    merged
}

/// Effective scale for one section: the global font scale times the
/// section's own multiplier (1.0 when unset).
pub fn section_scale(visual: &VisualSettings, section: Section) -> f64 {
    visual.font_scale * visual.text_scales.get(&section).copied().unwrap_or(1.0)
}

/// Turn a stored list of section ids into a complete render order.
///
/// Unknown ids and duplicates are dropped, and any section the list never
/// mentions is appended in default order. An entirely invalid list therefore
/// comes back as the default order.
pub fn sanitize_section_order<S: AsRef<str>>(stored: &[S]) -> Vec<Section> {
    let mut order: Vec<Section> = Vec::with_capacity(Section::ALL.len());
    for id in stored {
        if let Some(section) = Section::parse(id.as_ref()) {
            if !order.contains(&section) {
                order.push(section);
            }
        }
    }
    for section in Section::ALL {
        if !order.contains(&section) {
            order.push(section);
        }
    }
    order
}

/// Normalise an already-typed order: duplicates removed, missing appended.
pub fn complete_section_order(order: &[Section]) -> Vec<Section> {
    let ids: Vec<&str> = order.iter().map(Section::as_str).collect();
    sanitize_section_order(&ids)
}
