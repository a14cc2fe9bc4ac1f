//! # Data Model
//!
//! The input representation for the layout engine: an ordered list of tag
//! items plus the configuration that describes how tags look and how the
//! sheet is set up.
//!
//! All lengths are centimetres. Pages are not part of the model: they are
//! derived from it on every layout pass and carry no identity of their own.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Device pixels per centimetre at 96 dpi.
pub const PX_PER_CM: f64 = 96.0 / 2.54;

/// Opaque, stable identity of a tag item. Reordering never changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// A fresh random id.
    pub fn new() -> Self {
        ItemId(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        ItemId(uuid)
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One product's priced label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagItem {
    pub id: ItemId,
    pub name: String,
    /// Free-form pack size, e.g. "500 g" or "1 pc".
    pub quantity: String,
    /// Maximum retail price: the pre-discount reference price.
    pub mrp: f64,
    /// Offer price actually charged.
    pub price: f64,
    /// Per-item visual overrides layered on top of the global defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<VisualOverrides>,
}

impl TagItem {
    /// Create an item with a fresh id. Negative or non-finite prices become 0.
    pub fn new(name: impl Into<String>, quantity: impl Into<String>, mrp: f64, price: f64) -> Self {
        TagItem {
            id: ItemId::new(),
            name: name.into(),
            quantity: quantity.into(),
            mrp: non_negative(mrp),
            price: non_negative(price),
            style: None,
        }
    }

    /// Amount saved against the MRP. Never negative.
    pub fn savings(&self) -> f64 {
        (self.mrp - self.price).max(0.0)
    }

    /// Discount against the MRP as a whole percentage.
    pub fn discount_percent(&self) -> u32 {
        if self.mrp <= 0.0 {
            return 0;
        }
        (self.savings() / self.mrp * 100.0).round() as u32
    }
}

pub(crate) fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// A logical content block on a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// "You save" banner.
    Savings,
    /// Name and quantity.
    Product,
    /// MRP and offer price.
    Footer,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Savings, Section::Product, Section::Footer];

    /// Parse a stored section id. Unknown ids are rejected rather than guessed.
    pub fn parse(id: &str) -> Option<Section> {
        match id {
            "savings" => Some(Section::Savings),
            "product" => Some(Section::Product),
            "footer" => Some(Section::Footer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Savings => "savings",
            Section::Product => "product",
            Section::Footer => "footer",
        }
    }
}

// Section ids written by other versions may be unknown here. They are
// dropped on the way in instead of failing the whole value.

fn known_section_order<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Section>, D::Error> {
    let ids = Vec::<String>::deserialize(d)?;
    Ok(crate::style::sanitize_section_order(&ids))
}

fn known_optional_section_order<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<Vec<Section>>, D::Error> {
    let ids = Option::<Vec<String>>::deserialize(d)?;
    Ok(ids.map(|ids| crate::style::sanitize_section_order(&ids)))
}

fn known_text_scales<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<Section, f64>, D::Error> {
    let scales = BTreeMap::<String, f64>::deserialize(d)?;
    Ok(scales
        .into_iter()
        .filter_map(|(id, scale)| Section::parse(&id).map(|section| (section, scale)))
        .collect())
}

/// Main axis for a run of content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    #[default]
    Row,
    Column,
}

/// Line style of the separators drawn between tag sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorStyle {
    Solid,
    #[default]
    Dashed,
    Dotted,
    None,
}

/// Global tag appearance. Every tag uses these unless it overrides a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualSettings {
    pub tag_width: f64,
    pub tag_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    /// Multiplier applied to every font on the tag.
    pub font_scale: f64,
    /// Extra multiplier per section, on top of `font_scale`.
    #[serde(deserialize_with = "known_text_scales")]
    pub text_scales: BTreeMap<Section, f64>,
    pub separator: SeparatorStyle,
    /// Separator thickness in device pixels.
    pub separator_thickness: f64,
    #[serde(deserialize_with = "known_section_order")]
    pub section_order: Vec<Section>,
    /// How sections flow inside the tag.
    pub flow: FlowDirection,
}

impl Default for VisualSettings {
    fn default() -> Self {
        VisualSettings {
            tag_width: 6.0,
            tag_height: 4.0,
            padding_x: 0.3,
            padding_y: 0.3,
            font_scale: 1.0,
            text_scales: Section::ALL.iter().map(|s| (*s, 1.0)).collect(),
            separator: SeparatorStyle::Dashed,
            separator_thickness: 1.0,
            section_order: Section::ALL.to_vec(),
            flow: FlowDirection::Row,
        }
    }
}

impl VisualSettings {
    /// Content area left inside the padding, as (width, height).
    pub fn interior(&self) -> (f64, f64) {
        (
            self.tag_width - 2.0 * self.padding_x,
            self.tag_height - 2.0 * self.padding_y,
        )
    }

    /// Finite values, positive size, non-negative padding, and a positive
    /// interior.
    pub fn is_valid(&self) -> bool {
        let finite = [
            self.tag_width,
            self.tag_height,
            self.padding_x,
            self.padding_y,
            self.font_scale,
        ]
        .iter()
        .all(|v| v.is_finite());
        let (w, h) = self.interior();
        finite
            && self.tag_width > 0.0
            && self.tag_height > 0.0
            && self.padding_x >= 0.0
            && self.padding_y >= 0.0
            && self.font_scale > 0.0
            && w > 0.0
            && h > 0.0
    }
}

/// Per-item overrides. `None` inherits the global default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_scale: Option<f64>,
    /// Merged key-by-key over the defaults' scales.
    #[serde(
        default,
        deserialize_with = "known_text_scales",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub text_scales: BTreeMap<Section, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<SeparatorStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator_thickness: Option<f64>,
    #[serde(
        default,
        deserialize_with = "known_optional_section_order",
        skip_serializing_if = "Option::is_none"
    )]
    pub section_order: Option<Vec<Section>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowDirection>,
}

impl VisualOverrides {
    /// True when nothing is overridden.
    pub fn is_empty(&self) -> bool {
        *self == VisualOverrides::default()
    }
}

/// Page-level spacing, independent of tag visuals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSettings {
    pub padding_x: f64,
    pub padding_y: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    /// Direction tags run across the sheet.
    #[serde(default)]
    pub flow: FlowDirection,
}

impl Default for SheetSettings {
    fn default() -> Self {
        SheetSettings {
            padding_x: 1.0,
            padding_y: 1.0,
            gap_x: 0.4,
            gap_y: 0.6,
            flow: FlowDirection::Row,
        }
    }
}

/// Paper orientation for one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Portrait => Orientation::Landscape,
            Orientation::Landscape => Orientation::Portrait,
        }
    }
}

/// Standard paper sizes in centimetres (portrait).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    A5,
    Letter,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PaperSize {
    /// Returns (width, height) in centimetres for the given orientation.
    /// Portrait puts the short edge horizontal.
    pub fn dimensions(&self, orientation: Orientation) -> (f64, f64) {
        let (a, b) = match self {
            PaperSize::A4 => (21.0, 29.7),
            PaperSize::A5 => (14.8, 21.0),
            PaperSize::Letter => (21.59, 27.94),
            PaperSize::Custom { width, height } => (*width, *height),
        };
        let (short, long) = if a <= b { (a, b) } else { (b, a) };
        match orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }
}

/// Sparse per-page orientation overrides over a global default.
///
/// Lookups are by index into the *current* pagination, so flipping one page
/// can move tags between pages on the next layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrientationMap {
    pub default: Orientation,
    pub overrides: BTreeMap<usize, Orientation>,
}

impl OrientationMap {
    pub fn new(default: Orientation, overrides: BTreeMap<usize, Orientation>) -> Self {
        OrientationMap { default, overrides }
    }

    pub fn uniform(default: Orientation) -> Self {
        OrientationMap {
            default,
            overrides: BTreeMap::new(),
        }
    }

    pub fn resolve(&self, page: usize) -> Orientation {
        self.overrides.get(&page).copied().unwrap_or(self.default)
    }
}

/// Label text printed on every tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagLabels {
    pub mrp_label: String,
    pub price_label: String,
    pub savings_label: String,
    pub currency_symbol: String,
}

impl Default for TagLabels {
    fn default() -> Self {
        TagLabels {
            mrp_label: "MRP".to_string(),
            price_label: "Offer Price".to_string(),
            savings_label: "You Save".to_string(),
            currency_symbol: "₹".to_string(),
        }
    }
}

/// Everything that is not the product list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfiguration {
    pub labels: TagLabels,
    pub visual: VisualSettings,
    pub sheet: SheetSettings,
    pub paper: PaperSize,
    /// Global paper orientation used by pages without an override.
    pub orientation: Orientation,
    pub page_orientations: BTreeMap<usize, Orientation>,
}

impl AppConfiguration {
    pub fn orientation_map(&self) -> OrientationMap {
        OrientationMap::new(self.orientation, self.page_orientations.clone())
    }
}

/// The unit of undo/redo: the product list and configuration together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub products: Vec<TagItem>,
    pub config: AppConfiguration,
}

impl AppState {
    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.products.iter().position(|item| item.id == id)
    }

    pub fn item(&self, id: ItemId) -> Option<&TagItem> {
        self.products.iter().find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_dimensions_follow_orientation() {
        assert_eq!(PaperSize::A4.dimensions(Orientation::Portrait), (21.0, 29.7));
        assert_eq!(PaperSize::A4.dimensions(Orientation::Landscape), (29.7, 21.0));
    }

    #[test]
    fn custom_paper_is_normalised_to_portrait() {
        let paper = PaperSize::Custom {
            width: 30.0,
            height: 10.0,
        };
        assert_eq!(paper.dimensions(Orientation::Portrait), (10.0, 30.0));
    }

    #[test]
    fn orientation_map_falls_back_to_default() {
        let mut overrides = BTreeMap::new();
        overrides.insert(2, Orientation::Landscape);
        let map = OrientationMap::new(Orientation::Portrait, overrides);
        assert_eq!(map.resolve(0), Orientation::Portrait);
        assert_eq!(map.resolve(2), Orientation::Landscape);
    }

    #[test]
    fn prices_are_clamped_and_savings_derived() {
        let item = TagItem::new("Soap", "100 g", 50.0, -3.0);
        assert_eq!(item.price, 0.0);
        assert_eq!(item.savings(), 50.0);
        assert_eq!(item.discount_percent(), 100);

        let item = TagItem::new("Rice", "1 kg", 120.0, 90.0);
        assert_eq!(item.discount_percent(), 25);

        let free = TagItem::new("Sample", "", 0.0, 0.0);
        assert_eq!(free.discount_percent(), 0);
    }

    #[test]
    fn offer_above_mrp_saves_nothing() {
        let item = TagItem::new("Tea", "250 g", 100.0, 120.0);
        assert_eq!(item.savings(), 0.0);
    }

    #[test]
    fn section_ids_round_trip_through_parse() {
        for section in Section::ALL {
            assert_eq!(Section::parse(section.as_str()), Some(section));
        }
        assert_eq!(Section::parse("header"), None);
    }

    #[test]
    fn default_visuals_are_valid() {
        assert!(VisualSettings::default().is_valid());
        let cramped = VisualSettings {
            padding_x: 3.0,
            ..VisualSettings::default()
        };
        assert!(!cramped.is_valid());
    }

    #[test]
    fn non_finite_visuals_are_invalid() {
        let endless = VisualSettings {
            tag_height: f64::INFINITY,
            ..VisualSettings::default()
        };
        assert!(!endless.is_valid());
        let unscaled = VisualSettings {
            font_scale: f64::NAN,
            ..VisualSettings::default()
        };
        assert!(!unscaled.is_valid());
    }

    #[test]
    fn unknown_section_ids_are_dropped_on_deserialize() {
        let overrides: VisualOverrides = serde_json::from_str(
            r#"{ "sectionOrder": ["footer", "banner"], "textScales": { "banner": 2, "product": 1.5 } }"#,
        )
        .unwrap();
        assert_eq!(
            overrides.section_order,
            Some(vec![Section::Footer, Section::Savings, Section::Product])
        );
        assert_eq!(overrides.text_scales.len(), 1);
        assert_eq!(overrides.text_scales[&Section::Product], 1.5);

        let mut value = serde_json::to_value(VisualSettings::default()).unwrap();
        value["sectionOrder"] = serde_json::json!(["ribbon", "product"]);
        let visual: VisualSettings = serde_json::from_value(value).unwrap();
        assert_eq!(
            visual.section_order,
            vec![Section::Product, Section::Savings, Section::Footer]
        );
    }

    #[test]
    fn item_ids_are_unique() {
        assert_ne!(ItemId::new(), ItemId::new());
    }
}
