//! Commands and the reducer that applies them.
//!
//! Every change to the product list or configuration is a [`Command`] value.
//! [`apply`] is a pure function from `(state, command)` to the next state,
//! and [`Editor`] runs it through the undo history. Input mechanics (mouse,
//! keyboard, touch, file pickers) stay outside: a drag-and-drop reorder is
//! just `MoveItem { from, to }`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::history::History;
use crate::import;
use crate::layout::{self, SheetConfig, SheetLayout};
use crate::model::{
    non_negative, AppConfiguration, AppState, ItemId, Orientation, PaperSize, SheetSettings,
    TagItem, TagLabels, VisualOverrides, VisualSettings,
};
use crate::resize::{
    DragAxis, Dimensions, Point, ResizeCommit, ResizeGesture, ResizeTarget,
};
use crate::style;

/// Partial update of an item's display fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub mrp: Option<f64>,
    pub price: Option<f64>,
}

/// A single user intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    AddItem { item: TagItem },
    AddItems { items: Vec<TagItem> },
    RemoveItem { id: ItemId },
    RemoveItems { ids: Vec<ItemId> },
    ClearItems,
    /// Remove the item at `from` and reinsert it at `to`.
    MoveItem { from: usize, to: usize },
    UpdateItem { id: ItemId, patch: ItemPatch },
    SetItemStyle { id: ItemId, style: Option<VisualOverrides> },
    SetVisualDefaults { visual: VisualSettings },
    SetSheetSettings { sheet: SheetSettings },
    SetLabels { labels: TagLabels },
    SetPaper { paper: PaperSize },
    /// Global paper orientation for pages without an override.
    SetOrientation { orientation: Orientation },
    SetPageOrientation { page: usize, orientation: Orientation },
    TogglePageOrientation { page: usize },
    ResetPageOrientations,
    CommitResize { commit: ResizeCommit },
}

/// Apply a command, producing the next state. Commands that cannot apply
/// (unknown id, index out of range) return the state unchanged.
pub fn apply(state: &AppState, command: &Command) -> AppState {
    let mut next = state.clone();
    match command {
        Command::AddItem { item } => next.products.push(item.clone()),
        Command::AddItems { items } => next.products.extend(items.iter().cloned()),
        Command::RemoveItem { id } => next.products.retain(|item| item.id != *id),
        Command::RemoveItems { ids } => next.products.retain(|item| !ids.contains(&item.id)),
        Command::ClearItems => next.products.clear(),
        Command::MoveItem { from, to } => {
            if *from < next.products.len() && from != to {
                let item = next.products.remove(*from);
                let to = (*to).min(next.products.len());
                next.products.insert(to, item);
            }
        }
        Command::UpdateItem { id, patch } => {
            if let Some(item) = next.products.iter_mut().find(|item| item.id == *id) {
                if let Some(name) = &patch.name {
                    item.name = name.clone();
                }
                if let Some(quantity) = &patch.quantity {
                    item.quantity = quantity.clone();
                }
                if let Some(mrp) = patch.mrp {
                    item.mrp = non_negative(mrp);
                }
                if let Some(price) = patch.price {
                    item.price = non_negative(price);
                }
            }
        }
        Command::SetItemStyle { id, style } => {
            let defaults = &next.config.visual;
            let style = style.clone().filter(|s| !s.is_empty());
            let valid = style
                .as_ref()
                .map_or(true, |s| style::resolve(defaults, Some(s)).is_valid());
            if !valid {
                debug!(%id, "rejected item style with no interior area");
            } else if let Some(item) = next.products.iter_mut().find(|item| item.id == *id) {
                item.style = style;
            }
        }
        Command::SetVisualDefaults { visual } => {
            if visual.is_valid() {
                let mut visual = visual.clone();
                visual.section_order = style::complete_section_order(&visual.section_order);
                next.config.visual = visual;
            } else {
                debug!("rejected visual defaults with no interior area");
            }
        }
        Command::SetSheetSettings { sheet } => next.config.sheet = sanitize_sheet(*sheet, &next.config),
        Command::SetLabels { labels } => next.config.labels = labels.clone(),
        Command::SetPaper { paper } => next.config.paper = *paper,
        Command::SetOrientation { orientation } => {
            next.config.orientation = *orientation;
            next.config.page_orientations.retain(|_, page| *page != *orientation);
        }
        Command::SetPageOrientation { page, orientation } => {
            set_page_orientation(&mut next.config, *page, *orientation);
        }
        Command::TogglePageOrientation { page } => {
            let current = next.config.orientation_map().resolve(*page);
            set_page_orientation(&mut next.config, *page, current.flipped());
        }
        Command::ResetPageOrientations => next.config.page_orientations.clear(),
        Command::CommitResize { commit } => apply_resize(&mut next, commit),
    }
    next
}

fn set_page_orientation(config: &mut AppConfiguration, page: usize, orientation: Orientation) {
    if orientation == config.orientation {
        config.page_orientations.remove(&page);
    } else {
        config.page_orientations.insert(page, orientation);
    }
}

fn sanitize_sheet(sheet: SheetSettings, config: &AppConfiguration) -> SheetSettings {
    let keep = |v: f64, fallback: f64| if v.is_finite() && v >= 0.0 { v } else { fallback };
    SheetSettings {
        padding_x: keep(sheet.padding_x, config.sheet.padding_x),
        padding_y: keep(sheet.padding_y, config.sheet.padding_y),
        gap_x: keep(sheet.gap_x, config.sheet.gap_x),
        gap_y: keep(sheet.gap_y, config.sheet.gap_y),
        flow: sheet.flow,
    }
}

fn apply_resize(state: &mut AppState, commit: &ResizeCommit) {
    let d = commit.dimensions;
    match commit.target {
        ResizeTarget::Defaults => {
            let mut visual = state.config.visual.clone();
            match commit.axis {
                DragAxis::Width => visual.tag_width = d.width,
                DragAxis::Height => visual.tag_height = d.height,
                DragAxis::Proportional => {
                    visual.tag_width = d.width;
                    visual.tag_height = d.height;
                    visual.font_scale = d.font_scale;
                }
            }
            if visual.is_valid() {
                state.config.visual = visual;
            } else {
                debug!(?d, "resize would leave no interior; ignored");
            }
        }
        ResizeTarget::Item(id) => {
            let defaults = &state.config.visual;
            let Some(item) = state.products.iter_mut().find(|item| item.id == id) else {
                return;
            };
            let mut overrides = item.style.clone().unwrap_or_default();
            match commit.axis {
                DragAxis::Width => overrides.tag_width = Some(d.width),
                DragAxis::Height => overrides.tag_height = Some(d.height),
                DragAxis::Proportional => {
                    overrides.tag_width = Some(d.width);
                    overrides.tag_height = Some(d.height);
                    overrides.font_scale = Some(d.font_scale);
                }
            }
            if style::resolve(defaults, Some(&overrides)).is_valid() {
                item.style = Some(overrides);
            } else {
                debug!(%id, ?d, "resize would leave no interior; ignored");
            }
        }
    }
}

/// The editing session: state, history and the glue to layout and resize.
#[derive(Debug, Clone)]
pub struct Editor {
    history: History<AppState>,
}

impl Default for Editor {
    fn default() -> Self {
        Editor::new(AppState::default())
    }
}

impl Editor {
    pub fn new(state: AppState) -> Self {
        Editor {
            history: History::new(state),
        }
    }

    /// Start from a loaded configuration and an empty product list.
    pub fn with_configuration(config: AppConfiguration) -> Self {
        Editor::new(AppState {
            products: Vec::new(),
            config,
        })
    }

    pub fn state(&self) -> &AppState {
        self.history.present()
    }

    pub fn history(&self) -> &History<AppState> {
        &self.history
    }

    /// Apply a command. Returns true when it changed the state.
    pub fn dispatch(&mut self, command: Command) -> bool {
        self.history.mutate(|state| apply(state, &command))
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    /// Paginate the present state.
    pub fn layout(&self) -> SheetLayout {
        let state = self.state();
        layout::layout(&state.products, &SheetConfig::from_configuration(&state.config))
    }

    /// Import CSV text as one undoable step. Returns how many items were added.
    pub fn import_csv(&mut self, text: &str) -> usize {
        let items = import::import_products(text);
        let count = items.len();
        if count > 0 {
            self.dispatch(Command::AddItems { items });
        }
        count
    }

    /// Start a resize gesture from the current dimensions of `target`.
    /// Returns `None` when the target item does not exist.
    pub fn begin_resize(
        &self,
        target: ResizeTarget,
        axis: DragAxis,
        pointer: Point,
    ) -> Option<ResizeGesture> {
        let defaults = &self.state().config.visual;
        let visual = match target {
            ResizeTarget::Defaults => defaults.clone(),
            ResizeTarget::Item(id) => style::resolve_item(defaults, self.state().item(id)?),
        };
        let start = Dimensions {
            width: visual.tag_width,
            height: visual.tag_height,
            font_scale: visual.font_scale,
        };
        Some(ResizeGesture::begin(target, axis, start, pointer))
    }

    /// Finish a gesture and commit its final value.
    pub fn finish_resize(&mut self, gesture: ResizeGesture) -> bool {
        self.dispatch(Command::CommitResize {
            commit: gesture.finish(),
        })
    }
}
