//! HTML cards describing catalog entities for notebook-style display.
//!
//! Every entity is rendered through [`RenderItem`], a tagged enum over the
//! fixed set of kinds, so the template is chosen by variant rather than by
//! inspecting type names at run time.

pub mod branding;
pub mod cards;

use serde_json::{Map, Value};

pub use branding::{branding_for, server_uses_widgets, Branding};
pub use cards::{EntityCard, EntityKind, GeometryCard, ImageCard};

/// Anything that can describe itself as an HTML fragment.
pub trait ToHtml {
    fn to_html(&self) -> String;
}

/// An item to render, discriminated by kind.
#[derive(Debug, Clone, Copy)]
pub enum RenderItem<'a> {
    Dataset(EntityCard<'a>),
    Layer(EntityCard<'a>),
    Widget(EntityCard<'a>),
    Geometry(GeometryCard<'a>),
    Image(ImageCard<'a>),
}

/// Card for a single item.
pub fn html_box(item: &RenderItem<'_>) -> String {
    match item {
        RenderItem::Dataset(card) => cards::entity_card(EntityKind::Dataset, card, None),
        RenderItem::Layer(card) => cards::entity_card(EntityKind::Layer, card, None),
        RenderItem::Widget(card) => cards::entity_card(EntityKind::Widget, card, None),
        RenderItem::Geometry(card) => cards::geometry_card(card),
        RenderItem::Image(card) => cards::image_card(card),
    }
}

/// Numbered card for position `index` in a catalog listing.
///
/// Geometries and images have no numbered variant and render as `html_box`.
pub fn show(item: &RenderItem<'_>, index: usize) -> String {
    match item {
        RenderItem::Dataset(card) => cards::entity_card(EntityKind::Dataset, card, Some(index)),
        RenderItem::Layer(card) => cards::entity_card(EntityKind::Layer, card, Some(index)),
        RenderItem::Widget(card) => cards::entity_card(EntityKind::Widget, card, Some(index)),
        other => html_box(other),
    }
}

/// Card for a raw image search hit (`thumb_url`, `instrument`, `date_time`, `cloud_score`).
pub fn show_image_collection(entry: &Map<String, Value>) -> String {
    let card = ImageCard {
        thumb_url: entry.get("thumb_url").and_then(Value::as_str),
        source_label: entry
            .get("instrument")
            .and_then(Value::as_str)
            .unwrap_or_default(),
        date_time: entry.get("date_time").and_then(Value::as_str),
        cloud_score: entry.get("cloud_score").and_then(Value::as_f64),
    };
    cards::image_card(&card)
}

/// Concatenate numbered cards for a listing, starting at 1.
pub fn show_all<'a>(items: impl IntoIterator<Item = RenderItem<'a>>) -> String {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| show(&item, i + 1))
        .collect()
}
