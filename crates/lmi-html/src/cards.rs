//! Fixed-template HTML cards.
//!
//! Interpolated values are inserted verbatim; nothing is escaped.

use serde_json::{Map, Value};

use crate::branding::{branding_for, server_uses_widgets};

const CONTAINER_OPEN: &str = "<div class='item_container' style='height: auto; overflow: hidden; \
    border: 1px solid #2BA4A0; border-radius: 2px; background: #2BA4A0; line-height: 1.21429em; padding: 10px;'>";
const IMAGE_CONTAINER_OPEN: &str = "<div class='item_container' style='height: auto; overflow: hidden; \
    border: 1px solid #2BA4A0; border-radius: 5px; background: #2BA4A0; line-height: 1.21429em; padding: 10px;'>";
const LOGO_COLUMN_OPEN: &str = "<div class='item_left' style='width: 210px; float: left;'>";
const THUMB_COLUMN_OPEN: &str = "<div class='item_left' style='width: 100px; height: 100px; float: left;'>";
const TEXT_COLUMN_OPEN: &str =
    "</a></div><div class='item_right' style='float: none; width: auto; padding-left: 10px; overflow: hidden;'>";
const CLOSE: &str = " </div> </div>";

/// Catalog entity kinds with an API page of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Dataset,
    Layer,
    Widget,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Dataset => "Dataset",
            EntityKind::Layer => "Layer",
            EntityKind::Widget => "Widget",
        }
    }

    /// API link for an entity, with the `includes` the server understands.
    pub fn api_url(&self, server: &str, id: &str) -> String {
        let widgets = server_uses_widgets(server);
        match (self, widgets) {
            (EntityKind::Dataset, true) => {
                format!("{server}/v1/dataset/{id}?includes=vocabulary,metadata,layer,widget")
            }
            (EntityKind::Dataset, false) => format!("{server}/v1/dataset/{id}?includes=metadata,layer"),
            (EntityKind::Layer, true) => format!("{server}/v1/layer/{id}?includes=vocabulary,metadata"),
            (EntityKind::Layer, false) => format!("{server}/v1/layer/{id}?includes=metadata"),
            (EntityKind::Widget, _) => format!("{server}/v1/widget/{id}"),
        }
    }
}

/// Fields needed to render a dataset, layer or widget.
#[derive(Debug, Clone, Copy)]
pub struct EntityCard<'a> {
    pub id: &'a str,
    pub server: &'a str,
    pub attributes: &'a Map<String, Value>,
}

/// Fields needed to render a geostore geometry.
#[derive(Debug, Clone, Copy)]
pub struct GeometryCard<'a> {
    pub id: &'a str,
    pub server: &'a str,
    pub info: Option<&'a Map<String, Value>>,
}

/// Fields needed to render a satellite image.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCard<'a> {
    pub thumb_url: Option<&'a str>,
    /// Instrument name, or the image kind for derived images.
    pub source_label: &'a str,
    pub date_time: Option<&'a str>,
    pub cloud_score: Option<f64>,
}

/// Render a JSON value the way it should read inside a card.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn applications(attributes: &Map<String, Value>) -> String {
    attributes
        .get("application")
        .and_then(Value::as_array)
        .map(|apps| {
            apps.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
                .to_uppercase()
        })
        .unwrap_or_default()
}

/// One-line description of where the entity's data lives.
pub fn table_statement(attributes: &Map<String, Value>) -> String {
    let provider = display_value(attributes.get("provider"));
    let table = display_value(attributes.get("tableName"));
    let connector_url = attributes
        .get("connectorUrl")
        .filter(|v| truthy(v))
        .map(|v| display_value(Some(v)));

    match (provider.as_str(), connector_url) {
        ("gee", _) => format!(
            "GEE asset: <a href='https://code.earthengine.google.com/asset={table}' target='_blank'>{table}</a>"
        ),
        ("cartodb", Some(url)) => {
            format!("Carto table: <a href={url} target='_blank'>{table}</a>")
        }
        ("csv", Some(url)) => format!("CSV Table: <a href={url} target='_blank'>{table}</a>"),
        _ => format!("Data source {provider}"),
    }
}

/// Card for a dataset, layer or widget. `index` numbers catalog listings.
pub fn entity_card(kind: EntityKind, card: &EntityCard<'_>, index: Option<usize>) -> String {
    let attributes = card.attributes;
    let branding = branding_for(card.server);
    let url_link = kind.api_url(card.server, card.id);
    let numbering = index.map(|i| format!("<b>{i}. </b>")).unwrap_or_default();

    format!(
        "{CONTAINER_OPEN}{LOGO_COLUMN_OPEN}{header}{TEXT_COLUMN_OPEN}\
         {numbering}<a href={url_link} target='_blank'><b>{name}</b></a>\
         <br> {table} | {kind} in {apps}.\
         <br>Last Modified: {updated}\
         <br><a href='{server}/v1/fields/{id}' target='_blank'>Fields</a>\
         {separator}Connector: {provider} | Published: {published}{CLOSE}",
        header = branding.header(),
        name = display_value(attributes.get("name")),
        table = table_statement(attributes),
        kind = kind.label(),
        apps = applications(attributes),
        updated = display_value(attributes.get("updatedAt")),
        server = card.server,
        id = card.id,
        separator = if index.is_some() { " | " } else { " " },
        provider = display_value(attributes.get("provider")),
        published = display_value(attributes.get("published")),
    )
}

/// Card for a geostore geometry listing its truthy `info` entries.
pub fn geometry_card(card: &GeometryCard<'_>) -> String {
    let branding = branding_for(card.server);
    let url_link = format!("{}/v1/geostore/{}", card.server, card.id);

    let mut html = format!(
        "{IMAGE_CONTAINER_OPEN}{LOGO_COLUMN_OPEN}{header}{TEXT_COLUMN_OPEN}\
         <b>Geometry id</b>: <a href={url_link} target='_blank'>{id}</a></br>",
        header = branding.header(),
        id = card.id,
    );
    if let Some(info) = card.info {
        for (key, value) in info {
            if key != "simplifyThresh" && truthy(value) {
                html.push_str(&format!("<br><i>{key}: {}</i>", display_value(Some(value))));
            }
        }
    }
    html.push_str(CLOSE);
    html
}

/// Card for a satellite image with its thumbnail.
pub fn image_card(card: &ImageCard<'_>) -> String {
    let thumb = card.thumb_url.unwrap_or_default();
    let cloud = card.cloud_score.map(|c| c.to_string()).unwrap_or_default();

    format!(
        "{IMAGE_CONTAINER_OPEN}{THUMB_COLUMN_OPEN}\
         <a href='{thumb}' target='_blank'><img class='itemThumbnail' src='{thumb}'>{TEXT_COLUMN_OPEN}\
         <b>Image Source</b>: {source} </br>\
         <b>Datetime</b>: {date_time} </br>\
         <b>Cloud score </b>: {cloud} </br>{CLOSE}",
        source = card.source_label,
        date_time = card.date_time.unwrap_or_default(),
    )
}
