//! Command implementations for the `lmi` binary.
//!
//! Each command returns the text to print so it can be tested without a
//! terminal.

use std::path::Path;

use anyhow::{bail, Context, Result};
use lmi_client::{CatalogEntity, Classifier, CollectionQuery, Image, ImageParams, Lmi, ToHtml};
use lmi_common::sld::validate_xml;
use lmi_common::{
    sld_dump, sld_parse, BoundingBox, GeoJsonGeometry, HttpTransport, SldStyle, TileCalculator,
    TileFootprint,
};
use serde_json::Value;
use tracing::info;

/// Output style for entity listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Html,
}

/// Split `key=value` into its parts.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

/// Render search results one per line, or as numbered HTML cards.
pub fn render_results(results: &[CatalogEntity], output: Output) -> String {
    match output {
        Output::Text => results
            .iter()
            .map(|entity| {
                let name = entity.attributes().name.as_deref().unwrap_or_default();
                format!("{entity}\t{name}\n")
            })
            .collect(),
        Output::Html => {
            let maps: Vec<_> = results.iter().map(|e| e.attributes().to_map()).collect();
            let items = results.iter().zip(&maps).map(|(entity, attributes)| {
                let card = lmi_html::EntityCard {
                    id: entity.id(),
                    server: match entity {
                        CatalogEntity::Dataset(d) => d.server.as_str(),
                        CatalogEntity::Layer(l) => l.server.as_str(),
                    },
                    attributes,
                };
                match entity {
                    CatalogEntity::Dataset(_) => lmi_html::RenderItem::Dataset(card),
                    CatalogEntity::Layer(_) => lmi_html::RenderItem::Layer(card),
                }
            });
            lmi_html::show_all(items)
        }
    }
}

/// Run a catalog search.
pub async fn search<H: HttpTransport>(
    lmi: &Lmi<H>,
    query: &CollectionQuery,
    output: Output,
) -> Result<String> {
    let results = lmi
        .collection(query)
        .await
        .with_context(|| format!("Search for '{}' failed", query.search))?;
    info!(count = results.len(), "Search returned results");
    Ok(render_results(&results, output))
}

/// Tiles covering a geometry, or every tile of a bounding box.
pub fn tiles(
    bbox: Option<&BoundingBox>,
    geometry: Option<&GeoJsonGeometry>,
    zoom: u32,
) -> Result<Vec<TileFootprint>> {
    let calculator = TileCalculator::default();
    match (geometry, bbox) {
        (Some(geometry), _) => Ok(calculator.tiles_for_geometry(geometry, zoom)?),
        (None, Some(bbox)) => Ok(calculator.tiles_for_bounds(bbox, zoom)),
        (None, None) => bail!("Either a bounding box or a geometry is required"),
    }
}

/// One `z/x/y` path per line with the tile bounds.
pub fn render_tiles(tiles: &[TileFootprint]) -> String {
    tiles
        .iter()
        .map(|t| {
            format!(
                "{}\t{},{},{},{}\n",
                t.coord().path(),
                t.bounds.min_x,
                t.bounds.min_y,
                t.bounds.max_x,
                t.bounds.max_y
            )
        })
        .collect()
}

/// Parse an SLD fragment file into pretty JSON.
pub fn sld_to_json(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    validate_xml(&text).context("SLD is not well-formed XML")?;
    let style = sld_parse(&text).context("Invalid SLD")?;
    Ok(serde_json::to_string_pretty(&style)?)
}

/// Render a JSON style description as an SLD fragment.
pub fn json_to_sld(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let style: SldStyle = serde_json::from_str(&text).context("Invalid style JSON")?;
    Ok(sld_dump(&style))
}

/// Actions on a single image search hit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageActions {
    pub classify: bool,
    pub map: bool,
    pub html: bool,
}

/// Load an image from a search hit file and apply `actions`.
pub async fn image<H: HttpTransport>(
    transport: &H,
    hit_path: &Path,
    server: Option<&str>,
    actions: ImageActions,
) -> Result<String> {
    let text = std::fs::read_to_string(hit_path)
        .with_context(|| format!("Failed to read {}", hit_path.display()))?;
    let hit: Value = serde_json::from_str(&text).context("Invalid image JSON")?;
    let mut params = ImageParams::from_search_hit(&hit)?;
    if let Some(server) = server {
        params.server = server.to_string();
    }

    let mut image = Image::load(transport, params)
        .await
        .context("Failed to load image")?;
    if actions.classify {
        image = image
            .classify(transport, Classifier::RandomForest)
            .await
            .context("Classification failed")?;
    }

    let mut out = if actions.html {
        image.to_html()
    } else {
        format!("{image} ({})", image.kind)
    };
    out.push('\n');

    if actions.map {
        let view = image.map(transport, None, None).await?;
        out.push_str(&serde_json::to_string_pretty(&view)?);
        out.push('\n');
    }
    Ok(out)
}

/// Read a GeoJSON geometry, accepting a bare geometry or a feature.
pub fn read_geometry(path: &Path) -> Result<GeoJsonGeometry> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)?;
    let geometry = match value.get("geometry") {
        Some(geometry) => geometry.clone(),
        None => value,
    };
    if geometry.get("type").is_none() {
        bail!("{} does not contain a GeoJSON geometry", path.display());
    }
    Ok(serde_json::from_value(geometry)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmi_client::{Dataset, DatasetAttributes};
    use std::io::Write;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("provider=gee").unwrap(),
            ("provider".to_string(), "gee".to_string())
        );
        assert!(parse_key_value("provider").is_err());
    }

    #[test]
    fn test_render_results_text() {
        let attributes = DatasetAttributes {
            name: Some("Forest loss".to_string()),
            ..Default::default()
        };
        let results = vec![CatalogEntity::Dataset(Dataset::from_attributes(
            "d-1",
            "https://api.resourcewatch.org",
            attributes,
        ))];
        assert_eq!(render_results(&results, Output::Text), "Dataset d-1\tForest loss\n");
        assert!(render_results(&results, Output::Html).contains("<b>1. </b>"));
    }

    #[test]
    fn test_tiles_for_bbox() {
        let bbox = BoundingBox::new(-10.0, -10.0, 10.0, 10.0);
        let tiles = tiles(Some(&bbox), None, 1).unwrap();
        assert_eq!(tiles.len(), 4);
        assert!(render_tiles(&tiles).contains("1/0/0\t"));
        assert!(super::tiles(None, None, 1).is_err());
    }

    #[test]
    fn test_sld_file_round_trip() {
        let mut sld = tempfile::NamedTempFile::new().unwrap();
        write!(
            sld,
            "<RasterSymbolizer> <ColorMap type=\"ramp\" extended=\"false\"> \
             <ColorMapEntry color=\"#000000\" quantity=\"0\" /> + \
             </ColorMap> </RasterSymbolizer>"
        )
        .unwrap();
        let json = sld_to_json(sld.path()).unwrap();
        assert!(json.contains("\"ramp\""));

        let mut style = tempfile::NamedTempFile::new().unwrap();
        write!(style, "{json}").unwrap();
        let dumped = json_to_sld(style.path()).unwrap();
        assert!(dumped.starts_with("<RasterSymbolizer> <ColorMap type=\"ramp\""));
    }
}
