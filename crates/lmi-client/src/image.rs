//! Satellite images served by the recent-tiles service.
//!
//! An image is identified by its `source` string and carries a footprint
//! feature. Thumbnails and tile URLs are produced server-side from the
//! visualisation bands; classification yields a new image whose tiles come
//! from the classifier.

use std::fmt;
use std::str::FromStr;

use geo::LineString;
use lmi_common::geometry::{ring_bounds, ring_centroid};
use lmi_common::{Feature, HttpTransport, LmiError, LmiResult};
use lmi_html::{ImageCard, RenderItem, ToHtml};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use crate::config::DEFAULT_IMAGE_SERVER;

/// Outline colour of the footprint overlay.
pub const DEFAULT_OUTLINE_COLOR: &str = "#64D1B8";

/// Outline weight of the footprint overlay.
pub const DEFAULT_OUTLINE_WEIGHT: u32 = 6;

/// Base map used under the image tiles.
pub const BASE_TILES: &str = "OpenStreetMap";

/// What an image's tiles show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    #[default]
    #[serde(rename = "Image")]
    Image,
    #[serde(rename = "Classified Image")]
    Classified,
    #[serde(rename = "Composite Image")]
    Composite,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Image => "Image",
            ImageKind::Classified => "Classified Image",
            ImageKind::Composite => "Composite Image",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bands and stretch used to render an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandViz {
    pub bands: Vec<String>,
    pub min: f64,
    pub max: f64,
}

impl Default for BandViz {
    fn default() -> Self {
        Self {
            bands: vec!["B4".to_string(), "B3".to_string(), "B2".to_string()],
            min: 0.0,
            max: 0.4,
        }
    }
}

/// Classification model offered by the classifier endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    RandomForest,
}

impl FromStr for Classifier {
    type Err = LmiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random_forest" => Ok(Classifier::RandomForest),
            other => Err(LmiError::Validation(format!(
                "Unknown classifier '{other}', expected 'random_forest'"
            ))),
        }
    }
}

/// Everything needed to construct an [`Image`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    pub source: String,
    pub kind: ImageKind,
    pub instrument: Option<String>,
    pub date_time: Option<String>,
    pub cloud_score: Option<f64>,
    pub bbox: Feature,
    pub band_viz: Option<BandViz>,
    pub thumb_url: Option<String>,
    pub tile_url: Option<String>,
    pub server: String,
}

impl ImageParams {
    /// Parameters with default bands and the default imagery server.
    pub fn new(source: impl Into<String>, bbox: Feature) -> Self {
        Self {
            source: source.into(),
            kind: ImageKind::Image,
            instrument: None,
            date_time: None,
            cloud_score: None,
            bbox,
            band_viz: Some(BandViz::default()),
            thumb_url: None,
            tile_url: None,
            server: DEFAULT_IMAGE_SERVER.to_string(),
        }
    }

    /// Parameters from an image search hit.
    ///
    /// Reads `source`, `instrument`, `date_time`, `cloud_score`, `bbox`,
    /// `thumb_url` and `tile_url`.
    pub fn from_search_hit(hit: &Value) -> LmiResult<Self> {
        let source = hit
            .get("source")
            .and_then(Value::as_str)
            .ok_or_else(|| LmiError::Validation("Image search hit has no source".to_string()))?;
        let bbox: Feature = serde_json::from_value(
            hit.get("bbox")
                .cloned()
                .ok_or_else(|| LmiError::Validation(format!("Image {source} has no bbox")))?,
        )?;
        let text = |key: &str| hit.get(key).and_then(Value::as_str).map(str::to_string);

        let mut params = Self::new(source, bbox);
        params.instrument = text("instrument");
        params.date_time = text("date_time");
        params.cloud_score = hit.get("cloud_score").and_then(Value::as_f64);
        params.thumb_url = text("thumb_url");
        params.tile_url = text("tile_url");
        Ok(params)
    }
}

/// Tile layer drawn over the base map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub url: String,
    pub attribution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStyle {
    pub fill_opacity: f64,
    pub weight: u32,
    pub color: String,
}

/// GeoJSON overlay outlining the image footprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    /// FeatureCollection as a JSON string.
    pub data: String,
    pub style: OverlayStyle,
}

/// Description of an interactive map showing one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    /// `[lat, lon]` of the footprint centroid.
    pub center: [f64; 2],
    pub base_tiles: String,
    pub tile_layer: TileLayer,
    pub overlay: Overlay,
    /// `[[south, west], [north, east]]`.
    pub fit_bounds: [[f64; 2]; 2],
}

/// A satellite image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub source: String,
    pub kind: ImageKind,
    pub instrument: Option<String>,
    pub date_time: Option<String>,
    pub cloud_score: Option<f64>,
    pub bbox: Feature,
    pub band_viz: Option<BandViz>,
    pub thumb_url: Option<String>,
    pub tile_url: Option<String>,
    pub server: String,
    /// Closed exterior ring of the footprint.
    pub ring: LineString<f64>,
    pub attributes: Map<String, Value>,
}

impl Image {
    /// Build an image without touching the network.
    ///
    /// Fails when the footprint has no usable ring.
    pub fn new(params: ImageParams) -> LmiResult<Self> {
        let ring = params.bbox.geometry.ring()?;
        let mut attributes = Map::new();
        attributes.insert("provider".to_string(), Value::String(params.source.clone()));

        Ok(Self {
            source: params.source,
            kind: params.kind,
            instrument: params.instrument,
            date_time: params.date_time,
            cloud_score: params.cloud_score,
            bbox: params.bbox,
            band_viz: params.band_viz,
            thumb_url: params.thumb_url,
            tile_url: params.tile_url,
            server: params.server,
            ring,
            attributes,
        })
    }

    /// Build an image and fetch its thumbnail when none was given.
    pub async fn load<H>(transport: &H, params: ImageParams) -> LmiResult<Self>
    where
        H: HttpTransport + ?Sized,
    {
        let mut image = Self::new(params)?;
        if image.thumb_url.is_none() {
            image.thumb_url = Some(image.thumbnail_url(transport).await?);
        }
        Ok(image)
    }

    /// Identifier the recent-tiles service knows this image by.
    pub fn provider(&self) -> &str {
        self.attributes
            .get("provider")
            .and_then(Value::as_str)
            .unwrap_or(&self.source)
    }

    fn tiles_payload(&self) -> Value {
        let bands = self
            .band_viz
            .as_ref()
            .map(|viz| viz.bands.clone())
            .unwrap_or_else(|| BandViz::default().bands);
        json!({ "source_data": [{ "source": self.source }], "bands": bands })
    }

    async fn recent_tiles<H>(&self, transport: &H, endpoint: &str, field: &str) -> LmiResult<String>
    where
        H: HttpTransport + ?Sized,
    {
        let url = format!("{}/recent-tiles/{endpoint}", self.server);
        debug!(url = %url, source = %self.source, "Requesting recent tiles");
        let response = transport
            .post_json(&url, &self.tiles_payload())
            .await?
            .ensure_ok()?;
        let value = response.pointer(&format!("/data/attributes/0/{field}"))?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LmiError::bad_response(response.status, &response.url, response.body.clone()))
    }

    /// Ask the server for a thumbnail URL.
    #[instrument(skip(self, transport), fields(source = %self.source))]
    pub async fn thumbnail_url<H>(&self, transport: &H) -> LmiResult<String>
    where
        H: HttpTransport + ?Sized,
    {
        self.recent_tiles(transport, "thumbs", "thumbnail_url").await
    }

    /// Ask the server for a tile URL template.
    #[instrument(skip(self, transport), fields(source = %self.source))]
    pub async fn image_url<H>(&self, transport: &H) -> LmiResult<String>
    where
        H: HttpTransport + ?Sized,
    {
        self.recent_tiles(transport, "tiles", "tile_url").await
    }

    /// Classify the image, returning a new image backed by the classifier's tiles.
    ///
    /// `self` is left untouched.
    #[instrument(skip(self, transport), fields(source = %self.source))]
    pub async fn classify<H>(&self, transport: &H, classifier: Classifier) -> LmiResult<Image>
    where
        H: HttpTransport + ?Sized,
    {
        debug!(?classifier, "Classifying image");
        let url = format!("{}/recent-tiles-classifier", self.server);
        let response = transport
            .get(&url, &[("img_id", self.provider())])
            .await?
            .ensure_ok()?;
        let classified_tiles = response
            .pointer("/data/attributes/url")?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LmiError::bad_response(response.status, &response.url, response.body.clone()))?;

        Image::new(ImageParams {
            source: self.source.clone(),
            kind: ImageKind::Classified,
            instrument: self.instrument.clone(),
            date_time: self.date_time.clone(),
            cloud_score: self.cloud_score,
            bbox: self.bbox.clone(),
            band_viz: None,
            thumb_url: self.thumb_url.clone(),
            tile_url: Some(classified_tiles),
            server: self.server.clone(),
        })
    }

    /// Describe a map of this image with its footprint outlined.
    ///
    /// Fetches and keeps the tile URL when it is not known yet.
    pub async fn map<H>(
        &mut self,
        transport: &H,
        color: Option<&str>,
        weight: Option<u32>,
    ) -> LmiResult<MapView>
    where
        H: HttpTransport + ?Sized,
    {
        let centroid = ring_centroid(&self.ring)
            .ok_or_else(|| LmiError::Validation(format!("{self} has an empty footprint")))?;
        let bounds = ring_bounds(&self.ring)
            .ok_or_else(|| LmiError::Validation(format!("{self} has an empty footprint")))?;

        let tile_url = match &self.tile_url {
            Some(url) => url.clone(),
            None => {
                let url = self.image_url(transport).await?;
                self.tile_url = Some(url.clone());
                url
            }
        };

        Ok(MapView {
            center: [centroid.y(), centroid.x()],
            base_tiles: BASE_TILES.to_string(),
            tile_layer: TileLayer {
                url: tile_url,
                attribution: format!(
                    "{} image",
                    self.instrument.as_deref().unwrap_or_default()
                ),
            },
            overlay: Overlay {
                data: self.bbox.geometry.to_feature_collection_string(),
                style: OverlayStyle {
                    fill_opacity: 0.0,
                    weight: weight.unwrap_or(DEFAULT_OUTLINE_WEIGHT),
                    color: color.unwrap_or(DEFAULT_OUTLINE_COLOR).to_string(),
                },
            },
            fit_bounds: bounds.to_lat_lon_bounds(),
        })
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image {}", self.source)
    }
}

impl ToHtml for Image {
    fn to_html(&self) -> String {
        let source_label = match self.kind {
            ImageKind::Image => self.instrument.as_deref().unwrap_or_default(),
            kind => kind.as_str(),
        };
        lmi_html::html_box(&RenderItem::Image(ImageCard {
            thumb_url: self.thumb_url.as_deref(),
            source_label,
            date_time: self.date_time.as_deref(),
            cloud_score: self.cloud_score,
        }))
    }
}
