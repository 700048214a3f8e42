//! Async client for a geospatial catalog API.
//!
//! Datasets, layers, widgets and geostore geometries come from the catalog
//! server (`/v1/...`); satellite images come from the recent-tiles service.
//! All network access goes through [`HttpTransport`], so every entity can be
//! exercised against canned responses.

pub mod attributes;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod geometry;
pub mod image;
pub mod layer;
pub mod transport;
pub mod widget;

pub use attributes::{DatasetAttributes, EntityAttributes};
pub use catalog::{filter_results, order_results, CatalogEntity, CollectionQuery, Lmi};
pub use config::{ClientConfig, DEFAULT_IMAGE_SERVER, DEFAULT_SERVER};
pub use dataset::Dataset;
pub use geometry::{Geometry, GeometryAttributes};
pub use image::{BandViz, Classifier, Image, ImageKind, ImageParams, MapView};
pub use layer::Layer;
pub use lmi_common::{HttpResponse, HttpTransport, LmiError, LmiResult};
pub use lmi_html::ToHtml;
pub use transport::ReqwestTransport;
pub use widget::Widget;

/// Random 16-bit value appended as `hash=` to defeat response caching.
pub(crate) fn cache_buster() -> u16 {
    rand::random()
}
