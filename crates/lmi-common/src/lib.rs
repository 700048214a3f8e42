//! Common types and utilities shared across the catalog client crates.

pub mod bbox;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod sld;
pub mod tile;
pub mod transport;

pub use bbox::BoundingBox;
pub use error::{LmiError, LmiResult};
pub use filters::{parse_filters, parse_filters_report, FilterReport, FILTER_WHITELIST};
pub use geometry::{Feature, GeoJsonGeometry};
pub use sld::{sld_dump, sld_parse, ColorMapEntry, SldStyle, SldType};
pub use tile::{TileCalculator, TileCoord, TileFootprint};
pub use transport::{HttpResponse, HttpTransport};
