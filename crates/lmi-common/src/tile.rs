//! Web Mercator tile math.
//!
//! Converts between zoom levels, pixel coordinates, EPSG:3857 meters and
//! slippy-map tile indices, and lists the tile footprints covering an area.
//! Based on the tile-bounds algorithm by Gennadii Donchyts (MIT licensed).
//!
//! The point conversions do not validate their input: out-of-range latitudes
//! or negative zoom levels produce whatever the floating point math produces
//! (NaN or infinity). Tile coverage clamps to the Web Mercator extent so the
//! poles map to the first and last tile rows.

use geo::{Coord, Intersects, MapCoords, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::{BoundingBox, GeoJsonGeometry, LmiResult};

/// Earth's equatorial circumference in meters.
pub const EQUATORIAL_CIRCUMFERENCE: f64 = 40_075_016.686;

/// Half the Web Mercator extent: `2π · 6378137 / 2`.
pub const ORIGIN_SHIFT: f64 = 2.0 * PI * 6_378_137.0 / 2.0;

/// Default tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// A tile coordinate (z/x/y) in the XYZ scheme (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: i64,
    /// Row (y)
    pub y: i64,
}

impl TileCoord {
    pub fn new(z: u32, x: i64, y: i64) -> Self {
        Self { z, x, y }
    }

    /// "z/x/y" path fragment.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.z, self.x, self.y)
    }
}

/// A tile together with its EPSG:3857 footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileFootprint {
    pub tx: i64,
    pub ty: i64,
    pub zoom: u32,
    /// Footprint in meters.
    pub bounds: BoundingBox,
}

impl TileFootprint {
    pub fn coord(&self) -> TileCoord {
        TileCoord::new(self.zoom, self.tx, self.ty)
    }
}

/// Tile calculator parameterised by tile size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileCalculator {
    pub tile_size: u32,
}

impl Default for TileCalculator {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl TileCalculator {
    pub fn new(tile_size: u32) -> Self {
        Self { tile_size }
    }

    /// Meters per pixel at a zoom level.
    pub fn zoom_to_scale(&self, zoom: f64) -> f64 {
        let tile_width = EQUATORIAL_CIRCUMFERENCE / 2f64.powf(zoom);
        tile_width / self.tile_size as f64
    }

    /// Smallest zoom level whose pixels are no larger than `scale` meters.
    pub fn scale_to_zoom(&self, scale: f64) -> i32 {
        let tile_width = scale * self.tile_size as f64;
        let zoom = (EQUATORIAL_CIRCUMFERENCE / tile_width).ln() / 2f64.ln();
        zoom.ceil() as i32
    }

    /// Pixel coordinates at `zoom` to EPSG:3857 meters.
    pub fn pixels_to_meters(&self, px: f64, py: f64, zoom: f64) -> (f64, f64) {
        let resolution = self.zoom_to_scale(zoom);
        (px * resolution - ORIGIN_SHIFT, py * resolution - ORIGIN_SHIFT)
    }

    /// EPSG:3857 meters to pixel coordinates at `zoom`.
    pub fn meters_to_pixels(&self, x: f64, y: f64, zoom: f64) -> (f64, f64) {
        let resolution = self.zoom_to_scale(zoom);
        ((x + ORIGIN_SHIFT) / resolution, (y + ORIGIN_SHIFT) / resolution)
    }

    /// Footprint of an XYZ tile in meters.
    ///
    /// The row is flipped to the bottom-left origin used by the pixel math.
    pub fn tile_bounds(&self, tx: i64, ty: i64, zoom: u32) -> BoundingBox {
        let size = self.tile_size as f64;
        let zoom_f = zoom as f64;
        let flipped = 2f64.powi(zoom as i32) - ty as f64 - 1.0;

        let (min_x, min_y) = self.pixels_to_meters(tx as f64 * size, flipped * size, zoom_f);
        let (max_x, max_y) =
            self.pixels_to_meters((tx + 1) as f64 * size, (flipped + 1.0) * size, zoom_f);

        BoundingBox::new(min_x, min_y, max_x, max_y)
    }

    /// Every tile between the corner tiles of a lon/lat bounding box.
    ///
    /// Corners beyond the Web Mercator extent are clamped onto the edge tiles.
    pub fn tiles_for_bounds(&self, bbox: &BoundingBox, zoom: u32) -> Vec<TileFootprint> {
        let (min_tx, min_corner_ty) = corner_tile(bbox.min_x, bbox.min_y, zoom);
        let (max_tx, max_corner_ty) = corner_tile(bbox.max_x, bbox.max_y, zoom);

        let mut tiles = Vec::new();
        for tx in min_tx..=max_tx {
            // the upper-right corner has the smaller XYZ row
            for ty in max_corner_ty..=min_corner_ty {
                tiles.push(TileFootprint {
                    tx,
                    ty,
                    zoom,
                    bounds: self.tile_bounds(tx, ty, zoom),
                });
            }
        }
        tiles
    }

    /// Tiles from `tiles_for_bounds` whose footprint intersects the geometry.
    pub fn tiles_for_geometry(
        &self,
        geometry: &GeoJsonGeometry,
        zoom: u32,
    ) -> LmiResult<Vec<TileFootprint>> {
        let polygon = geometry.to_polygon()?;
        let exterior = polygon.exterior();
        let bbox = crate::geometry::ring_bounds(exterior).ok_or_else(|| {
            crate::LmiError::Validation("Geometry has an empty exterior ring".to_string())
        })?;

        let projected: Polygon<f64> = polygon.map_coords(|c| {
            let (x, y) = degrees_to_meters(c.x, clamp_latitude(c.y));
            Coord { x, y }
        });

        let tiles = self
            .tiles_for_bounds(&bbox, zoom)
            .into_iter()
            .filter(|tile| {
                let b = tile.bounds;
                let rect = Rect::new(
                    Coord {
                        x: b.min_x,
                        y: b.min_y,
                    },
                    Coord {
                        x: b.max_x,
                        y: b.max_y,
                    },
                );
                rect.intersects(&projected)
            })
            .collect::<Vec<_>>();

        tracing::debug!(zoom, count = tiles.len(), "Tiles intersecting geometry");
        Ok(tiles)
    }
}

fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
}

/// Tile of a bbox corner, kept inside the `2^zoom` grid.
fn corner_tile(lon: f64, lat: f64, zoom: u32) -> (i64, i64) {
    let last = 2f64.powi(zoom as i32) as i64 - 1;
    let (tx, ty) = degrees_to_tiles(lon, clamp_latitude(lat), zoom);
    (tx.clamp(0, last), ty.clamp(0, last))
}

/// Slippy-map tile containing a lon/lat position.
pub fn degrees_to_tiles(lon: f64, lat: f64, zoom: u32) -> (i64, i64) {
    let n = 2f64.powi(zoom as i32);
    let lat_rad = to_radians(lat);
    let tx = ((lon + 180.0) / 360.0 * n).floor();
    let ty = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();
    (tx as i64, ty as i64)
}

/// North-west corner of a slippy-map tile as (lon, lat).
pub fn tiles_to_degrees(tx: f64, ty: f64, zoom: u32) -> (f64, f64) {
    let n = 2f64.powi(zoom as i32);
    let lon = tx / n * 360.0 - 180.0;
    let m = PI - 2.0 * PI * ty / n;
    let lat = to_degrees((0.5 * (m.exp() - (-m).exp())).atan());
    (lon, lat)
}

/// Spherical Mercator projection of a lon/lat position, in meters.
pub fn degrees_to_meters(lon: f64, lat: f64) -> (f64, f64) {
    let x = lon * ORIGIN_SHIFT / 180.0;
    let y = ((90.0 + lat) * PI / 360.0).tan().ln() / (PI / 180.0);
    (x, y * ORIGIN_SHIFT / 180.0)
}

pub fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

pub fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Earth Engine tile URL template for a map id.
pub fn earth_engine_tile_url(map_id: &str) -> String {
    format!("https://earthengine.googleapis.com/v1alpha/{map_id}/tiles/{{z}}/{{x}}/{{y}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_scale_roundtrip() {
        let calc = TileCalculator::default();
        let scale = calc.zoom_to_scale(0.0);
        assert!((scale - 156_543.033_928_75).abs() < 1e-3);
        assert_eq!(calc.scale_to_zoom(scale * 1.01), 0);
        assert_eq!(calc.scale_to_zoom(calc.zoom_to_scale(12.0) * 0.99), 13);
    }

    #[test]
    fn test_pixels_meters_inverse() {
        let calc = TileCalculator::default();
        for zoom in 0..=20 {
            let z = zoom as f64;
            let (x, y) = calc.pixels_to_meters(123.5, 987.25, z);
            let (px, py) = calc.meters_to_pixels(x, y, z);
            assert!((px - 123.5).abs() < 1e-6, "zoom {zoom}: {px}");
            assert!((py - 987.25).abs() < 1e-6, "zoom {zoom}: {py}");
        }
    }

    #[test]
    fn test_degrees_to_tiles_origin() {
        assert_eq!(degrees_to_tiles(0.0, 0.0, 0), (0, 0));
        for zoom in 1..=18 {
            let half = 1i64 << (zoom - 1);
            assert_eq!(degrees_to_tiles(0.0, 0.0, zoom), (half, half));
        }
    }

    #[test]
    fn test_tiles_to_degrees_corner() {
        let (lon, lat) = tiles_to_degrees(0.0, 0.0, 0);
        assert!((lon + 180.0).abs() < 1e-9);
        assert!((lat - 85.051_128_78).abs() < 1e-6);
    }

    #[test]
    fn test_tile_bounds_world() {
        let calc = TileCalculator::default();
        let b = calc.tile_bounds(0, 0, 0);
        assert!((b.min_x + ORIGIN_SHIFT).abs() < 1.0);
        assert!((b.max_y - ORIGIN_SHIFT).abs() < 1.0);
    }

    #[test]
    fn test_tile_bounds_flips_row() {
        let calc = TileCalculator::default();
        // XYZ row 0 at zoom 1 is the northern half
        let north_east = calc.tile_bounds(1, 0, 1);
        assert!(north_east.min_x.abs() < 1.0);
        assert!(north_east.min_y.abs() < 1.0);
        assert!(north_east.max_y > 2.0e7);
    }

    #[test]
    fn test_earth_engine_tile_url() {
        assert_eq!(
            earth_engine_tile_url("projects/p/maps/abc"),
            "https://earthengine.googleapis.com/v1alpha/projects/p/maps/abc/tiles/{z}/{x}/{y}"
        );
    }
}
