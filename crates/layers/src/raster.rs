use foundation::bounds::Extent;
use foundation::math::{TILE_SIZE_PX, WGS84_A, base_resolution};

use crate::layer::{Layer, LayerId};

pub const OSM_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// Base map of XYZ raster tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    id: LayerId,
    visible: bool,
    pub url_template: String,
    pub max_zoom: u8,
}

impl TileLayer {
    pub fn new(id: u64, url_template: impl Into<String>) -> Self {
        Self {
            id: LayerId(id),
            visible: true,
            url_template: url_template.into(),
            max_zoom: 19,
        }
    }

    pub fn osm(id: u64) -> Self {
        Self::new(id, OSM_TILE_URL)
    }

    pub fn tile_url(&self, tile: TileCoord) -> String {
        self.url_template
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }

    /// Tiles covering `view` (Web-Mercator meters) at `zoom`, row-major from the top-left.
    pub fn tiles_covering(&self, view: Extent, zoom: f64) -> Vec<TileCoord> {
        if !self.visible {
            return Vec::new();
        }
        let z = zoom.round().clamp(0.0, self.max_zoom as f64) as u8;
        let n = 1u32 << z;
        let tile_span = base_resolution() * TILE_SIZE_PX / (n as f64);
        let origin = std::f64::consts::PI * WGS84_A;

        let col = |x: f64| (((x + origin) / tile_span).floor() as i64).clamp(0, n as i64 - 1) as u32;
        let row = |y: f64| (((origin - y) / tile_span).floor() as i64).clamp(0, n as i64 - 1) as u32;

        let (x0, x1) = (col(view.min[0]), col(view.max[0]));
        let (y0, y1) = (row(view.max[1]), row(view.min[1]));

        let mut out = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                out.push(TileCoord { z, x, y });
            }
        }
        out
    }
}

impl Layer for TileLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
