use foundation::bounds::Extent;
use foundation::math::{
    lonlat_to_mercator, mercator_to_lonlat, resolution_for_zoom, zoom_for_resolution,
};

pub const DEFAULT_CENTER: [f64; 2] = [37.566_193_7, 55.746_503_5];
pub const DEFAULT_ZOOM: f64 = 10.0;

/// Padding around a fitted entity, pixels on every side.
pub const FIT_PADDING_PX: f64 = 100.0;
/// Fitting never zooms past `max(FIT_ZOOM_CAP, current zoom)`.
pub const FIT_ZOOM_CAP: f64 = 16.0;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// 2D map view: a Web-Mercator center, a fractional zoom and a pixel size.
///
/// Pixel coordinates grow right and down from the top-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    center: [f64; 2],
    zoom: f64,
    size_px: [f64; 2],
}

impl Viewport {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self {
            center: lonlat_to_mercator(DEFAULT_CENTER),
            zoom: DEFAULT_ZOOM,
            size_px: [width_px.max(1.0), height_px.max(1.0)],
        }
    }

    /// Center in Web-Mercator meters.
    pub fn center(&self) -> [f64; 2] {
        self.center
    }

    pub fn center_lonlat(&self) -> [f64; 2] {
        mercator_to_lonlat(self.center)
    }

    pub fn set_center_lonlat(&mut self, lonlat: [f64; 2]) {
        self.center = lonlat_to_mercator(lonlat);
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn size(&self) -> [f64; 2] {
        self.size_px
    }

    pub fn resize(&mut self, width_px: f64, height_px: f64) {
        self.size_px = [width_px.max(1.0), height_px.max(1.0)];
    }

    /// Meters per pixel.
    pub fn resolution(&self) -> f64 {
        resolution_for_zoom(self.zoom)
    }

    pub fn pixel_to_coordinate(&self, px: [f64; 2]) -> [f64; 2] {
        let res = self.resolution();
        [
            self.center[0] + (px[0] - self.size_px[0] * 0.5) * res,
            self.center[1] - (px[1] - self.size_px[1] * 0.5) * res,
        ]
    }

    pub fn coordinate_to_pixel(&self, coord: [f64; 2]) -> [f64; 2] {
        let res = self.resolution();
        [
            (coord[0] - self.center[0]) / res + self.size_px[0] * 0.5,
            (self.center[1] - coord[1]) / res + self.size_px[1] * 0.5,
        ]
    }

    pub fn pixel_to_lonlat(&self, px: [f64; 2]) -> [f64; 2] {
        mercator_to_lonlat(self.pixel_to_coordinate(px))
    }

    /// Visible area in Web-Mercator meters.
    pub fn extent(&self) -> Extent {
        let a = self.pixel_to_coordinate([0.0, self.size_px[1]]);
        let b = self.pixel_to_coordinate([self.size_px[0], 0.0]);
        Extent::new(a, b)
    }

    /// Centers on `lonlat_extent` and picks the largest zoom, capped at `max_zoom`,
    /// that keeps it inside the view minus `padding_px`.
    pub fn fit(&mut self, lonlat_extent: Extent, padding_px: f64, max_zoom: f64) {
        let min = lonlat_to_mercator(lonlat_extent.min);
        let max = lonlat_to_mercator(lonlat_extent.max);
        let projected = Extent::new(min, max);

        let avail_w = (self.size_px[0] - 2.0 * padding_px).max(1.0);
        let avail_h = (self.size_px[1] - 2.0 * padding_px).max(1.0);
        let res = (projected.width() / avail_w).max(projected.height() / avail_h);

        let zoom = if res > 0.0 {
            zoom_for_resolution(res).min(max_zoom)
        } else {
            max_zoom
        };
        self.center = projected.center();
        self.set_zoom(zoom);
    }

    /// Fit used when focusing an entity: fixed padding, zoom capped at
    /// `max(FIT_ZOOM_CAP, current zoom)`.
    pub fn fit_entity(&mut self, lonlat_extent: Extent) {
        let cap = FIT_ZOOM_CAP.max(self.zoom);
        self.fit(lonlat_extent, FIT_PADDING_PX, cap);
    }
}
