//! Spherical Web Mercator (EPSG:3857), the projection of the base tile layer.

/// WGS84 semi-major axis (meters), used as the sphere radius.
pub const WGS84_A: f64 = 6_378_137.0;

/// Tile edge length in pixels for the standard XYZ pyramid.
pub const TILE_SIZE_PX: f64 = 256.0;

/// Latitude limit of the square Mercator world.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_6;

/// Meters per pixel at zoom 0.
pub fn base_resolution() -> f64 {
    2.0 * std::f64::consts::PI * WGS84_A / TILE_SIZE_PX
}

/// Projects `[lon, lat]` in degrees to Web Mercator meters.
pub fn lonlat_to_mercator(p: [f64; 2]) -> [f64; 2] {
    let lat = p[1].clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = WGS84_A * p[0].to_radians();
    let y = WGS84_A * (std::f64::consts::FRAC_PI_4 + lat.to_radians() * 0.5).tan().ln();
    [x, y]
}

/// Inverse of [`lonlat_to_mercator`].
pub fn mercator_to_lonlat(p: [f64; 2]) -> [f64; 2] {
    let lon = (p[0] / WGS84_A).to_degrees();
    let lat = (2.0 * (p[1] / WGS84_A).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    [lon, lat]
}

/// Meters per pixel at a (fractional) zoom level.
pub fn resolution_for_zoom(zoom: f64) -> f64 {
    base_resolution() / 2f64.powf(zoom)
}

/// Zoom level whose resolution equals `resolution` meters per pixel.
pub fn zoom_for_resolution(resolution: f64) -> f64 {
    (base_resolution() / resolution).log2()
}

#[cfg(test)]
mod tests {
    use super::{
        WGS84_A, lonlat_to_mercator, mercator_to_lonlat, resolution_for_zoom, zoom_for_resolution,
    };

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn origin_maps_to_origin() {
        let m = lonlat_to_mercator([0.0, 0.0]);
        assert_close(m[0], 0.0, 1e-9);
        assert_close(m[1], 0.0, 1e-9);
    }

    #[test]
    fn antimeridian_is_half_circumference() {
        let m = lonlat_to_mercator([180.0, 0.0]);
        assert_close(m[0], std::f64::consts::PI * WGS84_A, 1e-6);
    }

    #[test]
    fn round_trip_moscow() {
        let p = [37.566_193_7, 55.746_503_5];
        let rt = mercator_to_lonlat(lonlat_to_mercator(p));
        assert_close(rt[0], p[0], 1e-9);
        assert_close(rt[1], p[1], 1e-9);
    }

    #[test]
    fn zoom_resolution_inverse() {
        assert_close(resolution_for_zoom(0.0), 156_543.033_928_040_97, 1e-6);
        assert_close(zoom_for_resolution(resolution_for_zoom(13.5)), 13.5, 1e-9);
    }
}
