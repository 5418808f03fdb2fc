use foundation::math::lonlat_to_mercator;

use crate::World;
use crate::components::FeatureGeometry;
use crate::entity::FeatureId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    /// Hit radius in Web-Mercator meters.
    pub tolerance: f64,
    /// Skip features whose visibility flag is off.
    pub visible_only: bool,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            visible_only: false,
        }
    }
}

/// All features under `point` (Web-Mercator meters), topmost first.
///
/// Ordering contract:
/// - Features are drawn in insertion order, so a higher `FeatureId::index()` is on top.
/// - Hits are returned in descending index order.
pub fn pick_all(world: &World, point: [f64; 2], opts: PickOptions) -> Vec<FeatureId> {
    let tol2 = opts.tolerance * opts.tolerance;
    let mut hits: Vec<FeatureId> = world
        .features()
        .filter(|f| !opts.visible_only || world.is_visible(*f))
        .filter(|f| {
            world
                .geometry(*f)
                .is_some_and(|g| hits_geometry(g, point, tol2))
        })
        .collect();
    hits.reverse();
    hits
}

/// Topmost feature under `point`, see [`pick_all`].
pub fn pick(world: &World, point: [f64; 2], opts: PickOptions) -> Option<FeatureId> {
    pick_all(world, point, opts).into_iter().next()
}

fn hits_geometry(geometry: &FeatureGeometry, point: [f64; 2], tol2: f64) -> bool {
    match geometry {
        FeatureGeometry::Point(p) => dist2(lonlat_to_mercator(*p), point) <= tol2,
        FeatureGeometry::Line(vertices) => near_polyline(vertices, point, tol2),
        FeatureGeometry::Polygon(ring) => {
            near_polyline(ring, point, tol2) || inside_ring(ring, point)
        }
    }
}

fn near_polyline(vertices: &[[f64; 2]], point: [f64; 2], tol2: f64) -> bool {
    let projected: Vec<[f64; 2]> = vertices.iter().map(|v| lonlat_to_mercator(*v)).collect();
    match projected.as_slice() {
        [] => false,
        [only] => dist2(*only, point) <= tol2,
        _ => projected
            .windows(2)
            .any(|w| segment_dist2(w[0], w[1], point) <= tol2),
    }
}

fn inside_ring(ring: &[[f64; 2]], point: [f64; 2]) -> bool {
    let projected: Vec<[f64; 2]> = ring.iter().map(|v| lonlat_to_mercator(*v)).collect();
    if projected.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = projected.len() - 1;
    for i in 0..projected.len() {
        let (a, b) = (projected[i], projected[j]);
        if (a[1] > point[1]) != (b[1] > point[1])
            && point[0] < (b[0] - a[0]) * (point[1] - a[1]) / (b[1] - a[1]) + a[0]
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn dist2(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

fn segment_dist2(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let len2 = ab[0] * ab[0] + ab[1] * ab[1];
    if len2 <= 0.0 {
        return dist2(a, p);
    }
    let t = (((p[0] - a[0]) * ab[0] + (p[1] - a[1]) * ab[1]) / len2).clamp(0.0, 1.0);
    dist2([a[0] + ab[0] * t, a[1] + ab[1] * t], p)
}
