use foundation::bounds::Extent;

/// Feature geometry in `[lon, lat]` degrees.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point([f64; 2]),
    Line(Vec<[f64; 2]>),
    /// Closed outer ring.
    Polygon(Vec<[f64; 2]>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

impl FeatureGeometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            FeatureGeometry::Point(_) => GeometryKind::Point,
            FeatureGeometry::Line(_) => GeometryKind::Line,
            FeatureGeometry::Polygon(_) => GeometryKind::Polygon,
        }
    }

    pub fn vertices(&self) -> &[[f64; 2]] {
        match self {
            FeatureGeometry::Point(p) => std::slice::from_ref(p),
            FeatureGeometry::Line(v) | FeatureGeometry::Polygon(v) => v,
        }
    }

    pub fn extent(&self) -> Option<Extent> {
        Extent::from_points(self.vertices().iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureGeometry, GeometryKind};

    #[test]
    fn point_extent_is_degenerate() {
        let g = FeatureGeometry::Point([37.0, 55.0]);
        assert_eq!(g.kind(), GeometryKind::Point);
        let e = g.extent().expect("extent");
        assert_eq!(e.min, e.max);
    }

    #[test]
    fn empty_line_has_no_extent() {
        assert!(FeatureGeometry::Line(Vec::new()).extent().is_none());
    }
}
