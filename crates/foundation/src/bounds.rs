/// Axis-aligned 2D extent.
///
/// Convention: `min = [min_x, min_y]`, `max = [max_x, max_y]`. For geographic
/// data x is longitude and y is latitude (degrees).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Extent {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Extent {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Extent { min, max }
    }

    /// Degenerate extent covering a single point.
    pub fn from_point(p: [f64; 2]) -> Self {
        Extent { min: p, max: p }
    }

    /// Smallest extent covering all `points`, or `None` when empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut out = Extent::from_point(first);
        for p in iter {
            out.extend_point(p);
        }
        Some(out)
    }

    pub fn extend_point(&mut self, p: [f64; 2]) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    pub fn union(&self, other: &Extent) -> Extent {
        let mut out = *self;
        out.extend_point(other.min);
        out.extend_point(other.max);
        out
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }

    pub fn contains(&self, p: [f64; 2]) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }

    /// Corners in drawing order, closed (first point repeated at the end).
    pub fn ring(&self) -> Vec<[f64; 2]> {
        vec![
            [self.min[0], self.min[1]],
            [self.max[0], self.min[1]],
            [self.max[0], self.max[1]],
            [self.min[0], self.max[1]],
            [self.min[0], self.min[1]],
        ]
    }
}
