use std::str::FromStr;

use foundation::bounds::Extent;
use serde::{Deserialize, Serialize};

/// `[min_lon, min_lat, max_lon, max_lat]` query scope.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundingBox(pub [f64; 4]);

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self([min_lon, min_lat, max_lon, max_lat])
    }

    /// Box spanned by two opposite corners in any order.
    pub fn from_corners(a: [f64; 2], b: [f64; 2]) -> Self {
        Self::new(a[0].min(b[0]), a[1].min(b[1]), a[0].max(b[0]), a[1].max(b[1]))
    }

    pub fn extent(&self) -> Extent {
        Extent::new([self.0[0], self.0[1]], [self.0[2], self.0[3]])
    }

    /// Repeated `bbox` query pairs, one per coordinate.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        self.0.map(|v| ("bbox", v.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBoundingBoxError(pub String);

impl std::fmt::Display for ParseBoundingBoxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "expected min_lon,min_lat,max_lon,max_lat, got {:?}",
            self.0
        )
    }
}

impl std::error::Error for ParseBoundingBoxError {}

impl FromStr for BoundingBox {
    type Err = ParseBoundingBoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseBoundingBoxError(s.to_string());
        let values = s
            .split(',')
            .map(|p| p.trim().parse::<f64>().map_err(|_| err()))
            .collect::<Result<Vec<_>, _>>()?;
        let [a, b, c, d] = values.as_slice() else {
            return Err(err());
        };
        if !values.iter().all(|v| v.is_finite()) {
            return Err(err());
        }
        Ok(Self::new(*a, *b, *c, *d))
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a},{b},{c},{d}")
    }
}
