use foundation::bounds::Extent;
use serde::{Deserialize, Serialize};

use crate::source::Source;
use crate::stop::Stop;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    /// Plain path vertex. The backend spells it `geometry`.
    #[serde(rename = "geometry", alias = "vertex")]
    Vertex,
    StopPosition,
    Obstacle,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleType {
    TrafficSignals,
    Crossing,
    Speedbump,
    Roundabout,
}

impl ObstacleType {
    pub fn label(self) -> &'static str {
        match self {
            ObstacleType::TrafficSignals => "traffic signals",
            ObstacleType::Crossing => "pedestrian crossing",
            ObstacleType::Speedbump => "speed bump",
            ObstacleType::Roundabout => "roundabout entry",
        }
    }
}

/// One vertex of a route polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryPoint {
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    pub lon: f64,
    pub lat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstacle_type: Option<ObstacleType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corresponding_stop_id: Option<String>,
}

impl GeometryPoint {
    pub fn vertex(lon: f64, lat: f64) -> Self {
        Self {
            kind: GeometryKind::Vertex,
            lon,
            lat,
            obstacle_type: None,
            corresponding_stop_id: None,
        }
    }

    pub fn stop_position(lon: f64, lat: f64, stop_id: impl Into<String>) -> Self {
        Self {
            kind: GeometryKind::StopPosition,
            corresponding_stop_id: Some(stop_id.into()),
            ..Self::vertex(lon, lat)
        }
    }

    pub fn obstacle(lon: f64, lat: f64, obstacle_type: ObstacleType) -> Self {
        Self {
            kind: GeometryKind::Obstacle,
            obstacle_type: Some(obstacle_type),
            ..Self::vertex(lon, lat)
        }
    }

    pub fn is_stop_position(&self) -> bool {
        self.kind == GeometryKind::StopPosition
    }

    pub fn position(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Stop-to-stop leg of a route with its obstacle counts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteSegment {
    #[serde(default)]
    pub stop_from_id: String,
    #[serde(default)]
    pub stop_to_id: String,
    #[serde(default)]
    pub segment_order: u32,
    /// Meters.
    pub distance: f64,
    pub crossings: u32,
    pub traffic_signals: u32,
    pub speedbumps: u32,
    pub roundabouts: u32,
}

impl RouteSegment {
    pub fn obstacle_count(&self) -> u32 {
        self.crossings + self.traffic_signals + self.speedbumps + self.roundabouts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub name: String,
    pub source: Source,
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub segments: Vec<RouteSegment>,
    #[serde(default)]
    pub geometry: Vec<GeometryPoint>,
    /// Index of the last stop before a round-trip route turns back.
    #[serde(default)]
    pub final_stop_order: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_source_id: Option<String>,
}

impl Route {
    pub fn is_synchronized(&self) -> bool {
        self.source == Source::Local
    }

    /// Local copy after deleting the synced version. Without an
    /// `external_source_id` the id is kept.
    pub fn reverted(&self) -> Route {
        Route {
            id: self
                .external_source_id
                .clone()
                .unwrap_or_else(|| self.id.clone()),
            source: Source::Osm,
            ..self.clone()
        }
    }

    /// Polyline vertices as `[lon, lat]`.
    pub fn path(&self) -> Vec<[f64; 2]> {
        self.geometry.iter().map(GeometryPoint::position).collect()
    }

    pub fn stop_positions(&self) -> impl Iterator<Item = &GeometryPoint> + '_ {
        self.geometry.iter().filter(|p| p.is_stop_position())
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &GeometryPoint> + '_ {
        self.geometry
            .iter()
            .filter(|p| p.kind == GeometryKind::Obstacle)
    }

    /// Extent of the path and the stops, `None` for an empty route.
    pub fn extent(&self) -> Option<Extent> {
        Extent::from_points(
            self.geometry
                .iter()
                .map(GeometryPoint::position)
                .chain(self.stops.iter().map(Stop::position)),
        )
    }

    /// Display number of the stop at `index`.
    ///
    /// Numbering starts at 1 and restarts at 0 after `final_stop_order`.
    pub fn stop_number(&self, index: usize) -> usize {
        match self.final_stop_order {
            Some(fso) if index > fso => index - fso - 1,
            _ => index + 1,
        }
    }

    /// Segment leaving the stop at `index`, following the same round-trip
    /// convention as [`Route::stop_number`]: the boundary stop has none and
    /// stops after it look up `index - 1`.
    pub fn segment_index_for_stop(&self, index: usize) -> Option<usize> {
        if index + 1 >= self.stops.len() {
            return None;
        }
        match self.final_stop_order {
            Some(fso) if index == fso => None,
            Some(fso) if index > fso => Some(index - 1),
            _ => Some(index),
        }
    }

    pub fn segment_for_stop(&self, index: usize) -> Option<&RouteSegment> {
        self.segment_index_for_stop(index)
            .and_then(|i| self.segments.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::{GeometryKind, GeometryPoint, ObstacleType, Route, RouteSegment};
    use crate::source::Source;
    use crate::stop::Stop;
    use pretty_assertions::assert_eq;

    fn stop(i: usize) -> Stop {
        Stop {
            id: format!("s{i}"),
            name: format!("stop {i}"),
            lon: 37.0 + i as f64 * 0.01,
            lat: 55.0,
            source: Source::Local,
            external_source_id: None,
        }
    }

    fn route(stops: usize, final_stop_order: Option<usize>) -> Route {
        Route {
            id: "r1".into(),
            name: "M1".into(),
            source: Source::Local,
            stops: (0..stops).map(stop).collect(),
            segments: (0..stops.saturating_sub(1))
                .map(|i| RouteSegment {
                    segment_order: i as u32,
                    distance: 100.0 * (i + 1) as f64,
                    ..RouteSegment::default()
                })
                .collect(),
            geometry: Vec::new(),
            final_stop_order,
            external_source_id: Some("osm-r1".into()),
        }
    }

    #[test]
    fn accepts_both_vertex_spellings() {
        let a: GeometryPoint =
            serde_json::from_str(r#"{"type":"geometry","lat":55.0,"lon":37.0}"#).expect("decode");
        let b: GeometryPoint =
            serde_json::from_str(r#"{"type":"vertex","lat":55.0,"lon":37.0}"#).expect("decode");
        assert_eq!(a, b);
        assert_eq!(a.kind, GeometryKind::Vertex);
    }

    #[test]
    fn decodes_obstacle_and_stop_position() {
        let points: Vec<GeometryPoint> = serde_json::from_str(
            r#"[
                {"type":"obstacle","lat":55.0,"lon":37.0,"obstacle_type":"speedbump"},
                {"type":"stop_position","lat":55.1,"lon":37.1,"corresponding_stop_id":"s1"}
            ]"#,
        )
        .expect("decode");
        assert_eq!(points[0], GeometryPoint::obstacle(37.0, 55.0, ObstacleType::Speedbump));
        assert_eq!(points[1], GeometryPoint::stop_position(37.1, 55.1, "s1"));
    }

    #[test]
    fn plain_route_numbering() {
        let r = route(4, None);
        let numbers: Vec<usize> = (0..4).map(|i| r.stop_number(i)).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        let segments: Vec<Option<usize>> = (0..4).map(|i| r.segment_index_for_stop(i)).collect();
        assert_eq!(segments, vec![Some(0), Some(1), Some(2), None]);
    }

    #[test]
    fn round_trip_numbering_restarts_after_final_stop() {
        let r = route(6, Some(3));
        let numbers: Vec<usize> = (0..6).map(|i| r.stop_number(i)).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 0, 1]);
        let segments: Vec<Option<usize>> = (0..6).map(|i| r.segment_index_for_stop(i)).collect();
        assert_eq!(segments, vec![Some(0), Some(1), Some(2), None, Some(3), None]);
        assert_eq!(r.segment_for_stop(4).map(|s| s.distance), Some(400.0));
    }

    #[test]
    fn final_stop_order_zero_is_a_boundary() {
        let r = route(3, Some(0));
        let numbers: Vec<usize> = (0..3).map(|i| r.stop_number(i)).collect();
        assert_eq!(numbers, vec![1, 0, 1]);
        assert_eq!(r.segment_index_for_stop(0), None);
    }

    #[test]
    fn revert_uses_external_id() {
        let reverted = route(2, None).reverted();
        assert_eq!(reverted.id, "osm-r1");
        assert_eq!(reverted.source, Source::Osm);
        assert!(!reverted.is_synchronized());
    }

    #[test]
    fn obstacle_count_sums_categories() {
        let seg = RouteSegment {
            crossings: 2,
            traffic_signals: 1,
            speedbumps: 3,
            roundabouts: 1,
            ..RouteSegment::default()
        };
        assert_eq!(seg.obstacle_count(), 7);
    }
}
