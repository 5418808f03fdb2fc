use model::bus_data::StopsAndRoutes;
use model::route::{GeometryPoint, ObstacleType, Route, RouteSegment};
use model::source::Source;
use model::stop::Stop;

pub fn stop(id: &str, source: Source, lon: f64, lat: f64) -> Stop {
    Stop {
        id: id.into(),
        name: format!("stop {id}"),
        lon,
        lat,
        source,
        external_source_id: match source {
            Source::Local => None,
            _ => Some(id.into()),
        },
    }
}

fn segment(distance: f64, crossings: u32) -> RouteSegment {
    RouteSegment {
        distance,
        crossings,
        ..RouteSegment::default()
    }
}

/// One stop-position and one stop: three features when rendered.
pub fn short_route(id: &str, source: Source) -> Route {
    Route {
        id: id.into(),
        name: format!("route {id}"),
        source,
        stops: vec![stop(&format!("{id}-s1"), source, 37.52, 55.52)],
        segments: Vec::new(),
        geometry: vec![
            GeometryPoint::vertex(37.50, 55.50),
            GeometryPoint::stop_position(37.52, 55.52, format!("{id}-s1")),
            GeometryPoint::vertex(37.54, 55.54),
        ],
        final_stop_order: None,
        external_source_id: match source {
            Source::Local => None,
            _ => Some(id.into()),
        },
    }
}

/// Six stops, turning back after index 3. Five segments, one obstacle.
pub fn round_trip_route() -> Route {
    let stops: Vec<Stop> = (0..6)
        .map(|i| stop(&format!("rt-{i}"), Source::Local, 37.5 + 0.01 * i as f64, 55.5))
        .collect();
    let mut geometry = Vec::new();
    for (i, s) in stops.iter().enumerate() {
        geometry.push(GeometryPoint::stop_position(s.lon, s.lat, s.id.clone()));
        if i + 1 < stops.len() {
            geometry.push(GeometryPoint::vertex(s.lon + 0.005, s.lat + 0.001));
        }
        if i == 1 {
            geometry.push(GeometryPoint::obstacle(
                s.lon + 0.007,
                s.lat + 0.001,
                ObstacleType::TrafficSignals,
            ));
        }
    }
    Route {
        id: "rt".into(),
        name: "round trip".into(),
        source: Source::Local,
        stops,
        segments: (0..5).map(|i| segment(100.0 * (i + 1) as f64, i)).collect(),
        geometry,
        final_stop_order: Some(3),
        external_source_id: None,
    }
}

/// Two stops and one route inside `[37.0, 55.0, 38.0, 56.0]`.
pub fn scenario_data() -> StopsAndRoutes {
    StopsAndRoutes {
        stops: vec![
            stop("a", Source::Local, 37.2, 55.2),
            stop("b", Source::Local, 37.8, 55.8),
        ],
        routes: vec![short_route("r1", Source::Local)],
    }
}
