//! Pure derivations behind the info panel: entity lists, detail rows and the
//! traffic listing.

use foundation::text::capitalize;
use layers::symbology::speed_color;
use model::route::{Route, RouteSegment};
use model::source::Source;
use model::stop::Stop;
use serde::Serialize;

pub const SYNCHRONIZED: &str = "synchronized";
pub const NOT_SYNCHRONIZED: &str = "not synchronized";

pub fn sync_label(synchronized: bool) -> &'static str {
    if synchronized {
        SYNCHRONIZED
    } else {
        NOT_SYNCHRONIZED
    }
}

/// One row of the stop or route list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub number: usize,
    pub id: String,
    pub name: String,
    pub synchronized: bool,
}

fn list<'a>(
    entries: impl Iterator<Item = (&'a str, &'a str, bool)>,
    query: &str,
) -> Vec<ListItem> {
    let query = query.to_lowercase();
    let mut matching: Vec<_> = entries
        .filter(|(_, name, _)| name.to_lowercase().contains(&query))
        .collect();
    matching.sort_by(|a, b| a.1.cmp(b.1));
    matching
        .into_iter()
        .enumerate()
        .map(|(i, (id, name, synchronized))| ListItem {
            number: i + 1,
            id: id.to_string(),
            name: capitalize(name),
            synchronized,
        })
        .collect()
}

/// Stops whose name contains `query` (case-insensitive), sorted by name.
pub fn stop_list(stops: &[Stop], query: &str) -> Vec<ListItem> {
    list(
        stops
            .iter()
            .map(|s| (s.id.as_str(), s.name.as_str(), s.is_synchronized())),
        query,
    )
}

pub fn route_list(routes: &[Route], query: &str) -> Vec<ListItem> {
    list(
        routes
            .iter()
            .map(|r| (r.id.as_str(), r.name.as_str(), r.is_synchronized())),
        query,
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopDetails {
    pub id: String,
    pub name: String,
    pub source: Source,
    pub coordinates: [f64; 2],
    pub status: &'static str,
}

pub fn stop_details(stop: &Stop) -> StopDetails {
    StopDetails {
        id: stop.id.clone(),
        name: stop.name.clone(),
        source: stop.source,
        coordinates: stop.position(),
        status: sync_label(stop.is_synchronized()),
    }
}

/// A stop in the route view, with the leg that leaves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStopRow {
    pub number: usize,
    pub name: String,
    /// Meters, formatted with two decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
}

/// Stop listing of a route. Numbering restarts after a round-trip boundary,
/// and the boundary and last stops have no outgoing leg.
pub fn route_stop_rows(route: &Route) -> Vec<RouteStopRow> {
    route
        .stops
        .iter()
        .enumerate()
        .map(|(i, stop)| RouteStopRow {
            number: route.stop_number(i),
            name: capitalize(&stop.name),
            distance: route
                .segment_for_stop(i)
                .map(|segment| format!("{:.2}", segment.distance)),
        })
        .collect()
}

/// A stop in the traffic view, with the speed of the leg that leaves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficStopRow {
    pub number: usize,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Hex color of the leg; grey without data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// `"{speed:.2} km/h"`, followed by the leg's obstacle count when it has any.
pub fn speed_label(speed: f64, segment: Option<&RouteSegment>) -> String {
    let base = format!("{speed:.2} km/h");
    match segment.map(RouteSegment::obstacle_count) {
        None | Some(0) => base,
        Some(1) => format!("{base} + 1 obstacle"),
        Some(n) => format!("{base} + {n} obstacles"),
    }
}

/// Traffic listing of a route under `flow` (speeds per leg, if any).
pub fn traffic_stop_rows(route: &Route, flow: Option<&[f64]>) -> Vec<TrafficStopRow> {
    route
        .stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            let leg = route.segment_index_for_stop(i);
            let speed = leg.and_then(|l| flow.and_then(|f| f.get(l)).copied());
            TrafficStopRow {
                number: route.stop_number(i),
                name: capitalize(&stop.name),
                label: speed.map(|s| speed_label(s, route.segment_for_stop(i))),
                color: leg.map(|_| speed_color(speed).to_hex()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{round_trip_route, short_route, stop};
    use pretty_assertions::assert_eq;

    #[test]
    fn list_filters_sorts_and_numbers() {
        let mut stops = vec![
            stop("1", Source::Local, 37.0, 55.0),
            stop("2", Source::Osm, 37.0, 55.0),
            stop("3", Source::Osm, 37.0, 55.0),
        ];
        stops[0].name = "tverskaya".into();
        stops[1].name = "arbat".into();
        stops[2].name = "Petrovka".into();

        let items = stop_list(&stops, "");
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Petrovka", "Arbat", "Tverskaya"]);
        assert_eq!(items[2].number, 3);

        let items = stop_list(&stops, "AR");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "2");
        assert_eq!(items[0].number, 1);
        assert!(!items[0].synchronized);
    }

    #[test]
    fn sync_label_follows_source() {
        let local = stop("a", Source::Local, 37.0, 55.0);
        let osm = stop("b", Source::Osm, 37.0, 55.0);
        assert_eq!(stop_details(&local).status, "synchronized");
        assert_eq!(stop_details(&osm).status, "not synchronized");
        assert!(!route_list(&[short_route("r", Source::Tomtom)], "")[0].synchronized);
    }

    #[test]
    fn round_trip_numbering_restarts_after_boundary() {
        let route = round_trip_route();
        let rows = route_stop_rows(&route);
        let numbers: Vec<usize> = rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 0, 1]);

        let distances: Vec<Option<&str>> = rows.iter().map(|r| r.distance.as_deref()).collect();
        assert_eq!(
            distances,
            vec![
                Some("100.00"),
                Some("200.00"),
                Some("300.00"),
                None,
                Some("400.00"),
                None
            ]
        );
    }

    #[test]
    fn traffic_rows_use_the_same_leg_lookup() {
        let route = round_trip_route();
        let flow = [12.0, 30.0, 60.0, 0.0, 45.5];
        let rows = traffic_stop_rows(&route, Some(&flow[..]));

        assert_eq!(rows[0].label.as_deref(), Some("12.00 km/h"));
        assert_eq!(rows[1].label.as_deref(), Some("30.00 km/h + 1 obstacle"));
        assert_eq!(rows[2].label.as_deref(), Some("60.00 km/h + 2 obstacles"));
        assert_eq!(rows[3].label, None);
        assert_eq!(rows[4].label.as_deref(), Some("0.00 km/h + 3 obstacles"));
        assert_eq!(rows[5].label, None);

        assert_eq!(rows[2].color.as_deref(), Some("#00aa00"));
        assert_eq!(rows[4].color.as_deref(), Some("#767676"));
        assert_eq!(rows[3].color, None);
    }

    #[test]
    fn traffic_rows_without_flow_are_grey() {
        let route = round_trip_route();
        let rows = traffic_stop_rows(&route, None);
        assert!(rows.iter().all(|r| r.label.is_none()));
        assert_eq!(rows[0].color.as_deref(), Some("#767676"));
    }
}
