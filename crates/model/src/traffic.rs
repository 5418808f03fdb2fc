use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::route::Route;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    #[default]
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == lower)
            .ok_or_else(|| format!("unknown weekday: {s}"))
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speed per stop-to-stop interval (km/h), keyed by route id.
pub type FlowByRoute = BTreeMap<String, Vec<f64>>;

/// Traffic-mode cache.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrafficFlowData {
    pub routes: Vec<Route>,
    pub flow: FlowByRoute,
    pub weekday: Weekday,
    pub hour_interval: u8,
}

/// Uploaded raw speed measurements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedData {
    pub id: String,
    pub name: String,
}

/// List entry of `GET /traffic_flow/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedProfileSummary {
    pub id: String,
    pub name: String,
}

/// `route id -> weekday -> hour (0-23) -> speeds per interval`.
pub type SpeedProfileRoutes = BTreeMap<String, BTreeMap<Weekday, BTreeMap<u8, Vec<f64>>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    pub id: String,
    pub name: String,
    pub speed_data_id: String,
    #[serde(default)]
    pub routes: SpeedProfileRoutes,
}

impl SpeedProfile {
    pub fn summary(&self) -> SpeedProfileSummary {
        SpeedProfileSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    pub fn route_ids(&self) -> Vec<String> {
        self.routes.keys().cloned().collect()
    }

    /// Flow for one time bucket. Routes without data for the bucket are left out.
    pub fn flow_at(&self, weekday: Weekday, hour: u8) -> FlowByRoute {
        self.routes
            .iter()
            .filter_map(|(route_id, days)| {
                let speeds = days.get(&weekday)?.get(&hour)?;
                Some((route_id.clone(), speeds.clone()))
            })
            .collect()
    }
}

/// Body of `POST /traffic_flow`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSpeedProfileRequest {
    pub name: String,
    pub routes_ids: Vec<String>,
    pub speed_data_id: String,
}

/// `HH:00-HH:00`, wrapping at midnight.
pub fn format_hour_interval(hour: u8) -> String {
    let start = hour % 24;
    let end = (start + 1) % 24;
    format!("{start:02}:00-{end:02}:00")
}

#[cfg(test)]
mod tests {
    use super::{SpeedProfile, Weekday, format_hour_interval};
    use pretty_assertions::assert_eq;

    #[test]
    fn hour_interval_wraps() {
        assert_eq!(format_hour_interval(0), "00:00-01:00");
        assert_eq!(format_hour_interval(9), "09:00-10:00");
        assert_eq!(format_hour_interval(23), "23:00-00:00");
    }

    #[test]
    fn weekday_parses_case_insensitively() {
        assert_eq!("Friday".parse::<Weekday>(), Ok(Weekday::Friday));
        assert!("funday".parse::<Weekday>().is_err());
    }

    #[test]
    fn decodes_profile_and_extracts_bucket() {
        let profile: SpeedProfile = serde_json::from_str(
            r#"{
                "id": "42",
                "name": "weekday peak",
                "speed_data_id": "sd1",
                "routes": {
                    "r1": {"monday": {"0": [30.0, 45.0], "8": [12.5, 20.0]}},
                    "r2": {"tuesday": {"8": [50.0]}}
                }
            }"#,
        )
        .expect("decode");

        let flow = profile.flow_at(Weekday::Monday, 8);
        assert_eq!(flow.len(), 1);
        assert_eq!(flow["r1"], vec![12.5, 20.0]);
        assert_eq!(profile.route_ids(), vec!["r1".to_string(), "r2".to_string()]);
        assert!(profile.flow_at(Weekday::Sunday, 8).is_empty());
    }
}
