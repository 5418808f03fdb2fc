use std::env;

use api::client::DEFAULT_BASE_URL;
use clap::{Parser, Subcommand};
use model::bbox::BoundingBox;
use model::source::Source;
use model::traffic::Weekday;
use store::state::DisplayInfo;

pub const API_BASE_URL_VAR: &str = "API_BASE_URL";
pub const WIDTH_VAR: &str = "VIEWER_WIDTH";
pub const HEIGHT_VAR: &str = "VIEWER_HEIGHT";

pub const DEFAULT_WIDTH_PX: f64 = 1280.0;
pub const DEFAULT_HEIGHT_PX: f64 = 720.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidSize { var: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidSize { var, value } => {
                write!(f, "{var} must be a positive number of pixels, got {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub api_base_url: String,
    pub width_px: f64,
    pub height_px: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            width_px: DEFAULT_WIDTH_PX,
            height_px: DEFAULT_HEIGHT_PX,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds the config from any variable lookup; unset variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(API_BASE_URL_VAR).filter(|u| !u.trim().is_empty()) {
            config.api_base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(WIDTH_VAR) {
            config.width_px = parse_size(WIDTH_VAR, &raw)?;
        }
        if let Some(raw) = lookup(HEIGHT_VAR) {
            config.height_px = parse_size(HEIGHT_VAR, &raw)?;
        }
        Ok(config)
    }

    /// Command-line flags win over the environment.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(url) = &cli.api_url {
            self.api_base_url = url.clone();
        }
        self
    }
}

fn parse_size(var: &'static str, raw: &str) -> Result<f64, ConfigError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(ConfigError::InvalidSize {
            var,
            value: raw.to_string(),
        }),
    }
}

fn parse_source(raw: &str) -> Result<Source, String> {
    Source::from_api_code(&raw.to_ascii_lowercase()).ok_or_else(|| {
        let known: Vec<&str> = Source::ALL.iter().map(|s| s.api_code()).collect();
        format!("unknown source {raw:?}, expected one of {}", known.join(", "))
    })
}

fn parse_display(raw: &str) -> Result<DisplayInfo, String> {
    match raw.to_ascii_lowercase().as_str() {
        "stops" => Ok(DisplayInfo::Stops),
        "routes" => Ok(DisplayInfo::Routes),
        "all" => Ok(DisplayInfo::All),
        _ => Err(format!("unknown display filter {raw:?}, expected stops, routes or all")),
    }
}

fn parse_hour(raw: &str) -> Result<u8, String> {
    match raw.parse::<u8>() {
        Ok(h) if h < 24 => Ok(h),
        _ => Err(format!("hour must be 0-23, got {raw:?}")),
    }
}

/// Headless transit-data viewer: fetches a working area, renders it into the
/// map layers and prints the active layer as JSON.
#[derive(Debug, Parser)]
#[command(name = "viewer", version)]
pub struct Cli {
    /// Backend base URL, overrides API_BASE_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stops and routes of one source inside the working area.
    BusData {
        /// min_lon,min_lat,max_lon,max_lat
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,
        #[arg(long, default_value = "local", value_parser = parse_source)]
        source: Source,
        #[arg(long, default_value = "all", value_parser = parse_display)]
        display: DisplayInfo,
    },
    /// Traffic flow of a speed profile for one weekday and hour.
    Traffic {
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,
        #[arg(long)]
        profile: String,
        #[arg(long, default_value = "monday")]
        weekday: Weekday,
        #[arg(long, default_value = "0", value_parser = parse_hour)]
        hour: u8,
    },
    /// Local stops in the working area clustered with a clustering profile.
    Clustering {
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,
        #[arg(long)]
        profile: String,
    },
    /// Lists speed and clustering profiles.
    Profiles,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| vars.get(k).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ViewerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ViewerConfig::from_lookup(lookup(&[
            (API_BASE_URL_VAR, "http://backend:9000/api"),
            (WIDTH_VAR, "800"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "http://backend:9000/api");
        assert_eq!(config.width_px, 800.0);
        assert_eq!(config.height_px, DEFAULT_HEIGHT_PX);
    }

    #[test]
    fn rejects_bad_sizes() {
        let err = ViewerConfig::from_lookup(lookup(&[(HEIGHT_VAR, "-5")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSize { var: HEIGHT_VAR, .. }));
    }

    #[test]
    fn cli_flag_wins() {
        let cli = Cli::try_parse_from([
            "viewer",
            "bus-data",
            "--bbox",
            "37,55,38,56",
            "--api-url",
            "http://cli:1",
        ])
        .unwrap();
        let config = ViewerConfig::default().with_cli(&cli);
        assert_eq!(config.api_base_url, "http://cli:1");
        match cli.command {
            Command::BusData {
                bbox,
                source,
                display,
            } => {
                assert_eq!(bbox, BoundingBox::new(37.0, 55.0, 38.0, 56.0));
                assert_eq!(source, Source::Local);
                assert_eq!(display, DisplayInfo::All);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn traffic_arguments() {
        let cli = Cli::try_parse_from([
            "viewer",
            "traffic",
            "--bbox",
            "37,55,38,56",
            "--profile",
            "42",
            "--weekday",
            "Friday",
            "--hour",
            "8",
        ])
        .unwrap();
        let Command::Traffic {
            profile,
            weekday,
            hour,
            ..
        } = cli.command
        else {
            panic!("expected traffic command");
        };
        assert_eq!(profile, "42");
        assert_eq!(weekday, Weekday::Friday);
        assert_eq!(hour, 8);

        assert!(
            Cli::try_parse_from(["viewer", "traffic", "--bbox", "37,55,38,56", "--profile", "1", "--hour", "24"])
                .is_err()
        );
    }
}
