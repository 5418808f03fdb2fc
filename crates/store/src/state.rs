use model::source::Source;

/// Which data domain the map shows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    StopsAndRoutes,
    TrafficFlow,
    StopsClustering,
}

impl Mode {
    /// Source selected together with the mode in the toolbar.
    pub fn default_source(self) -> Source {
        match self {
            Mode::StopsAndRoutes => Source::Local,
            Mode::TrafficFlow => Source::Tomtom,
            Mode::StopsClustering => Source::DataMos,
        }
    }
}

/// Which entity kinds the stops/routes layer renders.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum DisplayInfo {
    #[default]
    Stops,
    Routes,
    All,
}

impl DisplayInfo {
    pub fn shows_stops(self) -> bool {
        matches!(self, DisplayInfo::Stops | DisplayInfo::All)
    }

    pub fn shows_routes(self) -> bool {
        matches!(self, DisplayInfo::Routes | DisplayInfo::All)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    Loading,
    Result,
    Error,
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FetchStatus::Loading => "Loading",
            FetchStatus::Result => "Result",
            FetchStatus::Error => "Error",
        })
    }
}

/// Status banner contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchInfo {
    pub status: FetchStatus,
    pub message: String,
}
