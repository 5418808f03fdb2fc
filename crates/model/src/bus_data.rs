use serde::{Deserialize, Serialize};

use crate::route::Route;
use crate::stop::Stop;

/// Response of `GET /bus_data/` and the stops/routes cache.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StopsAndRoutes {
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl StopsAndRoutes {
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty() && self.routes.is_empty()
    }

    pub fn stop(&self, id: &str) -> Option<&Stop> {
        self.stops.iter().find(|s| s.id == id)
    }

    pub fn route(&self, id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == id)
    }

    /// Copy with the stop `id` replaced by `stop`.
    pub fn with_stop_replaced(&self, id: &str, stop: Stop) -> StopsAndRoutes {
        StopsAndRoutes {
            stops: self
                .stops
                .iter()
                .map(|s| if s.id == id { stop.clone() } else { s.clone() })
                .collect(),
            routes: self.routes.clone(),
        }
    }

    pub fn with_route_replaced(&self, id: &str, route: Route) -> StopsAndRoutes {
        StopsAndRoutes {
            stops: self.stops.clone(),
            routes: self
                .routes
                .iter()
                .map(|r| if r.id == id { route.clone() } else { r.clone() })
                .collect(),
        }
    }
}
