use serde::{Deserialize, Serialize};

use crate::source::Source;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_source_id: Option<String>,
}

impl Stop {
    /// A stop is synchronized iff its source is `local`.
    pub fn is_synchronized(&self) -> bool {
        self.source == Source::Local
    }

    /// `[lon, lat]`.
    pub fn position(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Local copy after a successful sync: server-assigned id and source, everything
    /// else kept.
    pub fn synced_with(&self, server: &Stop) -> Stop {
        Stop {
            id: server.id.clone(),
            source: server.source,
            ..self.clone()
        }
    }

    /// Local copy after deleting the synced version: back to the external record.
    ///
    /// Without an `external_source_id` the id is kept.
    pub fn reverted(&self) -> Stop {
        Stop {
            id: self
                .external_source_id
                .clone()
                .unwrap_or_else(|| self.id.clone()),
            source: Source::Osm,
            ..self.clone()
        }
    }
}
