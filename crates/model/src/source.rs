use serde::{Deserialize, Serialize};

/// Provenance of a stop or route. `Local` is the authoritative, edited copy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    #[default]
    Local,
    Osm,
    Tomtom,
    Here,
    DataMos,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Local,
        Source::Osm,
        Source::Tomtom,
        Source::Here,
        Source::DataMos,
    ];

    /// Value used in the `source` query parameter.
    pub fn api_code(self) -> &'static str {
        match self {
            Source::Local => "local",
            Source::Osm => "osm",
            Source::Tomtom => "tomtom",
            Source::Here => "here",
            Source::DataMos => "data_mos",
        }
    }

    pub fn from_api_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.api_code() == code)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.api_code())
    }
}

#[cfg(test)]
mod tests {
    use super::Source;

    #[test]
    fn api_codes_round_trip() {
        for source in Source::ALL {
            assert_eq!(Source::from_api_code(source.api_code()), Some(source));
        }
        assert_eq!(Source::from_api_code("gtfs"), None);
    }

    #[test]
    fn serializes_as_api_code() {
        let json = serde_json::to_string(&Source::DataMos).expect("serialize");
        assert_eq!(json, "\"data_mos\"");
    }
}
