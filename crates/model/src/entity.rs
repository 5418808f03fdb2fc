use foundation::bounds::Extent;

use crate::clustering::ClusteredStop;
use crate::route::Route;
use crate::stop::Stop;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Stop,
    Route,
}

/// Identity of a logical map entity. Several map features may share one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityKey {
    pub fn stop(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Stop,
            id: id.into(),
        }
    }

    pub fn route(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Route,
            id: id.into(),
        }
    }
}

/// Anything the user can select, highlight or focus on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEntity {
    Stop(Stop),
    Route(Route),
    ClusteredStop(ClusteredStop),
}

impl MapEntity {
    pub fn id(&self) -> &str {
        match self {
            MapEntity::Stop(s) => &s.id,
            MapEntity::Route(r) => &r.id,
            MapEntity::ClusteredStop(c) => &c.stop.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MapEntity::Stop(s) => &s.name,
            MapEntity::Route(r) => &r.name,
            MapEntity::ClusteredStop(c) => &c.stop.name,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            MapEntity::Route(_) => EntityKind::Route,
            MapEntity::Stop(_) | MapEntity::ClusteredStop(_) => EntityKind::Stop,
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey {
            kind: self.kind(),
            id: self.id().to_string(),
        }
    }

    pub fn is_synchronized(&self) -> bool {
        match self {
            MapEntity::Stop(s) => s.is_synchronized(),
            MapEntity::Route(r) => r.is_synchronized(),
            MapEntity::ClusteredStop(c) => c.stop.is_synchronized(),
        }
    }

    /// Extent used when fitting the view to this entity.
    pub fn extent(&self) -> Option<Extent> {
        match self {
            MapEntity::Stop(s) => Some(Extent::from_point(s.position())),
            MapEntity::ClusteredStop(c) => Some(Extent::from_point(c.stop.position())),
            MapEntity::Route(r) => r.extent(),
        }
    }
}

impl From<Stop> for MapEntity {
    fn from(stop: Stop) -> Self {
        MapEntity::Stop(stop)
    }
}

impl From<Route> for MapEntity {
    fn from(route: Route) -> Self {
        MapEntity::Route(route)
    }
}

impl From<ClusteredStop> for MapEntity {
    fn from(stop: ClusteredStop) -> Self {
        MapEntity::ClusteredStop(stop)
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityKey, EntityKind, MapEntity};
    use crate::clustering::ClusteredStop;
    use crate::source::Source;
    use crate::stop::Stop;

    #[test]
    fn clustered_stop_shares_stop_identity() {
        let stop = Stop {
            id: "s1".into(),
            name: "A".into(),
            lon: 37.0,
            lat: 55.0,
            source: Source::Local,
            external_source_id: None,
        };
        let plain = MapEntity::from(stop.clone());
        let clustered = MapEntity::from(ClusteredStop {
            stop,
            cluster_index: 2,
        });
        assert_eq!(plain.key(), clustered.key());
        assert_eq!(plain.key(), EntityKey::stop("s1"));
        assert_eq!(clustered.kind(), EntityKind::Stop);
        let extent = plain.extent().expect("extent");
        assert_eq!(extent.min, extent.max);
    }
}
