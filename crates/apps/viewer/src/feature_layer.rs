use std::collections::HashMap;

use layers::vector::VectorLayer;
use model::entity::{EntityKey, MapEntity};
use scene::components::{FeatureGeometry, FeatureProperties, Symbol};
use scene::entity::FeatureId;

/// A vector layer plus the typed feature → entity association table.
///
/// Several features may point at one entity (a route line and its markers).
#[derive(Debug)]
pub struct FeatureLayer {
    pub layer: VectorLayer,
    associations: HashMap<FeatureId, EntityKey>,
    entities: HashMap<EntityKey, MapEntity>,
}

impl FeatureLayer {
    pub fn new(id: u64, name: &'static str) -> Self {
        Self {
            layer: VectorLayer::new(id, name),
            associations: HashMap::new(),
            entities: HashMap::new(),
        }
    }

    /// Records `entity` and returns the key its features are tagged with.
    pub fn register(&mut self, entity: MapEntity) -> EntityKey {
        let key = entity.key();
        self.entities.insert(key.clone(), entity);
        key
    }

    /// Adds a visible feature associated with `key`.
    pub fn add(
        &mut self,
        key: &EntityKey,
        geometry: FeatureGeometry,
        properties: FeatureProperties,
        symbol: Symbol,
    ) -> FeatureId {
        let id = self.layer.world.insert(geometry, properties, symbol);
        self.associations.insert(id, key.clone());
        id
    }

    pub fn clear(&mut self) {
        self.layer.clear();
        self.associations.clear();
        self.entities.clear();
    }

    pub fn len(&self) -> usize {
        self.layer.world.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layer.world.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.layer.world.visible_count()
    }

    pub fn entity_key(&self, feature: FeatureId) -> Option<&EntityKey> {
        self.associations.get(&feature)
    }

    pub fn entity(&self, feature: FeatureId) -> Option<&MapEntity> {
        self.entity_key(feature).and_then(|k| self.entities.get(k))
    }

    /// Features associated with `key`, in draw order.
    pub fn features_of(&self, key: &EntityKey) -> Vec<FeatureId> {
        self.layer
            .world
            .features()
            .filter(|f| self.associations.get(f) == Some(key))
            .collect()
    }

    pub fn show(&mut self, feature: FeatureId) -> bool {
        self.layer.world.show(feature)
    }

    pub fn hide(&mut self, feature: FeatureId) -> bool {
        self.layer.world.hide(feature)
    }

    pub fn show_all(&mut self) -> usize {
        self.layer.show_all()
    }

    pub fn hide_all(&mut self) -> usize {
        self.layer.hide_all()
    }

    /// Hides everything, then shows every feature of `key`. Returns how many are shown.
    pub fn highlight(&mut self, key: &EntityKey) -> usize {
        self.hide_all();
        let features = self.features_of(key);
        for f in &features {
            self.show(*f);
        }
        features.len()
    }
}

#[cfg(test)]
mod tests {
    use super::FeatureLayer;
    use model::entity::{EntityKey, MapEntity};
    use model::source::Source;
    use model::stop::Stop;
    use scene::components::{FeatureGeometry, FeatureProperties, Symbol};

    fn stop(id: &str) -> MapEntity {
        MapEntity::Stop(Stop {
            id: id.into(),
            name: id.into(),
            lon: 37.0,
            lat: 55.0,
            source: Source::Local,
            external_source_id: None,
        })
    }

    fn point(layer: &mut FeatureLayer, key: &EntityKey) {
        layer.add(
            key,
            FeatureGeometry::Point([37.0, 55.0]),
            FeatureProperties::labeled(key.id.clone()),
            Symbol::Stop { synced: true },
        );
    }

    #[test]
    fn highlight_shows_every_feature_of_the_entity() {
        let mut layer = FeatureLayer::new(1, "test");
        let a = layer.register(stop("a"));
        let b = layer.register(stop("b"));
        point(&mut layer, &a);
        point(&mut layer, &b);
        point(&mut layer, &a);

        assert_eq!(layer.highlight(&a), 2);
        assert_eq!(layer.visible_count(), 2);
        let shown: Vec<bool> = layer
            .layer
            .world
            .features()
            .map(|f| layer.layer.world.is_visible(f))
            .collect();
        assert_eq!(shown, vec![true, false, true]);
    }

    #[test]
    fn clear_forgets_associations() {
        let mut layer = FeatureLayer::new(1, "test");
        let a = layer.register(stop("a"));
        point(&mut layer, &a);
        let first = layer.layer.world.features().next().unwrap();
        assert_eq!(layer.entity(first).map(|e| e.id()), Some("a"));

        layer.clear();
        assert!(layer.is_empty());
        assert!(layer.entity(first).is_none());
        assert!(layer.features_of(&a).is_empty());
    }
}
