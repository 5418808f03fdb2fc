use crate::components::{ComponentSymbol, FeatureGeometry, FeatureProperties, Symbol};
use crate::entity::FeatureId;
use foundation::handles::Handle;

/// Feature storage for one vector layer (struct-of-arrays, one slot per feature).
#[derive(Debug, Default)]
pub struct World {
    generation: u32,
    geometry: Vec<Option<FeatureGeometry>>,
    properties: Vec<Option<FeatureProperties>>,
    symbols: Vec<Option<ComponentSymbol>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> FeatureId {
        let idx = self.geometry.len();
        self.ensure_capacity(idx);
        FeatureId(Handle::new(idx as u32, self.generation))
    }

    /// Spawns a visible feature with all components set.
    pub fn insert(
        &mut self,
        geometry: FeatureGeometry,
        properties: FeatureProperties,
        symbol: Symbol,
    ) -> FeatureId {
        let id = self.spawn();
        self.set_geometry(id, geometry);
        self.set_properties(id, properties);
        self.set_symbol(id, ComponentSymbol::shown(symbol));
        id
    }

    /// Removes every feature. Ids handed out before the call stop resolving.
    pub fn clear(&mut self) {
        self.geometry.clear();
        self.properties.clear();
        self.symbols.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.geometry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
    }

    pub fn contains(&self, feature: FeatureId) -> bool {
        feature.generation() == self.generation && (feature.index() as usize) < self.len()
    }

    /// Live ids in insertion (draw) order.
    pub fn features(&self) -> impl Iterator<Item = FeatureId> + '_ {
        let generation = self.generation;
        (0..self.len()).map(move |i| FeatureId(Handle::new(i as u32, generation)))
    }

    pub fn set_geometry(&mut self, feature: FeatureId, geometry: FeatureGeometry) {
        if let Some(idx) = self.slot(feature) {
            self.geometry[idx] = Some(geometry);
        }
    }

    pub fn set_properties(&mut self, feature: FeatureId, properties: FeatureProperties) {
        if let Some(idx) = self.slot(feature) {
            self.properties[idx] = Some(properties);
        }
    }

    pub fn set_symbol(&mut self, feature: FeatureId, symbol: ComponentSymbol) {
        if let Some(idx) = self.slot(feature) {
            self.symbols[idx] = Some(symbol);
        }
    }

    pub fn geometry(&self, feature: FeatureId) -> Option<&FeatureGeometry> {
        self.slot(feature).and_then(|i| self.geometry[i].as_ref())
    }

    pub fn properties(&self, feature: FeatureId) -> Option<&FeatureProperties> {
        self.slot(feature).and_then(|i| self.properties[i].as_ref())
    }

    pub fn symbol(&self, feature: FeatureId) -> Option<ComponentSymbol> {
        self.slot(feature).and_then(|i| self.symbols[i])
    }

    /// Features without a symbol component count as visible.
    pub fn is_visible(&self, feature: FeatureId) -> bool {
        self.symbol(feature).map(|s| s.visible).unwrap_or(true)
    }

    /// Returns `true` if the feature changed. Already-visible features are left alone.
    pub fn show(&mut self, feature: FeatureId) -> bool {
        self.set_visible(feature, true)
    }

    /// Returns `true` if the feature changed. Already-hidden features are left alone.
    pub fn hide(&mut self, feature: FeatureId) -> bool {
        self.set_visible(feature, false)
    }

    pub fn visible_count(&self) -> usize {
        self.features().filter(|f| self.is_visible(*f)).count()
    }

    fn set_visible(&mut self, feature: FeatureId, visible: bool) -> bool {
        let Some(idx) = self.slot(feature) else {
            return false;
        };
        let Some(symbol) = self.symbols[idx].as_mut() else {
            return false;
        };
        if symbol.visible == visible {
            return false;
        }
        symbol.visible = visible;
        true
    }

    fn slot(&self, feature: FeatureId) -> Option<usize> {
        self.contains(feature).then_some(feature.index() as usize)
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.geometry.len() <= idx {
            let new_len = idx + 1;
            self.geometry.resize(new_len, None);
            self.properties.resize(new_len, None);
            self.symbols.resize(new_len, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use crate::components::{FeatureGeometry, FeatureProperties, Symbol};

    fn stop_feature(world: &mut World) -> crate::entity::FeatureId {
        world.insert(
            FeatureGeometry::Point([37.0, 55.0]),
            FeatureProperties::labeled("stop"),
            Symbol::Stop { synced: true },
        )
    }

    #[test]
    fn spawn_and_iterate_in_order() {
        let mut world = World::new();
        let a = stop_feature(&mut world);
        let b = stop_feature(&mut world);
        assert_eq!(world.features().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(world.properties(a).map(|p| p.hover_label.as_str()), Some("stop"));
    }

    #[test]
    fn show_and_hide_are_idempotent() {
        let mut world = World::new();
        let f = stop_feature(&mut world);

        assert!(!world.show(f));
        assert!(world.hide(f));
        assert!(!world.hide(f));
        assert_eq!(world.symbol(f).map(|s| s.current()), Some(Symbol::Hidden));

        assert!(world.show(f));
        let once = world.symbol(f);
        assert!(!world.show(f));
        assert_eq!(world.symbol(f), once);
        assert_eq!(once.map(|s| s.current()), Some(Symbol::Stop { synced: true }));
    }

    #[test]
    fn clear_invalidates_old_ids() {
        let mut world = World::new();
        let f = stop_feature(&mut world);
        world.clear();
        assert!(world.is_empty());
        assert!(!world.contains(f));
        assert!(world.geometry(f).is_none());

        let g = stop_feature(&mut world);
        assert_eq!(g.index(), f.index());
        assert_ne!(g, f);
        assert!(!world.hide(f));
        assert!(world.is_visible(g));
    }
}
