use scene::World;
use scene::components::FeatureGeometry;
use scene::entity::FeatureId;

use crate::layer::{Layer, LayerId};
use crate::symbology::{Style, style_for};

/// A toggleable layer of map features.
#[derive(Debug)]
pub struct VectorLayer {
    id: LayerId,
    pub name: &'static str,
    visible: bool,
    pub world: World,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledFeature {
    pub id: FeatureId,
    pub geometry: FeatureGeometry,
    pub style: Style,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct VectorLayerSnapshot {
    /// Drawable features in draw order. Hidden features are left out.
    pub features: Vec<StyledFeature>,
}

impl VectorLayer {
    pub fn new(id: u64, name: &'static str) -> Self {
        Self {
            id: LayerId(id),
            name,
            visible: true,
            world: World::new(),
        }
    }

    pub fn clear(&mut self) {
        self.world.clear();
    }

    pub fn show_all(&mut self) -> usize {
        let ids: Vec<FeatureId> = self.world.features().collect();
        ids.into_iter().filter(|f| self.world.show(*f)).count()
    }

    pub fn hide_all(&mut self) -> usize {
        let ids: Vec<FeatureId> = self.world.features().collect();
        ids.into_iter().filter(|f| self.world.hide(*f)).count()
    }

    /// Styles every drawable feature for `resolution` (meters per pixel).
    pub fn extract(&self, resolution: f64) -> VectorLayerSnapshot {
        let mut out = VectorLayerSnapshot::default();
        if !self.visible {
            return out;
        }

        for id in self.world.features() {
            let Some(symbol) = self.world.symbol(id) else {
                continue;
            };
            let Some(geometry) = self.world.geometry(id) else {
                continue;
            };
            let style = style_for(symbol.current(), resolution);
            if style.is_empty() {
                continue;
            }
            out.features.push(StyledFeature {
                id,
                geometry: geometry.clone(),
                style,
            });
        }

        out
    }
}

impl Layer for VectorLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
