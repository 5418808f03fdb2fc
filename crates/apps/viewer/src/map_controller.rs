use compute::segments::merge_segments;
use foundation::color::{Hsl, palette};
use layers::labels::HoverLabel;
use layers::layer::Layer;
use layers::raster::TileLayer;
use layers::vector::{VectorLayer, VectorLayerSnapshot};
use model::bbox::BoundingBox;
use model::clustering::ClusteredStop;
use model::entity::MapEntity;
use model::route::Route;
use model::stop::Stop;
use model::traffic::FlowByRoute;
use scene::components::{FeatureGeometry, FeatureProperties, GeometryKind, Symbol};
use scene::entity::FeatureId;
use scene::picking::{PickOptions, pick};
use serde::Serialize;
use store::app_store::AppStore;
use store::state::Mode;
use tracing::{debug, info};

use crate::feature_layer::FeatureLayer;
use crate::viewport::Viewport;

/// Hit radius around the cursor, pixels.
pub const PICK_TOLERANCE_PX: f64 = 6.0;

/// One feature layer per data domain; exactly one is visible.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureLayerKind {
    StopsAndRoutes,
    TrafficFlow,
    StopsClustering,
}

impl FeatureLayerKind {
    pub const ALL: [FeatureLayerKind; 3] = [
        FeatureLayerKind::StopsAndRoutes,
        FeatureLayerKind::TrafficFlow,
        FeatureLayerKind::StopsClustering,
    ];
}

impl From<Mode> for FeatureLayerKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::StopsAndRoutes => FeatureLayerKind::StopsAndRoutes,
            Mode::TrafficFlow => FeatureLayerKind::TrafficFlow,
            Mode::StopsClustering => FeatureLayerKind::StopsClustering,
        }
    }
}

/// Everything a frontend needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFrame {
    pub tile_urls: Vec<String>,
    pub bbox: VectorLayerSnapshot,
    pub features: VectorLayerSnapshot,
}

/// Owns the base map, the bbox layer and the three feature layers.
#[derive(Debug)]
pub struct MapController {
    viewport: Viewport,
    base: TileLayer,
    bbox: VectorLayer,
    stops_and_routes: FeatureLayer,
    traffic_flow: FeatureLayer,
    stops_clustering: FeatureLayer,
    active: FeatureLayerKind,
    cluster_palette: Vec<Hsl>,
    hover: HoverLabel,
}

impl MapController {
    pub fn new(viewport: Viewport) -> Self {
        let mut map = Self {
            viewport,
            base: TileLayer::osm(0),
            bbox: VectorLayer::new(1, "bbox"),
            stops_and_routes: FeatureLayer::new(2, "stops_and_routes"),
            traffic_flow: FeatureLayer::new(3, "traffic_flow"),
            stops_clustering: FeatureLayer::new(4, "stops_clustering"),
            active: FeatureLayerKind::StopsAndRoutes,
            cluster_palette: Vec::new(),
            hover: HoverLabel::new(),
        };
        map.focus_on_layer(FeatureLayerKind::StopsAndRoutes);
        map
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn hover(&self) -> &HoverLabel {
        &self.hover
    }

    pub fn bbox_layer(&self) -> &VectorLayer {
        &self.bbox
    }

    pub fn layer(&self, kind: FeatureLayerKind) -> &FeatureLayer {
        match kind {
            FeatureLayerKind::StopsAndRoutes => &self.stops_and_routes,
            FeatureLayerKind::TrafficFlow => &self.traffic_flow,
            FeatureLayerKind::StopsClustering => &self.stops_clustering,
        }
    }

    fn layer_mut(&mut self, kind: FeatureLayerKind) -> &mut FeatureLayer {
        match kind {
            FeatureLayerKind::StopsAndRoutes => &mut self.stops_and_routes,
            FeatureLayerKind::TrafficFlow => &mut self.traffic_flow,
            FeatureLayerKind::StopsClustering => &mut self.stops_clustering,
        }
    }

    pub fn active_kind(&self) -> FeatureLayerKind {
        self.active
    }

    pub fn active_layer(&self) -> &FeatureLayer {
        self.layer(self.active)
    }

    fn active_layer_mut(&mut self) -> &mut FeatureLayer {
        self.layer_mut(self.active)
    }

    /// Hides every feature layer, then shows `kind` and makes it active.
    pub fn focus_on_layer(&mut self, kind: FeatureLayerKind) {
        for k in FeatureLayerKind::ALL {
            self.layer_mut(k).layer.set_visible(false);
        }
        self.active = kind;
        self.layer_mut(kind).layer.set_visible(true);
        self.hover.hide();
        debug!("active layer {}", self.layer(kind).layer.name);
    }

    pub fn clear_layer(&mut self, kind: FeatureLayerKind) {
        self.layer_mut(kind).clear();
    }

    pub fn clear_all(&mut self) {
        self.bbox.clear();
        for k in FeatureLayerKind::ALL {
            self.clear_layer(k);
        }
        self.hover.hide();
    }

    // Visibility

    pub fn show_feature(&mut self, feature: FeatureId) -> bool {
        self.active_layer_mut().show(feature)
    }

    pub fn hide_feature(&mut self, feature: FeatureId) -> bool {
        self.active_layer_mut().hide(feature)
    }

    pub fn show_all(&mut self) -> usize {
        self.active_layer_mut().show_all()
    }

    pub fn hide_all(&mut self) -> usize {
        self.active_layer_mut().hide_all()
    }

    /// Shows only the features of `entity` in the active layer.
    pub fn highlight_entity(&mut self, entity: &MapEntity) -> usize {
        self.active_layer_mut().highlight(&entity.key())
    }

    /// Highlights `entity` and fits the view to its extent.
    pub fn focus_on_entity(&mut self, entity: &MapEntity) {
        self.highlight_entity(entity);
        if let Some(extent) = entity.extent() {
            self.viewport.fit_entity(extent);
        }
    }

    // Stops and routes

    pub fn render_stops(&mut self, stops: &[Stop]) {
        let layer = &mut self.stops_and_routes;
        for stop in stops {
            let key = layer.register(MapEntity::Stop(stop.clone()));
            layer.add(
                &key,
                FeatureGeometry::Point(stop.position()),
                FeatureProperties::labeled(stop.name.clone()),
                Symbol::Stop {
                    synced: stop.is_synchronized(),
                },
            );
        }
    }

    /// Per route: the path, one marker per stop-position and one per stop.
    pub fn render_routes(&mut self, routes: &[Route]) {
        let layer = &mut self.stops_and_routes;
        for route in routes {
            let synced = route.is_synchronized();
            let key = layer.register(MapEntity::Route(route.clone()));
            layer.add(
                &key,
                FeatureGeometry::Line(route.path()),
                FeatureProperties::labeled(route.name.clone()),
                Symbol::RouteLine { synced },
            );
            for sp in route.stop_positions() {
                layer.add(
                    &key,
                    FeatureGeometry::Point(sp.position()),
                    FeatureProperties::labeled(route.name.clone()),
                    Symbol::StopPosition { synced },
                );
            }
            for stop in &route.stops {
                layer.add(
                    &key,
                    FeatureGeometry::Point(stop.position()),
                    FeatureProperties::labeled(stop.name.clone()),
                    Symbol::Stop {
                        synced: stop.is_synchronized(),
                    },
                );
            }
        }
    }

    // Traffic

    /// Routes with flow data are drawn as constant-speed runs, the rest as one
    /// neutral line. Markers are drawn either way.
    pub fn render_traffic(&mut self, routes: &[Route], flow: &FlowByRoute) {
        let layer = &mut self.traffic_flow;
        for route in routes {
            let key = layer.register(MapEntity::Route(route.clone()));
            match flow.get(&route.id) {
                Some(speeds) => {
                    let segments =
                        merge_segments(&route.geometry, speeds, route.final_stop_order);
                    for segment in segments {
                        let properties = match segment.speed {
                            Some(speed) => FeatureProperties::labeled(format!("{speed:.2} km/h"))
                                .with_speed(speed),
                            None => FeatureProperties::labeled(route.name.clone()),
                        };
                        layer.add(
                            &key,
                            FeatureGeometry::Line(segment.points),
                            properties,
                            Symbol::TrafficLine {
                                speed: segment.speed,
                            },
                        );
                    }
                }
                None => {
                    layer.add(
                        &key,
                        FeatureGeometry::Line(route.path()),
                        FeatureProperties::labeled(route.name.clone()),
                        Symbol::TrafficLine { speed: None },
                    );
                }
            }
            for sp in route.stop_positions() {
                layer.add(
                    &key,
                    FeatureGeometry::Point(sp.position()),
                    FeatureProperties::labeled(route.name.clone()),
                    Symbol::TrafficStopPosition,
                );
            }
            for obstacle in route.obstacles() {
                let label = obstacle
                    .obstacle_type
                    .map(|t| t.label())
                    .unwrap_or("obstacle");
                layer.add(
                    &key,
                    FeatureGeometry::Point(obstacle.position()),
                    FeatureProperties::labeled(label),
                    Symbol::Obstacle,
                );
            }
            for stop in &route.stops {
                layer.add(
                    &key,
                    FeatureGeometry::Point(stop.position()),
                    FeatureProperties::labeled(stop.name.clone()),
                    Symbol::TrafficStop,
                );
            }
        }
    }

    // Clustering

    pub fn render_reference_stops(&mut self, stops: &[Stop]) {
        let layer = &mut self.stops_clustering;
        for stop in stops {
            let key = layer.register(MapEntity::Stop(stop.clone()));
            layer.add(
                &key,
                FeatureGeometry::Point(stop.position()),
                FeatureProperties::labeled(stop.name.clone()),
                Symbol::ReferenceStop,
            );
        }
    }

    /// Regenerates the palette when `clusters_count` changed, then colors each stop
    /// by its cluster index.
    pub fn render_clustered_stops(&mut self, stops: &[ClusteredStop], clusters_count: u32) {
        if self.cluster_palette.len() != clusters_count as usize {
            self.cluster_palette = palette(clusters_count as usize);
        }
        let layer = &mut self.stops_clustering;
        for clustered in stops {
            let idx = clustered.cluster_index as usize;
            let fill = self
                .cluster_palette
                .get(idx)
                .copied()
                .unwrap_or_else(|| Hsl::palette_entry(idx));
            let key = layer.register(MapEntity::ClusteredStop(clustered.clone()));
            layer.add(
                &key,
                FeatureGeometry::Point(clustered.stop.position()),
                FeatureProperties::labeled(clustered.stop.name.clone()),
                Symbol::ClusteredStop { fill },
            );
        }
    }

    pub fn cluster_palette(&self) -> &[Hsl] {
        &self.cluster_palette
    }

    // Working area

    /// Redraws the working-area rectangle; `None` leaves the layer empty.
    pub fn render_bbox(&mut self, bbox: Option<BoundingBox>) {
        self.bbox.clear();
        if let Some(bbox) = bbox {
            self.bbox.world.insert(
                FeatureGeometry::Polygon(bbox.extent().ring()),
                FeatureProperties::default(),
                Symbol::BoundingBox,
            );
        }
    }

    /// Converts a drag between two pixels into the working area. Ignored unless
    /// drawing is enabled; drawing switches itself off afterwards.
    pub fn finish_bbox_drawing(
        &self,
        from_px: [f64; 2],
        to_px: [f64; 2],
        store: &mut AppStore,
    ) -> Option<BoundingBox> {
        if !store.bbox_drawing() {
            return None;
        }
        let bbox = BoundingBox::from_corners(
            self.viewport.pixel_to_lonlat(from_px),
            self.viewport.pixel_to_lonlat(to_px),
        );
        info!("working area set to {bbox}");
        store.set_bbox(bbox);
        store.set_bbox_drawing(false);
        Some(bbox)
    }

    // Pointer

    fn pick_options(&self, visible_only: bool) -> PickOptions {
        PickOptions {
            tolerance: PICK_TOLERANCE_PX * self.viewport.resolution(),
            visible_only,
        }
    }

    /// Topmost feature of the active layer under `pixel`.
    pub fn feature_at(&self, pixel: [f64; 2], visible_only: bool) -> Option<FeatureId> {
        let at = self.viewport.pixel_to_coordinate(pixel);
        pick(
            &self.active_layer().layer.world,
            at,
            self.pick_options(visible_only),
        )
    }

    /// Selects the entity behind the topmost feature under `pixel`.
    pub fn click(&self, pixel: [f64; 2], store: &mut AppStore) -> bool {
        let Some(entity) = self
            .feature_at(pixel, false)
            .and_then(|f| self.active_layer().entity(f))
        else {
            return false;
        };
        debug!("clicked {}", entity.id());
        store.set_selected_entity(entity.clone());
        true
    }

    /// Moves the hover label next to the topmost visible feature, or hides it.
    pub fn pointer_move(&mut self, pixel: [f64; 2]) -> Option<&str> {
        let label = self.feature_at(pixel, true).and_then(|f| {
            self.active_layer()
                .layer
                .world
                .properties(f)
                .map(|p| p.hover_label.clone())
        });
        match label {
            Some(text) => self.hover.show_at(pixel, &text),
            None => self.hover.hide(),
        }
        self.hover.text()
    }

    // Output

    pub fn extract(&self) -> MapFrame {
        let resolution = self.viewport.resolution();
        let tile_urls = self
            .base
            .tiles_covering(self.viewport.extent(), self.viewport.zoom())
            .into_iter()
            .map(|t| self.base.tile_url(t))
            .collect();
        MapFrame {
            tile_urls,
            bbox: self.bbox.extract(resolution),
            features: self.active_layer().layer.extract(resolution),
        }
    }

    pub fn summary(&self) -> MapSummary {
        let layer = self.active_layer();
        let world = &layer.layer.world;
        let features = world
            .features()
            .map(|f| FeatureSummary {
                entity: layer
                    .entity_key(f)
                    .map(|k| format!("{:?}:{}", k.kind, k.id).to_lowercase())
                    .unwrap_or_default(),
                geometry: match world.geometry(f).map(FeatureGeometry::kind) {
                    Some(GeometryKind::Point) => "point",
                    Some(GeometryKind::Line) => "line",
                    Some(GeometryKind::Polygon) => "polygon",
                    None => "none",
                },
                label: world
                    .properties(f)
                    .map(|p| p.hover_label.clone())
                    .unwrap_or_default(),
                speed: world.properties(f).and_then(|p| p.speed),
                visible: world.is_visible(f),
            })
            .collect();
        MapSummary {
            layer: self.active,
            center: self.viewport.center_lonlat(),
            zoom: self.viewport.zoom(),
            visible_features: layer.visible_count(),
            features,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub entity: String,
    pub geometry: &'static str,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    pub visible: bool,
}

/// JSON-friendly view of the active layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSummary {
    pub layer: FeatureLayerKind,
    pub center: [f64; 2],
    pub zoom: f64,
    pub visible_features: usize,
    pub features: Vec<FeatureSummary>,
}
