use store::app_store::AppStore;
use store::event::StoreEvent;
use tracing::debug;

use crate::map_controller::{FeatureLayerKind, MapController};

/// What one batch of store events asks the map to redo.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Work {
    switch_layer: bool,
    stops_and_routes: bool,
    traffic_flow: bool,
    clustering: bool,
    bbox: bool,
    refocus: bool,
    visibility: bool,
}

impl Work {
    fn from_events(events: &[StoreEvent]) -> Self {
        let mut work = Work::default();
        for event in events {
            match event {
                StoreEvent::ModeChanged => work.switch_layer = true,
                StoreEvent::DisplayInfoChanged | StoreEvent::StopsAndRoutesChanged => {
                    work.stops_and_routes = true
                }
                StoreEvent::TrafficFlowChanged => work.traffic_flow = true,
                StoreEvent::ClusteringChanged => work.clustering = true,
                StoreEvent::BoundingBoxChanged => work.bbox = true,
                StoreEvent::SelectedEntityChanged => work.refocus = true,
                StoreEvent::HighlightedEntityChanged | StoreEvent::ShowAllChanged => {
                    work.visibility = true
                }
                StoreEvent::SourceChanged
                | StoreEvent::BoundingBoxDrawingChanged
                | StoreEvent::FocusedEntityChanged
                | StoreEvent::FetchInfoChanged => {}
            }
        }
        work
    }

    fn rebuilds(&self, kind: FeatureLayerKind) -> bool {
        match kind {
            FeatureLayerKind::StopsAndRoutes => self.stops_and_routes,
            FeatureLayerKind::TrafficFlow => self.traffic_flow,
            FeatureLayerKind::StopsClustering => self.clustering,
        }
    }
}

/// Single dispatcher between the store and the map.
///
/// Each [`ViewSync::dispatch`] drains the pending store events and, in order:
/// switches the active layer, clears and rebuilds every layer whose data
/// changed, redraws the working area, then reapplies the visibility policy
/// (selected entity, else highlighted entity, else the show-all default).
#[derive(Debug, Default)]
pub struct ViewSync {
    batches: u64,
}

impl ViewSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-empty batches handled so far.
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// Returns the events handled in this call.
    pub fn dispatch(&mut self, store: &mut AppStore, map: &mut MapController) -> Vec<StoreEvent> {
        let events = store.drain_events();
        if events.is_empty() {
            return events;
        }
        self.batches += 1;
        let work = Work::from_events(&events);
        debug!(?work, "dispatching {} store events", events.len());

        if work.switch_layer {
            map.focus_on_layer(store.mode().into());
        }
        if work.stops_and_routes {
            rebuild_stops_and_routes(store, map);
        }
        if work.traffic_flow {
            rebuild_traffic_flow(store, map);
        }
        if work.clustering {
            rebuild_clustering(store, map);
        }
        if work.bbox {
            map.render_bbox(store.bbox());
        }

        let active_rebuilt = work.rebuilds(map.active_kind());
        if work.refocus || work.visibility || work.switch_layer || active_rebuilt {
            apply_visibility(store, map, work.refocus);
        }
        events
    }
}

fn rebuild_stops_and_routes(store: &AppStore, map: &mut MapController) {
    map.clear_layer(FeatureLayerKind::StopsAndRoutes);
    let data = store.stops_and_routes();
    let display = store.display_info();
    if display.shows_stops() {
        map.render_stops(&data.stops);
    }
    if display.shows_routes() {
        map.render_routes(&data.routes);
    }
}

fn rebuild_traffic_flow(store: &AppStore, map: &mut MapController) {
    map.clear_layer(FeatureLayerKind::TrafficFlow);
    let traffic = store.traffic_flow();
    map.render_traffic(&traffic.routes, &traffic.flow);
}

fn rebuild_clustering(store: &AppStore, map: &mut MapController) {
    map.clear_layer(FeatureLayerKind::StopsClustering);
    let clustering = store.clustering();
    if clustering.clustered_reference_stops.is_empty() {
        map.render_reference_stops(&clustering.reference_stops);
    } else {
        map.render_clustered_stops(
            &clustering.clustered_reference_stops,
            clustering.clusters_count,
        );
    }
}

/// `refocus` also fits the view when a selection exists.
fn apply_visibility(store: &AppStore, map: &mut MapController, refocus: bool) {
    if let Some(selected) = store.selected_entity() {
        if refocus {
            map.focus_on_entity(selected);
        } else {
            map.highlight_entity(selected);
        }
    } else if let Some(highlighted) = store.highlighted_entity() {
        map.highlight_entity(highlighted);
    } else if store.show_all() {
        map.show_all();
    } else {
        map.hide_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::fetch_bus_data;
    use crate::fixtures::{scenario_data, short_route, stop};
    use crate::viewport::{DEFAULT_ZOOM, Viewport};
    use api::memory::MemoryBackend;
    use model::bbox::BoundingBox;
    use model::clustering::ClusteredStop;
    use model::entity::MapEntity;
    use model::source::Source;
    use pretty_assertions::assert_eq;
    use store::state::{DisplayInfo, Mode};

    fn setup() -> (AppStore, MapController, ViewSync) {
        let mut store = AppStore::new();
        store.set_display_info(DisplayInfo::All);
        (
            store,
            MapController::new(Viewport::new(1280.0, 720.0)),
            ViewSync::new(),
        )
    }

    fn visibility(map: &MapController) -> Vec<bool> {
        map.summary().features.iter().map(|f| f.visible).collect()
    }

    #[tokio::test]
    async fn fetched_scenario_renders_five_features() {
        let backend = MemoryBackend::new().with_local_data(scenario_data());
        let (mut store, mut map, mut sync) = setup();
        store.set_bbox(BoundingBox::new(37.0, 55.0, 38.0, 56.0));
        store.set_source(Source::Local);

        fetch_bus_data(&mut store, &backend).await.unwrap();
        sync.dispatch(&mut store, &mut map);

        assert_eq!(**store.stops_and_routes(), scenario_data());
        assert_eq!(map.active_layer().len(), 2 + 3);
        assert_eq!(map.active_layer().visible_count(), 5);
        assert_eq!(map.bbox_layer().world.len(), 1);
    }

    #[test]
    fn display_filter_picks_entity_kinds() {
        let (mut store, mut map, mut sync) = setup();
        store.set_stops_and_routes(scenario_data());
        sync.dispatch(&mut store, &mut map);
        assert_eq!(map.active_layer().len(), 5);

        store.set_display_info(DisplayInfo::Stops);
        sync.dispatch(&mut store, &mut map);
        assert_eq!(map.active_layer().len(), 2);

        store.set_display_info(DisplayInfo::Routes);
        sync.dispatch(&mut store, &mut map);
        assert_eq!(map.active_layer().len(), 3);
    }

    #[test]
    fn mode_change_switches_layer_and_keeps_data() {
        let (mut store, mut map, mut sync) = setup();
        store.set_stops_and_routes(scenario_data());
        store.set_traffic_routes(vec![short_route("t", Source::Local)]);
        sync.dispatch(&mut store, &mut map);
        assert_eq!(map.active_kind(), FeatureLayerKind::StopsAndRoutes);
        assert!(!map.layer(FeatureLayerKind::TrafficFlow).is_empty());

        store.set_mode(Mode::TrafficFlow);
        sync.dispatch(&mut store, &mut map);
        assert_eq!(map.active_kind(), FeatureLayerKind::TrafficFlow);
        assert_eq!(map.layer(FeatureLayerKind::StopsAndRoutes).len(), 5);

        store.set_mode(Mode::StopsAndRoutes);
        sync.dispatch(&mut store, &mut map);
        assert_eq!(map.active_layer().visible_count(), 5);
    }

    #[test]
    fn selection_beats_highlight_beats_show_all() {
        let (mut store, mut map, mut sync) = setup();
        let data = scenario_data();
        store.set_stops_and_routes(data.clone());
        sync.dispatch(&mut store, &mut map);

        store.set_highlighted_entity(MapEntity::Stop(data.stops[1].clone()));
        sync.dispatch(&mut store, &mut map);
        assert_eq!(visibility(&map), vec![false, true, false, false, false]);

        store.set_selected_entity(MapEntity::Route(data.routes[0].clone()));
        sync.dispatch(&mut store, &mut map);
        assert_eq!(visibility(&map), vec![false, false, true, true, true]);
        assert!(map.viewport().zoom() > DEFAULT_ZOOM);

        store.clear_selected_entity();
        sync.dispatch(&mut store, &mut map);
        assert_eq!(map.active_layer().visible_count(), 5);

        store.set_show_all(false);
        sync.dispatch(&mut store, &mut map);
        assert_eq!(map.active_layer().visible_count(), 0);
    }

    #[test]
    fn rebuild_reapplies_selection_without_refitting() {
        let (mut store, mut map, mut sync) = setup();
        let data = scenario_data();
        store.set_stops_and_routes(data.clone());
        store.set_selected_entity(MapEntity::Stop(data.stops[0].clone()));
        sync.dispatch(&mut store, &mut map);
        let zoom = map.viewport().zoom();

        map.viewport_mut().set_zoom(zoom - 2.0);
        store.set_stops_and_routes(data);
        sync.dispatch(&mut store, &mut map);
        assert_eq!(visibility(&map), vec![true, false, false, false, false]);
        assert_eq!(map.viewport().zoom(), zoom - 2.0);
    }

    #[test]
    fn clustered_stops_replace_reference_stops() {
        let (mut store, mut map, mut sync) = setup();
        store.set_mode(Mode::StopsClustering);
        let reference = vec![
            stop("a", Source::Local, 37.1, 55.1),
            stop("b", Source::Local, 37.2, 55.2),
        ];
        store.set_reference_stops(reference.clone());
        sync.dispatch(&mut store, &mut map);
        assert_eq!(map.active_layer().len(), 2);
        assert!(map.cluster_palette().is_empty());

        store.set_clusters_count(2);
        store.set_clustered_reference_stops(
            reference
                .into_iter()
                .enumerate()
                .map(|(i, stop)| ClusteredStop {
                    stop,
                    cluster_index: i as u32,
                })
                .collect(),
        );
        sync.dispatch(&mut store, &mut map);
        assert_eq!(map.active_layer().len(), 2);
        assert_eq!(map.cluster_palette().len(), 2);
    }

    #[test]
    fn clearing_the_working_area_empties_the_bbox_layer() {
        let (mut store, mut map, mut sync) = setup();
        store.set_bbox(BoundingBox::new(37.0, 55.0, 38.0, 56.0));
        sync.dispatch(&mut store, &mut map);
        assert_eq!(map.bbox_layer().world.len(), 1);

        store.clear_bbox();
        sync.dispatch(&mut store, &mut map);
        assert!(map.bbox_layer().world.is_empty());
    }

    #[test]
    fn empty_batches_are_skipped() {
        let (mut store, mut map, mut sync) = setup();
        sync.dispatch(&mut store, &mut map);
        assert_eq!(sync.batches(), 1);
        assert!(sync.dispatch(&mut store, &mut map).is_empty());
        assert_eq!(sync.batches(), 1);
    }
}
