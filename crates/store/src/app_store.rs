use std::rc::Rc;

use model::bbox::BoundingBox;
use model::bus_data::StopsAndRoutes;
use model::clustering::{ClusteredStop, StopsClusteringData};
use model::entity::MapEntity;
use model::route::Route;
use model::source::Source;
use model::stop::Stop;
use model::traffic::{FlowByRoute, TrafficFlowData, Weekday};
use runtime::event_bus::{EventBus, SubscriptionId};
use tracing::debug;

use crate::event::StoreEvent;
use crate::state::{DisplayInfo, FetchInfo, FetchStatus, Mode};

/// Application state shared by the map, the dispatcher and the request flows.
///
/// Data caches and entity pointers are held behind `Rc` and every setter swaps in
/// a new `Rc`, so a subscriber can detect a change with `Rc::ptr_eq` alone. Each
/// mutation that changes something emits one [`StoreEvent`].
#[derive(Debug)]
pub struct AppStore {
    mode: Mode,
    display_info: DisplayInfo,
    source: Source,
    bbox: Option<BoundingBox>,
    bbox_drawing: bool,
    stops_and_routes: Rc<StopsAndRoutes>,
    traffic_flow: Rc<TrafficFlowData>,
    clustering: Rc<StopsClusteringData>,
    focused_entity: Option<Rc<MapEntity>>,
    selected_entity: Option<Rc<MapEntity>>,
    highlighted_entity: Option<Rc<MapEntity>>,
    show_all: bool,
    fetch_info: Option<FetchInfo>,
    events: EventBus<StoreEvent>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            display_info: DisplayInfo::default(),
            source: Source::Local,
            bbox: None,
            bbox_drawing: false,
            stops_and_routes: Rc::default(),
            traffic_flow: Rc::default(),
            clustering: Rc::default(),
            focused_entity: None,
            selected_entity: None,
            highlighted_entity: None,
            show_all: true,
            fetch_info: None,
            events: EventBus::new(),
        }
    }
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Change notification

    pub fn subscribe(&mut self, subscriber: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn pending_events(&self) -> &[StoreEvent] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        self.events.drain()
    }

    fn emit(&mut self, event: StoreEvent) {
        debug!(?event, "store changed");
        self.events.emit(event);
    }

    // Mode, display filter, source

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            self.mode = mode;
            self.emit(StoreEvent::ModeChanged);
        }
    }

    pub fn display_info(&self) -> DisplayInfo {
        self.display_info
    }

    pub fn set_display_info(&mut self, display_info: DisplayInfo) {
        if self.display_info != display_info {
            self.display_info = display_info;
            self.emit(StoreEvent::DisplayInfoChanged);
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn set_source(&mut self, source: Source) {
        if self.source != source {
            self.source = source;
            self.emit(StoreEvent::SourceChanged);
        }
    }

    // Working area

    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    pub fn set_bbox(&mut self, bbox: BoundingBox) {
        self.bbox = Some(bbox);
        self.emit(StoreEvent::BoundingBoxChanged);
    }

    /// Clears the working area only; cached data stays.
    pub fn clear_bbox(&mut self) {
        if self.bbox.take().is_some() {
            self.emit(StoreEvent::BoundingBoxChanged);
        }
    }

    pub fn bbox_drawing(&self) -> bool {
        self.bbox_drawing
    }

    pub fn set_bbox_drawing(&mut self, drawing: bool) {
        if self.bbox_drawing != drawing {
            self.bbox_drawing = drawing;
            self.emit(StoreEvent::BoundingBoxDrawingChanged);
        }
    }

    pub fn toggle_bbox_drawing(&mut self) {
        self.set_bbox_drawing(!self.bbox_drawing);
    }

    // Stops and routes cache

    pub fn stops_and_routes(&self) -> &Rc<StopsAndRoutes> {
        &self.stops_and_routes
    }

    pub fn set_stops_and_routes(&mut self, data: StopsAndRoutes) {
        self.stops_and_routes = Rc::new(data);
        self.emit(StoreEvent::StopsAndRoutesChanged);
    }

    pub fn clear_stops_and_routes(&mut self) {
        self.set_stops_and_routes(StopsAndRoutes::default());
    }

    pub fn replace_stop(&mut self, id: &str, stop: Stop) {
        let next = self.stops_and_routes.with_stop_replaced(id, stop);
        self.set_stops_and_routes(next);
    }

    pub fn replace_route(&mut self, id: &str, route: Route) {
        let next = self.stops_and_routes.with_route_replaced(id, route);
        self.set_stops_and_routes(next);
    }

    // Traffic cache

    pub fn traffic_flow(&self) -> &Rc<TrafficFlowData> {
        &self.traffic_flow
    }

    pub fn set_traffic_routes(&mut self, routes: Vec<Route>) {
        self.update_traffic(|t| t.routes = routes);
    }

    pub fn set_traffic_flow(&mut self, flow: FlowByRoute) {
        self.update_traffic(|t| t.flow = flow);
    }

    pub fn set_traffic_time(&mut self, weekday: Weekday, hour_interval: u8) {
        self.update_traffic(|t| {
            t.weekday = weekday;
            t.hour_interval = hour_interval;
        });
    }

    pub fn clear_traffic_flow(&mut self) {
        self.traffic_flow = Rc::default();
        self.emit(StoreEvent::TrafficFlowChanged);
    }

    fn update_traffic(&mut self, f: impl FnOnce(&mut TrafficFlowData)) {
        let mut next = TrafficFlowData::clone(&self.traffic_flow);
        f(&mut next);
        self.traffic_flow = Rc::new(next);
        self.emit(StoreEvent::TrafficFlowChanged);
    }

    // Clustering cache

    pub fn clustering(&self) -> &Rc<StopsClusteringData> {
        &self.clustering
    }

    pub fn set_reference_stops(&mut self, stops: Vec<Stop>) {
        self.update_clustering(|c| c.reference_stops = stops);
    }

    pub fn set_clustered_reference_stops(&mut self, stops: Vec<ClusteredStop>) {
        self.update_clustering(|c| c.clustered_reference_stops = stops);
    }

    pub fn set_clusters_count(&mut self, count: u32) {
        self.update_clustering(|c| c.clusters_count = count);
    }

    pub fn set_score(&mut self, score: f64) {
        self.update_clustering(|c| c.score = score);
    }

    pub fn clear_clustering(&mut self) {
        self.clustering = Rc::default();
        self.emit(StoreEvent::ClusteringChanged);
    }

    fn update_clustering(&mut self, f: impl FnOnce(&mut StopsClusteringData)) {
        let mut next = StopsClusteringData::clone(&self.clustering);
        f(&mut next);
        self.clustering = Rc::new(next);
        self.emit(StoreEvent::ClusteringChanged);
    }

    // Entity pointers

    pub fn focused_entity(&self) -> Option<&Rc<MapEntity>> {
        self.focused_entity.as_ref()
    }

    pub fn set_focused_entity(&mut self, entity: MapEntity) {
        self.focused_entity = Some(Rc::new(entity));
        self.emit(StoreEvent::FocusedEntityChanged);
    }

    pub fn clear_focused_entity(&mut self) {
        if self.focused_entity.take().is_some() {
            self.emit(StoreEvent::FocusedEntityChanged);
        }
    }

    pub fn selected_entity(&self) -> Option<&Rc<MapEntity>> {
        self.selected_entity.as_ref()
    }

    /// Selection takes visual priority, so any highlight is dropped first.
    pub fn set_selected_entity(&mut self, entity: MapEntity) {
        self.clear_highlighted_entity();
        self.selected_entity = Some(Rc::new(entity));
        self.emit(StoreEvent::SelectedEntityChanged);
    }

    pub fn clear_selected_entity(&mut self) {
        if self.selected_entity.take().is_some() {
            self.emit(StoreEvent::SelectedEntityChanged);
        }
    }

    pub fn highlighted_entity(&self) -> Option<&Rc<MapEntity>> {
        self.highlighted_entity.as_ref()
    }

    pub fn set_highlighted_entity(&mut self, entity: MapEntity) {
        self.highlighted_entity = Some(Rc::new(entity));
        self.emit(StoreEvent::HighlightedEntityChanged);
    }

    pub fn clear_highlighted_entity(&mut self) {
        if self.highlighted_entity.take().is_some() {
            self.emit(StoreEvent::HighlightedEntityChanged);
        }
    }

    // Default visibility

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    pub fn set_show_all(&mut self, show_all: bool) {
        if self.show_all != show_all {
            self.show_all = show_all;
            self.emit(StoreEvent::ShowAllChanged);
        }
    }

    pub fn toggle_show_all(&mut self) {
        self.set_show_all(!self.show_all);
    }

    // Status banner

    pub fn fetch_info(&self) -> Option<&FetchInfo> {
        self.fetch_info.as_ref()
    }

    pub fn set_fetch_info(&mut self, status: FetchStatus, message: impl Into<String>) {
        self.fetch_info = Some(FetchInfo {
            status,
            message: message.into(),
        });
        self.emit(StoreEvent::FetchInfoChanged);
    }

    pub fn clear_fetch_info(&mut self) {
        if self.fetch_info.take().is_some() {
            self.emit(StoreEvent::FetchInfoChanged);
        }
    }

    /// Clears the working area and the three data caches.
    pub fn clear_map(&mut self) {
        self.clear_bbox();
        self.clear_stops_and_routes();
        self.clear_traffic_flow();
        self.clear_clustering();
    }
}

#[cfg(test)]
mod tests {
    use super::AppStore;
    use crate::event::StoreEvent;
    use crate::state::{FetchStatus, Mode};
    use model::bbox::BoundingBox;
    use model::bus_data::StopsAndRoutes;
    use model::entity::MapEntity;
    use model::source::Source;
    use model::stop::Stop;
    use model::traffic::Weekday;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn stop(id: &str) -> Stop {
        Stop {
            id: id.into(),
            name: format!("stop {id}"),
            lon: 37.6,
            lat: 55.7,
            source: Source::Osm,
            external_source_id: Some(id.into()),
        }
    }

    #[test]
    fn defaults() {
        let store = AppStore::new();
        assert_eq!(store.mode(), Mode::StopsAndRoutes);
        assert_eq!(store.source(), Source::Local);
        assert!(store.show_all());
        assert!(store.bbox().is_none());
        assert_eq!(store.traffic_flow().weekday, Weekday::Monday);
        assert_eq!(store.traffic_flow().hour_interval, 0);
        assert!(store.fetch_info().is_none());
    }

    #[test]
    fn setters_swap_references() {
        let mut store = AppStore::new();
        let before = Rc::clone(store.stops_and_routes());
        store.set_stops_and_routes(StopsAndRoutes {
            stops: vec![stop("a")],
            routes: Vec::new(),
        });
        assert!(!Rc::ptr_eq(&before, store.stops_and_routes()));
        assert!(before.stops.is_empty());

        let traffic = Rc::clone(store.traffic_flow());
        store.set_traffic_time(Weekday::Friday, 8);
        assert!(!Rc::ptr_eq(&traffic, store.traffic_flow()));
        assert_eq!(store.traffic_flow().weekday, Weekday::Friday);
        assert_eq!(traffic.weekday, Weekday::Monday);
    }

    #[test]
    fn subscribers_observe_mutations() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut store = AppStore::new();
        store.subscribe(move |e| sink.borrow_mut().push(*e));

        store.set_mode(Mode::TrafficFlow);
        store.set_mode(Mode::TrafficFlow);
        store.toggle_show_all();
        store.set_fetch_info(FetchStatus::Loading, "Loading data");

        assert_eq!(
            *seen.borrow(),
            vec![
                StoreEvent::ModeChanged,
                StoreEvent::ShowAllChanged,
                StoreEvent::FetchInfoChanged
            ]
        );
        assert_eq!(store.drain_events().len(), 3);
        assert!(store.pending_events().is_empty());
    }

    #[test]
    fn mode_switch_keeps_other_caches() {
        let mut store = AppStore::new();
        store.set_stops_and_routes(StopsAndRoutes {
            stops: vec![stop("a")],
            routes: Vec::new(),
        });
        store.set_mode(Mode::StopsClustering);
        store.set_mode(Mode::StopsAndRoutes);
        assert_eq!(store.stops_and_routes().stops.len(), 1);
    }

    #[test]
    fn clearing_bbox_keeps_data() {
        let mut store = AppStore::new();
        store.set_bbox(BoundingBox::new(37.0, 55.0, 38.0, 56.0));
        store.set_reference_stops(vec![stop("a")]);
        store.clear_bbox();
        assert!(store.bbox().is_none());
        assert_eq!(store.clustering().reference_stops.len(), 1);
    }

    #[test]
    fn selecting_drops_highlight() {
        let mut store = AppStore::new();
        store.set_highlighted_entity(MapEntity::Stop(stop("a")));
        store.drain_events();

        store.set_selected_entity(MapEntity::Stop(stop("b")));
        assert!(store.highlighted_entity().is_none());
        assert_eq!(store.selected_entity().map(|e| e.id().to_string()), Some("b".into()));
        assert_eq!(
            store.drain_events(),
            vec![StoreEvent::HighlightedEntityChanged, StoreEvent::SelectedEntityChanged]
        );
    }

    #[test]
    fn clear_map_resets_caches_and_bbox() {
        let mut store = AppStore::new();
        store.set_bbox(BoundingBox::new(37.0, 55.0, 38.0, 56.0));
        store.set_stops_and_routes(StopsAndRoutes {
            stops: vec![stop("a")],
            routes: Vec::new(),
        });
        store.set_clusters_count(4);
        store.clear_map();
        assert!(store.bbox().is_none());
        assert!(store.stops_and_routes().is_empty());
        assert_eq!(store.clustering().clusters_count, 0);
    }

    #[test]
    fn replace_stop_patches_in_place_of_old_entry() {
        let mut store = AppStore::new();
        store.set_stops_and_routes(StopsAndRoutes {
            stops: vec![stop("a"), stop("b")],
            routes: Vec::new(),
        });
        let synced = Stop {
            id: "local-b".into(),
            source: Source::Local,
            ..stop("b")
        };
        store.replace_stop("b", synced.clone());
        assert_eq!(store.stops_and_routes().stops[1], synced);
    }
}
