use std::collections::BTreeMap;

use model::bbox::BoundingBox;
use model::bus_data::StopsAndRoutes;
use model::clustering::{
    ApplyClusteringResponse, ClusteredStop, ClusteringData, ClusteringProfile,
    GenerateClusteringRequest, ProfileTemplate,
};
use model::route::Route;
use model::source::Source;
use model::stop::Stop;
use model::traffic::{CreateSpeedProfileRequest, SpeedData, SpeedProfile, SpeedProfileSummary};
use tokio::sync::RwLock;

use crate::backend::{ApiResult, Backend, SPEED_DATA_FILE_COUNT, UploadFile};
use crate::error::ApiError;

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    /// Data served for every non-local source.
    external: StopsAndRoutes,
    local_stops: Vec<Stop>,
    local_routes: Vec<Route>,
    speed_data: Vec<SpeedData>,
    speed_profiles: Vec<SpeedProfile>,
    clustering_data: Vec<ClusteringData>,
    clustering_profiles: Vec<ClusteringProfile>,
    templates: Vec<ProfileTemplate>,
    calls: Vec<String>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn store_stop(&mut self, stop: Stop) -> Stop {
        let stored = Stop {
            id: self.next_id("stop"),
            source: Source::Local,
            external_source_id: stop.external_source_id.clone().or(Some(stop.id.clone())),
            ..stop
        };
        self.local_stops.push(stored.clone());
        stored
    }
}

/// In-process backend. Every call is recorded as `"METHOD path"`.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `data` for OSM and the other external sources.
    pub fn with_external_data(mut self, data: StopsAndRoutes) -> Self {
        self.state.get_mut().external = data;
        self
    }

    pub fn with_local_data(mut self, data: StopsAndRoutes) -> Self {
        {
            let state = self.state.get_mut();
            state.local_stops = data.stops;
            state.local_routes = data.routes;
        }
        self
    }

    pub fn with_speed_profile(mut self, profile: SpeedProfile) -> Self {
        self.state.get_mut().speed_profiles.push(profile);
        self
    }

    pub fn with_clustering_profile(mut self, profile: ClusteringProfile) -> Self {
        self.state.get_mut().clustering_profiles.push(profile);
        self
    }

    /// Templates returned by `generate`; one default template is built when empty.
    pub fn with_templates(mut self, templates: Vec<ProfileTemplate>) -> Self {
        self.state.get_mut().templates = templates;
        self
    }

    pub async fn calls(&self) -> Vec<String> {
        self.state.read().await.calls.clone()
    }

    pub async fn local_data(&self) -> StopsAndRoutes {
        let state = self.state.read().await;
        StopsAndRoutes {
            stops: state.local_stops.clone(),
            routes: state.local_routes.clone(),
        }
    }

    async fn record(&self, call: impl Into<String>) -> tokio::sync::RwLockWriteGuard<'_, State> {
        let mut state = self.state.write().await;
        state.calls.push(call.into());
        state
    }
}

fn stop_in(stop: &Stop, bbox: &BoundingBox) -> bool {
    bbox.extent().contains(stop.position())
}

fn route_in(route: &Route, bbox: &BoundingBox) -> bool {
    let extent = bbox.extent();
    (route.geometry.is_empty() && route.stops.is_empty())
        || route.geometry.iter().any(|p| extent.contains(p.position()))
        || route.stops.iter().any(|s| extent.contains(s.position()))
}

impl Backend for MemoryBackend {
    fn fetch_bus_data(&self, source: Source, bbox: BoundingBox) -> ApiResult<'_, StopsAndRoutes> {
        Box::pin(async move {
            let state = self
                .record(format!("GET bus_data/?source={}", source.api_code()))
                .await;
            let (stops, routes) = match source {
                Source::Local => (&state.local_stops, &state.local_routes),
                _ => (&state.external.stops, &state.external.routes),
            };
            Ok(StopsAndRoutes {
                stops: stops.iter().filter(|s| stop_in(s, &bbox)).cloned().collect(),
                routes: routes.iter().filter(|r| route_in(r, &bbox)).cloned().collect(),
            })
        })
    }

    fn create_stops(&self, stops: Vec<Stop>) -> ApiResult<'_, Vec<Stop>> {
        Box::pin(async move {
            let mut state = self.record("POST bus_data/stops").await;
            Ok(stops.into_iter().map(|s| state.store_stop(s)).collect())
        })
    }

    fn delete_stops(&self, stop_ids: Vec<String>) -> ApiResult<'_, ()> {
        Box::pin(async move {
            let mut state = self.record("DELETE bus_data/stops").await;
            state.local_stops.retain(|s| !stop_ids.contains(&s.id));
            Ok(())
        })
    }

    fn create_routes(&self, routes: Vec<Route>) -> ApiResult<'_, Vec<Route>> {
        Box::pin(async move {
            let mut state = self.record("POST bus_data/routes").await;
            let mut stored = Vec::with_capacity(routes.len());
            for route in routes {
                let stops = route
                    .stops
                    .iter()
                    .cloned()
                    .map(|s| state.store_stop(s))
                    .collect();
                let route = Route {
                    id: state.next_id("route"),
                    source: Source::Local,
                    external_source_id: route.external_source_id.clone().or(Some(route.id.clone())),
                    stops,
                    ..route
                };
                state.local_routes.push(route.clone());
                stored.push(route);
            }
            Ok(stored)
        })
    }

    fn delete_routes(&self, route_ids: Vec<String>) -> ApiResult<'_, ()> {
        Box::pin(async move {
            let mut state = self.record("DELETE bus_data/routes").await;
            state.local_routes.retain(|r| !route_ids.contains(&r.id));
            Ok(())
        })
    }

    fn routes_by_id(&self, route_ids: Vec<String>) -> ApiResult<'_, Vec<Route>> {
        Box::pin(async move {
            let state = self.record("POST bus_data/routes_by_id").await;
            Ok(state
                .local_routes
                .iter()
                .filter(|r| route_ids.contains(&r.id))
                .cloned()
                .collect())
        })
    }

    fn local_routes(&self, bbox: BoundingBox) -> ApiResult<'_, Vec<Route>> {
        Box::pin(async move {
            let state = self.record("GET bus_data/routes").await;
            Ok(state
                .local_routes
                .iter()
                .filter(|r| route_in(r, &bbox))
                .cloned()
                .collect())
        })
    }

    fn local_stops(&self, bbox: BoundingBox) -> ApiResult<'_, Vec<Stop>> {
        Box::pin(async move {
            let state = self.record("GET bus_data/stops").await;
            Ok(state
                .local_stops
                .iter()
                .filter(|s| stop_in(s, &bbox))
                .cloned()
                .collect())
        })
    }

    fn speed_data_list(&self) -> ApiResult<'_, Vec<SpeedData>> {
        Box::pin(async move {
            let state = self.record("GET traffic_flow/data/list").await;
            Ok(state.speed_data.clone())
        })
    }

    fn upload_speed_data(&self, name: String, files: Vec<UploadFile>) -> ApiResult<'_, SpeedData> {
        Box::pin(async move {
            let mut state = self.record("POST traffic_flow/data").await;
            if files.len() != SPEED_DATA_FILE_COUNT {
                return Err(ApiError::Status {
                    status: 422,
                    body: format!("expected {SPEED_DATA_FILE_COUNT} files, got {}", files.len()),
                });
            }
            let data = SpeedData {
                id: state.next_id("speed-data"),
                name,
            };
            state.speed_data.push(data.clone());
            Ok(data)
        })
    }

    fn create_speed_profile(&self, request: CreateSpeedProfileRequest) -> ApiResult<'_, SpeedProfile> {
        Box::pin(async move {
            let mut state = self.record("POST traffic_flow").await;
            if !state.speed_data.iter().any(|d| d.id == request.speed_data_id) {
                return Err(ApiError::not_found(format!("speed data {}", request.speed_data_id)));
            }
            let profile = SpeedProfile {
                id: state.next_id("speed-profile"),
                name: request.name,
                speed_data_id: request.speed_data_id,
                routes: request
                    .routes_ids
                    .into_iter()
                    .map(|id| (id, BTreeMap::new()))
                    .collect(),
            };
            state.speed_profiles.push(profile.clone());
            Ok(profile)
        })
    }

    fn speed_profiles(&self) -> ApiResult<'_, Vec<SpeedProfileSummary>> {
        Box::pin(async move {
            let state = self.record("GET traffic_flow/list").await;
            Ok(state.speed_profiles.iter().map(SpeedProfile::summary).collect())
        })
    }

    fn speed_profile(&self, id: String) -> ApiResult<'_, SpeedProfile> {
        Box::pin(async move {
            let state = self.record(format!("GET traffic_flow/{id}")).await;
            state
                .speed_profiles
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| ApiError::not_found(format!("speed profile {id}")))
        })
    }

    fn delete_speed_profile(&self, id: String) -> ApiResult<'_, SpeedProfile> {
        Box::pin(async move {
            let mut state = self.record(format!("DELETE traffic_flow/{id}")).await;
            let idx = state
                .speed_profiles
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| ApiError::not_found(format!("speed profile {id}")))?;
            Ok(state.speed_profiles.remove(idx))
        })
    }

    fn generate_clustering(
        &self,
        request: GenerateClusteringRequest,
    ) -> ApiResult<'_, Vec<ProfileTemplate>> {
        Box::pin(async move {
            let state = self.record("POST stops_clustering/generate").await;
            if !state
                .clustering_data
                .iter()
                .any(|d| d.id == request.params.clustering_data_id)
            {
                return Err(ApiError::not_found(format!(
                    "clustering data {}",
                    request.params.clustering_data_id
                )));
            }
            if !state.templates.is_empty() {
                return Ok(state.templates.clone());
            }
            Ok(vec![ProfileTemplate {
                clustering_score: request.params.min_score.unwrap_or_default(),
                name: request.name,
                clustering_params: request.params,
                clusters_count: 3,
            }])
        })
    }

    fn realize_clustering(&self, template: ProfileTemplate) -> ApiResult<'_, ClusteringProfile> {
        Box::pin(async move {
            let mut state = self.record("POST stops_clustering/realize").await;
            let profile = ClusteringProfile {
                id: state.next_id("clustering-profile"),
                name: template.name,
                clustering_params: template.clustering_params,
                clusters_count: template.clusters_count,
                clustering_score: template.clustering_score,
            };
            state.clustering_profiles.push(profile.clone());
            Ok(profile)
        })
    }

    fn clustering_profiles(&self) -> ApiResult<'_, Vec<ClusteringProfile>> {
        Box::pin(async move {
            let state = self.record("GET stops_clustering/list").await;
            Ok(state.clustering_profiles.clone())
        })
    }

    fn clustering_data_list(&self) -> ApiResult<'_, Vec<ClusteringData>> {
        Box::pin(async move {
            let state = self.record("GET stops_clustering/data/list").await;
            Ok(state.clustering_data.clone())
        })
    }

    fn upload_clustering_data(&self, name: String, file: UploadFile) -> ApiResult<'_, ClusteringData> {
        Box::pin(async move {
            let mut state = self.record("POST stops_clustering/data").await;
            if file.bytes.is_empty() {
                return Err(ApiError::Status {
                    status: 422,
                    body: format!("{} is empty", file.file_name),
                });
            }
            let data = ClusteringData {
                id: state.next_id("clustering-data"),
                name,
            };
            state.clustering_data.push(data.clone());
            Ok(data)
        })
    }

    fn apply_clustering(
        &self,
        profile_id: String,
        stop_ids: Vec<String>,
    ) -> ApiResult<'_, ApplyClusteringResponse> {
        Box::pin(async move {
            let state = self
                .record(format!("POST stops_clustering/{profile_id}"))
                .await;
            let profile = state
                .clustering_profiles
                .iter()
                .find(|p| p.id == profile_id)
                .ok_or_else(|| ApiError::not_found(format!("clustering profile {profile_id}")))?;
            let clusters = profile.clusters_count.max(1);
            let clustered_stops = state
                .local_stops
                .iter()
                .filter(|s| stop_ids.contains(&s.id))
                .enumerate()
                .map(|(i, stop)| ClusteredStop {
                    stop: stop.clone(),
                    cluster_index: i as u32 % clusters,
                })
                .collect();
            Ok(ApplyClusteringResponse {
                clustered_stops,
                clustered_correspondence: Vec::new(),
            })
        })
    }

    fn delete_clustering_profile(&self, id: String) -> ApiResult<'_, ClusteringProfile> {
        Box::pin(async move {
            let mut state = self.record(format!("DELETE stops_clustering/{id}")).await;
            let idx = state
                .clustering_profiles
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| ApiError::not_found(format!("clustering profile {id}")))?;
            Ok(state.clustering_profiles.remove(idx))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryBackend;
    use crate::backend::{Backend, UploadFile};
    use crate::error::ApiError;
    use model::bbox::BoundingBox;
    use model::bus_data::StopsAndRoutes;
    use model::clustering::{ClusteringParams, GenerateClusteringRequest};
    use model::source::Source;
    use model::stop::Stop;
    use model::traffic::CreateSpeedProfileRequest;
    use pretty_assertions::assert_eq;

    fn osm_stop(id: &str, lon: f64) -> Stop {
        Stop {
            id: id.into(),
            name: format!("stop {id}"),
            lon,
            lat: 55.5,
            source: Source::Osm,
            external_source_id: None,
        }
    }

    fn moscow() -> BoundingBox {
        BoundingBox::new(37.0, 55.0, 38.0, 56.0)
    }

    #[tokio::test]
    async fn external_fetch_filters_by_bbox() {
        let backend = MemoryBackend::new().with_external_data(StopsAndRoutes {
            stops: vec![osm_stop("in", 37.5), osm_stop("out", 40.0)],
            routes: Vec::new(),
        });
        let data = backend.fetch_bus_data(Source::Osm, moscow()).await.unwrap();
        assert_eq!(data.stops.len(), 1);
        assert_eq!(data.stops[0].id, "in");

        let local = backend.fetch_bus_data(Source::Local, moscow()).await.unwrap();
        assert!(local.is_empty());
        assert_eq!(
            backend.calls().await,
            vec!["GET bus_data/?source=osm", "GET bus_data/?source=local"]
        );
    }

    #[tokio::test]
    async fn created_stops_are_local_and_remember_their_origin() {
        let backend = MemoryBackend::new();
        let stored = backend
            .create_stops(vec![osm_stop("osm-1", 37.5)])
            .await
            .unwrap();
        assert_eq!(stored[0].source, Source::Local);
        assert_eq!(stored[0].external_source_id.as_deref(), Some("osm-1"));
        assert_ne!(stored[0].id, "osm-1");

        backend.delete_stops(vec![stored[0].id.clone()]).await.unwrap();
        assert!(backend.local_data().await.stops.is_empty());
    }

    #[tokio::test]
    async fn speed_profile_lifecycle() {
        let backend = MemoryBackend::new();
        let files: Vec<UploadFile> = (0..7)
            .map(|i| UploadFile::new(format!("day{i}.csv"), b"x".to_vec()))
            .collect();
        let data = backend
            .upload_speed_data("week".into(), files)
            .await
            .unwrap();
        let profile = backend
            .create_speed_profile(CreateSpeedProfileRequest {
                name: "rush".into(),
                routes_ids: vec!["r1".into()],
                speed_data_id: data.id,
            })
            .await
            .unwrap();
        assert_eq!(profile.route_ids(), vec!["r1".to_string()]);
        assert_eq!(backend.speed_profiles().await.unwrap().len(), 1);

        let deleted = backend.delete_speed_profile(profile.id.clone()).await.unwrap();
        assert_eq!(deleted.id, profile.id);
        let err = backend.speed_profile(profile.id).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn short_speed_upload_is_rejected() {
        let backend = MemoryBackend::new();
        let err = backend
            .upload_speed_data("week".into(), vec![UploadFile::new("mon.csv", b"x".to_vec())])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 422, .. }));
    }

    #[tokio::test]
    async fn clustering_round_trip() {
        let backend = MemoryBackend::new().with_local_data(StopsAndRoutes {
            stops: vec![
                Stop {
                    source: Source::Local,
                    ..osm_stop("a", 37.1)
                },
                Stop {
                    source: Source::Local,
                    ..osm_stop("b", 37.2)
                },
            ],
            routes: Vec::new(),
        });
        let data = backend
            .upload_clustering_data("stops".into(), UploadFile::new("stops.csv", b"1".to_vec()))
            .await
            .unwrap();
        let templates = backend
            .generate_clustering(GenerateClusteringRequest {
                name: "k".into(),
                params: ClusteringParams::for_data(data.id),
            })
            .await
            .unwrap();
        let profile = backend.realize_clustering(templates[0].clone()).await.unwrap();

        let applied = backend
            .apply_clustering(profile.id.clone(), vec!["a".into(), "b".into()])
            .await
            .unwrap();
        let indices: Vec<u32> = applied.clustered_stops.iter().map(|c| c.cluster_index).collect();
        assert_eq!(indices, vec![0, 1]);

        backend.delete_clustering_profile(profile.id).await.unwrap();
        assert!(backend.clustering_profiles().await.unwrap().is_empty());
    }
}
