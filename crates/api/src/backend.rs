use std::future::Future;
use std::pin::Pin;

use model::bbox::BoundingBox;
use model::bus_data::StopsAndRoutes;
use model::clustering::{
    ApplyClusteringResponse, ClusteringData, ClusteringProfile, GenerateClusteringRequest,
    ProfileTemplate,
};
use model::route::Route;
use model::source::Source;
use model::stop::Stop;
use model::traffic::{CreateSpeedProfileRequest, SpeedData, SpeedProfile, SpeedProfileSummary};

use crate::error::ApiError;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type ApiResult<'a, T> = BoxFuture<'a, Result<T, ApiError>>;

/// Number of day files in a speed-data upload, Monday first.
pub const SPEED_DATA_FILE_COUNT: usize = 7;

/// File part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Transit-data backend.
///
/// Implementations must be `Send + Sync`. Methods return boxed futures for
/// dyn-compatibility; arguments are owned so the futures only borrow `self`.
pub trait Backend: Send + Sync {
    /// `GET /bus_data/` for `source` inside `bbox`.
    fn fetch_bus_data(&self, source: Source, bbox: BoundingBox) -> ApiResult<'_, StopsAndRoutes>;

    /// `POST /bus_data/stops`. Returns the stored copies with server-assigned ids.
    fn create_stops(&self, stops: Vec<Stop>) -> ApiResult<'_, Vec<Stop>>;

    fn delete_stops(&self, stop_ids: Vec<String>) -> ApiResult<'_, ()>;

    fn create_routes(&self, routes: Vec<Route>) -> ApiResult<'_, Vec<Route>>;

    fn delete_routes(&self, route_ids: Vec<String>) -> ApiResult<'_, ()>;

    /// `POST /bus_data/routes_by_id`, local routes only.
    fn routes_by_id(&self, route_ids: Vec<String>) -> ApiResult<'_, Vec<Route>>;

    fn local_routes(&self, bbox: BoundingBox) -> ApiResult<'_, Vec<Route>>;

    fn local_stops(&self, bbox: BoundingBox) -> ApiResult<'_, Vec<Stop>>;

    fn speed_data_list(&self) -> ApiResult<'_, Vec<SpeedData>>;

    /// Multipart upload of [`SPEED_DATA_FILE_COUNT`] day files.
    fn upload_speed_data(&self, name: String, files: Vec<UploadFile>) -> ApiResult<'_, SpeedData>;

    fn create_speed_profile(&self, request: CreateSpeedProfileRequest) -> ApiResult<'_, SpeedProfile>;

    fn speed_profiles(&self) -> ApiResult<'_, Vec<SpeedProfileSummary>>;

    fn speed_profile(&self, id: String) -> ApiResult<'_, SpeedProfile>;

    /// Returns the deleted profile.
    fn delete_speed_profile(&self, id: String) -> ApiResult<'_, SpeedProfile>;

    fn generate_clustering(
        &self,
        request: GenerateClusteringRequest,
    ) -> ApiResult<'_, Vec<ProfileTemplate>>;

    fn realize_clustering(&self, template: ProfileTemplate) -> ApiResult<'_, ClusteringProfile>;

    fn clustering_profiles(&self) -> ApiResult<'_, Vec<ClusteringProfile>>;

    fn clustering_data_list(&self) -> ApiResult<'_, Vec<ClusteringData>>;

    fn upload_clustering_data(&self, name: String, file: UploadFile) -> ApiResult<'_, ClusteringData>;

    /// `POST /stops_clustering/{profile_id}` with the ids of the stops to cluster.
    fn apply_clustering(
        &self,
        profile_id: String,
        stop_ids: Vec<String>,
    ) -> ApiResult<'_, ApplyClusteringResponse>;

    /// Returns the deleted profile.
    fn delete_clustering_profile(&self, id: String) -> ApiResult<'_, ClusteringProfile>;
}
