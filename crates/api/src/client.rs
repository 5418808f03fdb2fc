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
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::backend::{ApiResult, Backend, UploadFile};
use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// REST client for the backend. No authentication and no timeouts.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut url =
            Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        // Url::join replaces the last path segment unless the base ends with '/'.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|_| ApiError::InvalidBaseUrl(format!("{}{path}", self.base_url)))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        decode(resp).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint(path)?;
        debug!("{method} {url}");
        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(ApiError::Transport)?;
        check_status(resp).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let resp = self.send(method, path, body).await?;
        decode(resp).await
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("POST {url} (multipart)");
        let resp = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        decode(resp).await
    }
}

fn bbox_query(source: Source, bbox: BoundingBox) -> Vec<(&'static str, String)> {
    let mut query = vec![("source", source.api_code().to_string())];
    query.extend(bbox.query_pairs());
    query
}

fn file_part(file: UploadFile) -> Part {
    Part::bytes(file.bytes).file_name(file.file_name)
}

async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().clone();
    let body = resp.text().await.unwrap_or_default();
    warn!("{url} answered {status}");
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let resp = check_status(resp).await?;
    let bytes = resp.bytes().await.map_err(ApiError::Transport)?;
    serde_json::from_slice(&bytes).map_err(ApiError::Decode)
}

impl Backend for HttpBackend {
    fn fetch_bus_data(&self, source: Source, bbox: BoundingBox) -> ApiResult<'_, StopsAndRoutes> {
        Box::pin(async move { self.get("bus_data/", &bbox_query(source, bbox)).await })
    }

    fn create_stops(&self, stops: Vec<Stop>) -> ApiResult<'_, Vec<Stop>> {
        Box::pin(async move {
            self.send_json(Method::POST, "bus_data/stops", Some(&stops))
                .await
        })
    }

    fn delete_stops(&self, stop_ids: Vec<String>) -> ApiResult<'_, ()> {
        Box::pin(async move {
            self.send(Method::DELETE, "bus_data/stops", Some(&stop_ids))
                .await
                .map(|_| ())
        })
    }

    fn create_routes(&self, routes: Vec<Route>) -> ApiResult<'_, Vec<Route>> {
        Box::pin(async move {
            self.send_json(Method::POST, "bus_data/routes", Some(&routes))
                .await
        })
    }

    fn delete_routes(&self, route_ids: Vec<String>) -> ApiResult<'_, ()> {
        Box::pin(async move {
            self.send(Method::DELETE, "bus_data/routes", Some(&route_ids))
                .await
                .map(|_| ())
        })
    }

    fn routes_by_id(&self, route_ids: Vec<String>) -> ApiResult<'_, Vec<Route>> {
        Box::pin(async move {
            self.send_json(Method::POST, "bus_data/routes_by_id", Some(&route_ids))
                .await
        })
    }

    fn local_routes(&self, bbox: BoundingBox) -> ApiResult<'_, Vec<Route>> {
        Box::pin(async move {
            self.get("bus_data/routes", &bbox_query(Source::Local, bbox))
                .await
        })
    }

    fn local_stops(&self, bbox: BoundingBox) -> ApiResult<'_, Vec<Stop>> {
        Box::pin(async move {
            self.get("bus_data/stops", &bbox_query(Source::Local, bbox))
                .await
        })
    }

    fn speed_data_list(&self) -> ApiResult<'_, Vec<SpeedData>> {
        Box::pin(async move { self.get("traffic_flow/data/list", &[]).await })
    }

    fn upload_speed_data(&self, name: String, files: Vec<UploadFile>) -> ApiResult<'_, SpeedData> {
        Box::pin(async move {
            let mut form = Form::new();
            for file in files {
                form = form.part("speed_data_files", file_part(file));
            }
            form = form.text("name", name);
            self.post_form("traffic_flow/data", form).await
        })
    }

    fn create_speed_profile(&self, request: CreateSpeedProfileRequest) -> ApiResult<'_, SpeedProfile> {
        Box::pin(async move {
            self.send_json(Method::POST, "traffic_flow", Some(&request))
                .await
        })
    }

    fn speed_profiles(&self) -> ApiResult<'_, Vec<SpeedProfileSummary>> {
        Box::pin(async move { self.get("traffic_flow/list", &[]).await })
    }

    fn speed_profile(&self, id: String) -> ApiResult<'_, SpeedProfile> {
        Box::pin(async move { self.get(&format!("traffic_flow/{id}"), &[]).await })
    }

    fn delete_speed_profile(&self, id: String) -> ApiResult<'_, SpeedProfile> {
        Box::pin(async move {
            self.send_json::<(), _>(Method::DELETE, &format!("traffic_flow/{id}"), None)
                .await
        })
    }

    fn generate_clustering(
        &self,
        request: GenerateClusteringRequest,
    ) -> ApiResult<'_, Vec<ProfileTemplate>> {
        Box::pin(async move {
            self.send_json(Method::POST, "stops_clustering/generate", Some(&request))
                .await
        })
    }

    fn realize_clustering(&self, template: ProfileTemplate) -> ApiResult<'_, ClusteringProfile> {
        Box::pin(async move {
            self.send_json(Method::POST, "stops_clustering/realize", Some(&template))
                .await
        })
    }

    fn clustering_profiles(&self) -> ApiResult<'_, Vec<ClusteringProfile>> {
        Box::pin(async move { self.get("stops_clustering/list", &[]).await })
    }

    fn clustering_data_list(&self) -> ApiResult<'_, Vec<ClusteringData>> {
        Box::pin(async move { self.get("stops_clustering/data/list", &[]).await })
    }

    fn upload_clustering_data(&self, name: String, file: UploadFile) -> ApiResult<'_, ClusteringData> {
        Box::pin(async move {
            let form = Form::new()
                .part("clustering_data_file", file_part(file))
                .text("name", name);
            self.post_form("stops_clustering/data", form).await
        })
    }

    fn apply_clustering(
        &self,
        profile_id: String,
        stop_ids: Vec<String>,
    ) -> ApiResult<'_, ApplyClusteringResponse> {
        Box::pin(async move {
            self.send_json(
                Method::POST,
                &format!("stops_clustering/{profile_id}"),
                Some(&stop_ids),
            )
            .await
        })
    }

    fn delete_clustering_profile(&self, id: String) -> ApiResult<'_, ClusteringProfile> {
        Box::pin(async move {
            self.send_json::<(), _>(Method::DELETE, &format!("stops_clustering/{id}"), None)
                .await
        })
    }
}
