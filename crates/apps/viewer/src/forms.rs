use api::backend::{Backend, UploadFile};
use model::clustering::{
    ClusteringData, ClusteringParams, ClusteringProfile, GenerateClusteringRequest,
    ProfileTemplate,
};
use model::traffic::{
    CreateSpeedProfileRequest, SpeedData, SpeedProfile, SpeedProfileSummary, Weekday,
};
use store::app_store::AppStore;
use tracing::info;

use crate::actions::{ActionError, fail, finish, request, require_bbox};

/// Which page of a profile form is shown.
#[derive(Debug, Clone, PartialEq)]
pub enum FormView<P> {
    List,
    Open(P),
    Creating,
}

impl<P> Default for FormView<P> {
    fn default() -> Self {
        FormView::List
    }
}

impl<P> FormView<P> {
    pub fn is_list(&self) -> bool {
        matches!(self, FormView::List)
    }

    pub fn open(&self) -> Option<&P> {
        match self {
            FormView::Open(p) => Some(p),
            _ => None,
        }
    }
}

/// Speed-profile list, detail and creation pages.
#[derive(Debug, Default)]
pub struct SpeedProfileForm {
    pub profiles: Vec<SpeedProfileSummary>,
    pub speed_data: Vec<SpeedData>,
    pub view: FormView<SpeedProfile>,
}

impl SpeedProfileForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn back(&mut self) {
        self.view = FormView::List;
    }

    pub async fn refresh(
        &mut self,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<(), ActionError> {
        self.profiles = request(store, "Loading speed profiles...", backend.speed_profiles()).await?;
        finish(store, None);
        Ok(())
    }

    /// Loads the profile and its routes, then shows the flow of the store's
    /// current time bucket.
    pub async fn open(
        &mut self,
        id: &str,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<(), ActionError> {
        if !self.profiles.iter().any(|p| p.id == id) {
            return Err(fail(store, ActionError::UnknownProfile(id.to_string())));
        }
        let profile = request(
            store,
            "Loading speed profile...",
            backend.speed_profile(id.to_string()),
        )
        .await?;
        let routes = request(
            store,
            "Loading profile routes...",
            backend.routes_by_id(profile.route_ids()),
        )
        .await?;
        let time = store.traffic_flow();
        let flow = profile.flow_at(time.weekday, time.hour_interval);
        info!(
            "speed profile {} covers {} routes, {} with flow",
            profile.id,
            routes.len(),
            flow.len()
        );
        store.set_traffic_routes(routes);
        store.set_traffic_flow(flow);
        finish(store, None);
        self.view = FormView::Open(profile);
        Ok(())
    }

    /// Moves the store to another time bucket and re-derives the open profile's flow.
    pub fn set_time(&self, weekday: Weekday, hour_interval: u8, store: &mut AppStore) {
        let hour_interval = hour_interval % 24;
        store.set_traffic_time(weekday, hour_interval);
        if let Some(profile) = self.view.open() {
            store.set_traffic_flow(profile.flow_at(weekday, hour_interval));
        }
    }

    /// Creation page: local routes in the working area become the traffic routes.
    pub async fn start_creating(
        &mut self,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<(), ActionError> {
        let bbox = require_bbox(store)?;
        let routes = request(store, "Loading local routes...", backend.local_routes(bbox)).await?;
        store.set_traffic_routes(routes);
        self.speed_data = request(
            store,
            "Loading speed data...",
            backend.speed_data_list(),
        )
        .await?;
        finish(store, None);
        self.view = FormView::Creating;
        Ok(())
    }

    pub async fn upload_speed_data(
        &mut self,
        name: &str,
        files: Vec<UploadFile>,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<SpeedData, ActionError> {
        let data = request(
            store,
            "Uploading speed data...",
            backend.upload_speed_data(name.to_string(), files),
        )
        .await?;
        self.speed_data.push(data.clone());
        finish(store, Some("Speed data uploaded"));
        Ok(data)
    }

    /// Creates a profile over the traffic cache's routes.
    pub async fn create(
        &mut self,
        name: &str,
        speed_data_id: &str,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<(), ActionError> {
        let routes_ids = store
            .traffic_flow()
            .routes
            .iter()
            .map(|r| r.id.clone())
            .collect();
        let created = request(
            store,
            "Creating speed profile...",
            backend.create_speed_profile(CreateSpeedProfileRequest {
                name: name.to_string(),
                routes_ids,
                speed_data_id: speed_data_id.to_string(),
            }),
        )
        .await?;
        self.profiles.push(created.summary());
        self.view = FormView::List;
        finish(store, Some("Speed profile created"));
        Ok(())
    }

    /// Deletes the open profile and returns to the list.
    pub async fn delete_open(
        &mut self,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<(), ActionError> {
        let Some(id) = self.view.open().map(|p| p.id.clone()) else {
            return Err(fail(store, ActionError::NothingSelected));
        };
        request(
            store,
            "Deleting profile...",
            backend.delete_speed_profile(id.clone()),
        )
        .await?;
        self.profiles.retain(|p| p.id != id);
        self.view = FormView::List;
        finish(store, Some("Profile deleted"));
        Ok(())
    }
}

/// Clustering profile list, detail and creation pages.
#[derive(Debug, Default)]
pub struct ClusteringForm {
    pub profiles: Vec<ClusteringProfile>,
    pub data: Vec<ClusteringData>,
    pub templates: Vec<ProfileTemplate>,
    pub view: FormView<ClusteringProfile>,
}

impl ClusteringForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn back(&mut self) {
        self.view = FormView::List;
    }

    pub async fn refresh(
        &mut self,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<(), ActionError> {
        self.profiles = request(
            store,
            "Loading clustering profiles...",
            backend.clustering_profiles(),
        )
        .await?;
        finish(store, None);
        Ok(())
    }

    pub async fn start_creating(
        &mut self,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<(), ActionError> {
        self.data = request(
            store,
            "Loading clustering data...",
            backend.clustering_data_list(),
        )
        .await?;
        self.templates.clear();
        finish(store, None);
        self.view = FormView::Creating;
        Ok(())
    }

    pub async fn upload_data(
        &mut self,
        name: &str,
        file: UploadFile,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<ClusteringData, ActionError> {
        let data = request(
            store,
            "Uploading clustering data...",
            backend.upload_clustering_data(name.to_string(), file),
        )
        .await?;
        self.data.push(data.clone());
        finish(store, Some("Clustering data uploaded"));
        Ok(data)
    }

    /// Asks the backend for candidate templates over one data set.
    pub async fn generate(
        &mut self,
        name: &str,
        clustering_data_id: &str,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<&[ProfileTemplate], ActionError> {
        self.templates = request(
            store,
            "Generating clustering profiles...",
            backend.generate_clustering(GenerateClusteringRequest {
                name: name.to_string(),
                params: ClusteringParams::for_data(clustering_data_id),
            }),
        )
        .await?;
        finish(store, Some("Clustering profile variants generated"));
        Ok(&self.templates)
    }

    /// Stores the template at `index` as a profile and returns to the list.
    pub async fn realize(
        &mut self,
        index: usize,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<(), ActionError> {
        let Some(template) = self.templates.get(index).cloned() else {
            return Err(fail(
                store,
                ActionError::UnknownProfile(format!("template #{index}")),
            ));
        };
        let profile = request(
            store,
            "Creating clustering profile...",
            backend.realize_clustering(template),
        )
        .await?;
        self.profiles.push(profile);
        self.templates.clear();
        self.view = FormView::List;
        finish(store, Some("Clustering profile created"));
        Ok(())
    }

    /// Opens a profile; local stops in the working area become the reference stops.
    pub async fn open(
        &mut self,
        id: &str,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<(), ActionError> {
        let Some(profile) = self.profiles.iter().find(|p| p.id == id).cloned() else {
            return Err(fail(store, ActionError::UnknownProfile(id.to_string())));
        };
        let bbox = require_bbox(store)?;
        let stops = request(store, "Loading local stops...", backend.local_stops(bbox)).await?;
        store.set_clustered_reference_stops(Vec::new());
        store.set_reference_stops(stops);
        finish(store, None);
        self.view = FormView::Open(profile);
        Ok(())
    }

    /// Clusters the reference stops with the open profile. The cluster count is
    /// set before the clustered stops arrive.
    pub async fn apply(
        &mut self,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<(), ActionError> {
        let Some(profile) = self.view.open().cloned() else {
            return Err(fail(store, ActionError::NothingSelected));
        };
        store.set_clusters_count(profile.clusters_count);
        store.set_score(profile.clustering_score);
        let stop_ids = store
            .clustering()
            .reference_stops
            .iter()
            .map(|s| s.id.clone())
            .collect();
        let response = request(
            store,
            "Clustering stops...",
            backend.apply_clustering(profile.id.clone(), stop_ids),
        )
        .await?;
        info!(
            "profile {} clustered {} stops",
            profile.id,
            response.clustered_stops.len()
        );
        store.set_clustered_reference_stops(response.clustered_stops);
        finish(store, Some("Stops clustered"));
        Ok(())
    }

    pub async fn delete_open(
        &mut self,
        store: &mut AppStore,
        backend: &dyn Backend,
    ) -> Result<(), ActionError> {
        let Some(id) = self.view.open().map(|p| p.id.clone()) else {
            return Err(fail(store, ActionError::NothingSelected));
        };
        request(
            store,
            "Deleting profile...",
            backend.delete_clustering_profile(id.clone()),
        )
        .await?;
        self.profiles.retain(|p| p.id != id);
        self.view = FormView::List;
        finish(store, Some("Profile deleted"));
        Ok(())
    }
}
