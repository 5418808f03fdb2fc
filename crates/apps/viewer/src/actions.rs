//! Request and edit flows shared by the CLI and the forms.
//!
//! Every flow that reaches the backend follows the same banner contract: a
//! `Loading` message before the call, then either a `Result` message, a cleared
//! banner, or an `Error` banner carrying the failure text.

use std::future::Future;

use api::backend::Backend;
use api::error::ApiError;
use model::bbox::BoundingBox;
use model::entity::MapEntity;
use model::source::Source;
use store::app_store::AppStore;
use store::state::{FetchStatus, Mode};
use tracing::{info, warn};

/// Failure of a user-triggered flow.
#[derive(Debug)]
pub enum ActionError {
    /// A fetch was requested before a working area was drawn.
    NoBoundingBox,
    /// The flow needs a selected entity (or an open profile) of a specific kind.
    NothingSelected,
    UnknownProfile(String),
    /// The backend answered with an empty list where one item was expected.
    EmptyResponse(&'static str),
    Api(ApiError),
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::NoBoundingBox => write!(f, "Working area is not defined"),
            ActionError::NothingSelected => write!(f, "Nothing is selected"),
            ActionError::UnknownProfile(id) => write!(f, "Unknown profile: {id}"),
            ActionError::EmptyResponse(what) => write!(f, "Server returned no {what}"),
            ActionError::Api(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ActionError::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ApiError> for ActionError {
    fn from(e: ApiError) -> Self {
        ActionError::Api(e)
    }
}

/// Puts `err` on the banner and hands it back.
pub(crate) fn fail(store: &mut AppStore, err: ActionError) -> ActionError {
    warn!("action failed: {err}");
    store.set_fetch_info(FetchStatus::Error, err.to_string());
    err
}

/// Shows `loading`, awaits `call`, and surfaces a failure on the banner.
/// On success the `Loading` banner stays until the caller finishes.
pub(crate) async fn request<T, F>(
    store: &mut AppStore,
    loading: &str,
    call: F,
) -> Result<T, ActionError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    store.set_fetch_info(FetchStatus::Loading, loading);
    match call.await {
        Ok(value) => Ok(value),
        Err(e) => Err(fail(store, e.into())),
    }
}

pub(crate) fn finish(store: &mut AppStore, result_message: Option<&str>) {
    match result_message {
        Some(message) => store.set_fetch_info(FetchStatus::Result, message),
        None => store.clear_fetch_info(),
    }
}

/// Working area or an `Error` banner; no network call is made without one.
pub(crate) fn require_bbox(store: &mut AppStore) -> Result<BoundingBox, ActionError> {
    store
        .bbox()
        .ok_or_else(|| fail(store, ActionError::NoBoundingBox))
}

fn selected(store: &AppStore) -> Option<MapEntity> {
    store.selected_entity().map(|e| MapEntity::clone(e))
}

/// Fetches stops and routes of the current source inside the working area.
pub async fn fetch_bus_data(store: &mut AppStore, backend: &dyn Backend) -> Result<(), ActionError> {
    let bbox = require_bbox(store)?;
    let source = store.source();
    let data = request(
        store,
        "Fetching stops and routes...",
        backend.fetch_bus_data(source, bbox),
    )
    .await?;
    info!(
        "fetched {} stops and {} routes from {source}",
        data.stops.len(),
        data.routes.len()
    );
    store.set_stops_and_routes(data);
    finish(store, None);
    Ok(())
}

/// Toolbar switch: sets the mode and its source. Entering traffic mode with a
/// working area also loads the local routes into the traffic cache.
pub async fn switch_mode(
    store: &mut AppStore,
    backend: &dyn Backend,
    mode: Mode,
) -> Result<(), ActionError> {
    store.set_mode(mode);
    store.set_source(mode.default_source());
    if mode != Mode::TrafficFlow {
        return Ok(());
    }
    let Some(bbox) = store.bbox() else {
        return Ok(());
    };
    let data = request(
        store,
        "Fetching routes...",
        backend.fetch_bus_data(Source::Local, bbox),
    )
    .await?;
    store.set_traffic_routes(data.routes);
    finish(store, None);
    Ok(())
}

/// Pushes the selected stop to the local database and swaps it for the stored copy.
pub async fn sync_selected_stop(
    store: &mut AppStore,
    backend: &dyn Backend,
) -> Result<(), ActionError> {
    let Some(MapEntity::Stop(stop)) = selected(store) else {
        return Err(fail(store, ActionError::NothingSelected));
    };
    let created = request(
        store,
        "Synchronizing stop...",
        backend.create_stops(vec![stop.clone()]),
    )
    .await?;
    let Some(server) = created.first() else {
        return Err(fail(store, ActionError::EmptyResponse("stop")));
    };
    let synced = stop.synced_with(server);
    info!("stop {} synchronized as {}", stop.id, synced.id);
    store.replace_stop(&stop.id, synced.clone());
    store.set_selected_entity(MapEntity::Stop(synced));
    finish(store, Some("Stop synchronized"));
    Ok(())
}

pub async fn sync_selected_route(
    store: &mut AppStore,
    backend: &dyn Backend,
) -> Result<(), ActionError> {
    let Some(MapEntity::Route(route)) = selected(store) else {
        return Err(fail(store, ActionError::NothingSelected));
    };
    let created = request(
        store,
        "Synchronizing route...",
        backend.create_routes(vec![route.clone()]),
    )
    .await?;
    let Some(synced) = created.into_iter().next() else {
        return Err(fail(store, ActionError::EmptyResponse("route")));
    };
    info!("route {} synchronized as {}", route.id, synced.id);
    store.replace_route(&route.id, synced.clone());
    store.set_selected_entity(MapEntity::Route(synced));
    finish(store, Some("Route synchronized"));
    Ok(())
}

/// Deletes the local copy of the selected stop. The stop stays in the list,
/// reverted to its external record, and the selection is cleared.
pub async fn delete_selected_stop(
    store: &mut AppStore,
    backend: &dyn Backend,
) -> Result<(), ActionError> {
    let Some(MapEntity::Stop(stop)) = selected(store) else {
        return Err(fail(store, ActionError::NothingSelected));
    };
    request(
        store,
        "Deleting stop...",
        backend.delete_stops(vec![stop.id.clone()]),
    )
    .await?;
    store.replace_stop(&stop.id, stop.reverted());
    store.clear_selected_entity();
    finish(store, Some("Stop deleted"));
    Ok(())
}

pub async fn delete_selected_route(
    store: &mut AppStore,
    backend: &dyn Backend,
) -> Result<(), ActionError> {
    let Some(MapEntity::Route(route)) = selected(store) else {
        return Err(fail(store, ActionError::NothingSelected));
    };
    request(
        store,
        "Deleting route...",
        backend.delete_routes(vec![route.id.clone()]),
    )
    .await?;
    store.replace_route(&route.id, route.reverted());
    store.clear_selected_entity();
    finish(store, Some("Route deleted"));
    Ok(())
}

/// Drops the working area, every cache and the entity pointers.
pub fn clear_map(store: &mut AppStore) {
    store.clear_selected_entity();
    store.clear_highlighted_entity();
    store.clear_focused_entity();
    store.clear_map();
    store.set_bbox_drawing(false);
    store.clear_fetch_info();
}
