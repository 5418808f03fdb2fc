pub mod actions;
pub mod config;
pub mod feature_layer;
pub mod forms;
pub mod map_controller;
pub mod panel;
pub mod sync;
pub mod viewport;

#[cfg(test)]
pub(crate) mod fixtures;

pub use map_controller::{FeatureLayerKind, MapController, MapFrame, MapSummary};
pub use sync::ViewSync;
pub use viewport::Viewport;
