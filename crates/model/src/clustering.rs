use serde::{Deserialize, Serialize};

use crate::stop::Stop;

/// Uploaded reference data for clustering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusteringData {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringAlgorithm {
    #[default]
    HdbscanKnn,
}

pub const DEFAULT_MIN_SCORE: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringParams {
    pub algorithm: ClusteringAlgorithm,
    pub clustering_data_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm_params: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_clusters_count: Option<u32>,
}

impl ClusteringParams {
    pub fn for_data(clustering_data_id: impl Into<String>) -> Self {
        Self {
            algorithm: ClusteringAlgorithm::HdbscanKnn,
            clustering_data_id: clustering_data_id.into(),
            algorithm_params: None,
            min_score: Some(DEFAULT_MIN_SCORE),
            max_clusters_count: None,
        }
    }
}

/// Body of `POST /stops_clustering/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateClusteringRequest {
    pub name: String,
    pub params: ClusteringParams,
}

/// Candidate returned by `generate`, not yet stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileTemplate {
    pub name: String,
    pub clustering_params: ClusteringParams,
    pub clusters_count: u32,
    pub clustering_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringProfile {
    pub id: String,
    pub name: String,
    pub clustering_params: ClusteringParams,
    pub clusters_count: u32,
    pub clustering_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteredStop {
    #[serde(flatten)]
    pub stop: Stop,
    pub cluster_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyClusteringResponse {
    pub clustered_stops: Vec<ClusteredStop>,
    #[serde(default)]
    pub clustered_correspondence: Vec<serde_json::Value>,
}

/// Clustering-mode cache.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StopsClusteringData {
    pub reference_stops: Vec<Stop>,
    pub clustered_reference_stops: Vec<ClusteredStop>,
    pub score: f64,
    pub clusters_count: u32,
}

#[cfg(test)]
mod tests {
    use super::{ApplyClusteringResponse, ClusteringParams, GenerateClusteringRequest};
    use crate::source::Source;
    use pretty_assertions::assert_eq;

    #[test]
    fn generate_request_matches_backend_shape() {
        let body = GenerateClusteringRequest {
            name: "morning".into(),
            params: ClusteringParams::for_data("cd1"),
        };
        let value = serde_json::to_value(&body).expect("json");
        assert_eq!(
            value,
            serde_json::json!({
                "name": "morning",
                "params": {
                    "algorithm": "hdbscan_knn",
                    "clustering_data_id": "cd1",
                    "min_score": 0.7
                }
            })
        );
    }

    #[test]
    fn clustered_stop_flattens_stop_fields() {
        let response: ApplyClusteringResponse = serde_json::from_str(
            r#"{"clustered_stops":[{"id":"s1","source":"local","name":"A","lon":37.0,"lat":55.0,"cluster_index":3}],
                "clustered_correspondence":[]}"#,
        )
        .expect("decode");
        let clustered = &response.clustered_stops[0];
        assert_eq!(clustered.cluster_index, 3);
        assert_eq!(clustered.stop.source, Source::Local);
        assert_eq!(clustered.stop.id, "s1");
    }
}
