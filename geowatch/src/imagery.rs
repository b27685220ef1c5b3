//! Satellite imagery metadata

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::http::HttpResource;
use crate::schema::{open_enum, Extra};
use crate::{Entity, ResourceState, ResourceStore};

pub const IMAGERY_PATH: &str = "imagery";

open_enum! {
    pub enum ProcessingStatus {
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
    }
}

impl Default for ProcessingStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// One acquired scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Imagery {
    pub id: String,
    pub name: String,
    /// e.g. "Landsat-8", "Sentinel-2"
    #[serde(default)]
    pub satellite: String,
    pub sensor: Option<String>,
    pub acquisition_date: Option<String>,
    /// GeoJSON footprint
    pub footprint: Option<serde_json::Value>,
    /// Percentage, 0-100
    #[serde(default)]
    pub cloud_coverage: f64,
    pub resolution_meters: Option<f64>,
    #[serde(default)]
    pub bands_available: Vec<String>,
    pub format: Option<String>,
    #[serde(default)]
    pub is_processed: bool,
    #[serde(default)]
    pub processing_status: ProcessingStatus,
    /// 0-1 quality assessment
    pub quality_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Entity for Imagery {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

/// Metadata registered for a scene uploaded out of band
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewImagery {
    pub name: String,
    pub satellite: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor: Option<String>,
    pub acquisition_date: String,
    pub footprint: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

pub type HttpImagery = HttpResource<Imagery, NewImagery>;

/// The `imagery` namespace
pub type ImageryStore<R = HttpImagery> = ResourceStore<R>;

pub fn imagery_store(client: Client, config: &ApiConfig) -> ImageryStore {
    ResourceStore::new("imagery", HttpResource::new(client, config, IMAGERY_PATH))
}

/// Derived views over the imagery collection
pub trait ImageryViews {
    fn processed_imagery(&self) -> Vec<&Imagery>;
    /// Scenes whose cloud coverage does not exceed `max_percent`
    fn imagery_below_cloud(&self, max_percent: f64) -> Vec<&Imagery>;
}

impl ImageryViews for ResourceState<Imagery> {
    fn processed_imagery(&self) -> Vec<&Imagery> {
        self.iter().filter(|image| image.is_processed).collect()
    }

    fn imagery_below_cloud(&self, max_percent: f64) -> Vec<&Imagery> {
        self.iter()
            .filter(|image| image.cloud_coverage <= max_percent)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_backend_document() {
        let image: Imagery = serde_json::from_value(json!({
            "id": "img-1",
            "name": "S2A_20240101",
            "satellite": "Sentinel-2",
            "sensor": "MSI",
            "cloud_coverage": 12.5,
            "bands_available": ["B04", "B08"],
            "processing_status": "completed",
            "is_processed": true,
            "file_size_mb": 812.4,
        }))
        .unwrap();

        assert_eq!(image.processing_status, ProcessingStatus::Completed);
        assert_eq!(image.bands_available, vec!["B04", "B08"]);
        assert_eq!(image.extra["file_size_mb"], 812.4);
    }

    #[test]
    fn test_views() {
        let images: Vec<Imagery> = serde_json::from_value(json!([
            {"id": "i1", "name": "clear", "cloud_coverage": 4.0, "is_processed": true},
            {"id": "i2", "name": "hazy", "cloud_coverage": 20.0, "is_processed": true},
            {"id": "i3", "name": "raw", "cloud_coverage": 10.0},
        ]))
        .unwrap();
        let mut state = ResourceState::default();
        crate::resource::reducer(&mut state, crate::ResourceAction::DidFetchAll(images));

        assert_eq!(state.processed_imagery().len(), 2);
        let clear: Vec<&str> = state
            .imagery_below_cloud(10.0)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(clear, vec!["i1", "i3"]);
    }
}
