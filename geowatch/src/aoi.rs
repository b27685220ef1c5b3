//! Areas of interest: user-defined regions tracked for change detection

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::http::HttpResource;
use crate::schema::{open_enum, Extra};
use crate::{Entity, ResourceState, ResourceStore};

/// Resource path below the API base URL
pub const AOI_PATH: &str = "aoi";

open_enum! {
    /// How often the backend re-checks an AOI
    pub enum MonitoringFrequency {
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
    }
}

impl Default for MonitoringFrequency {
    fn default() -> Self {
        Self::Weekly
    }
}

const DEFAULT_CHANGE_THRESHOLD: f64 = 0.15;

fn default_true() -> bool {
    true
}

fn default_change_threshold() -> f64 {
    DEFAULT_CHANGE_THRESHOLD
}

/// An area of interest as stored by the backend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aoi {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// GeoJSON polygon
    #[serde(default)]
    pub geometry: serde_json::Value,
    /// GeoJSON envelope computed by the backend
    pub bbox: Option<serde_json::Value>,
    pub area_hectares: Option<f64>,
    pub created_by: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub monitoring_frequency: MonitoringFrequency,
    /// Fraction of changed area (0-1) that raises an alert
    #[serde(default = "default_change_threshold")]
    pub change_threshold: f64,
    #[serde(default = "default_true")]
    pub alert_enabled: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub properties: Extra,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Entity for Aoi {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

/// Fields sent when creating an AOI
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewAoi {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_by: String,
    pub geometry: serde_json::Value,
    pub monitoring_frequency: MonitoringFrequency,
    pub change_threshold: f64,
    pub alert_enabled: bool,
}

impl NewAoi {
    /// Draft with the backend's default monitoring settings
    pub fn new(
        name: impl Into<String>,
        created_by: impl Into<String>,
        geometry: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            created_by: created_by.into(),
            geometry,
            monitoring_frequency: MonitoringFrequency::default(),
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            alert_enabled: true,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn monitoring(mut self, frequency: MonitoringFrequency, change_threshold: f64) -> Self {
        self.monitoring_frequency = frequency;
        self.change_threshold = change_threshold;
        self
    }
}

pub type HttpAois = HttpResource<Aoi, NewAoi>;

/// The `aoi` namespace
pub type AoiStore<R = HttpAois> = ResourceStore<R>;

pub fn aoi_store(client: Client, config: &ApiConfig) -> AoiStore {
    ResourceStore::new("aoi", HttpResource::new(client, config, AOI_PATH))
}

/// Derived views over the AOI collection
pub trait AoiViews {
    fn active_aois(&self) -> Vec<&Aoi>;
    fn aoi_count(&self) -> usize;
}

impl AoiViews for ResourceState<Aoi> {
    fn active_aois(&self) -> Vec<&Aoi> {
        self.iter().filter(|aoi| aoi.is_active).collect()
    }

    fn aoi_count(&self) -> usize {
        self.len()
    }
}
