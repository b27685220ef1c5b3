//! geowatch: client-side state for a satellite change-detection backend
//!
//! Keeps local mirrors of the backend's areas of interest, imagery,
//! detection jobs and alerts. All state changes go through dispatched
//! actions; remote calls are two-phase (intent, then result) and may overlap.
//!
//! # Example
//! ```ignore
//! use geowatch::prelude::*;
//!
//! let app = AppStore::new(&ApiConfig::from_env()?)?;
//!
//! app.aoi().fetch_all().await;
//! let active = app.aoi().read(|aois| aois.active_aois().len());
//!
//! let job = app
//!     .detection()
//!     .create(&NewDetectionJob::new("aoi-1", "2024-01-01", "2024-06-01"))
//!     .await?;
//! let results = app.detection().fetch_results(&job.id).await?;
//! ```

// Lets `#[derive(Action)]` expand to `::geowatch::...` inside this crate too
extern crate self as geowatch;

// Re-export everything from core
pub use geowatch_core::*;

// Re-export derive macros
pub use geowatch_macros::Action;

pub mod alerts;
pub mod aoi;
pub mod config;
pub mod detection;
pub mod http;
pub mod imagery;
pub mod root;
mod schema;

pub use schema::Extra;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use geowatch_core::{Action, ActionCategory, Entity, RemoteResource};

    // Stores
    pub use geowatch_core::{Operation, OperationError, ResourceState, ResourceStore, TransportError};
    pub use crate::root::{AppStore, RootState, SystemStatus, User};

    // Namespaces
    pub use crate::alerts::{Alert, AlertRule, AlertStatus, AlertViews, AlertsStore, NewAlertRule, RuleViews};
    pub use crate::aoi::{Aoi, AoiStore, AoiViews, MonitoringFrequency, NewAoi};
    pub use crate::detection::{
        DetectionJob, DetectionResult, DetectionStore, JobStatus, JobViews, NewDetectionJob,
    };
    pub use crate::imagery::{Imagery, ImageryStore, ImageryViews, ProcessingStatus};

    // Config
    pub use crate::config::ApiConfig;
}
