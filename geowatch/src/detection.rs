//! Change detection jobs and their results
//!
//! Jobs are an ordinary resource collection. Results are fetched on demand
//! from `detection/jobs/{id}/results` and held next to the collection: a
//! results fetch counts as in flight on the job store, so its loading flag
//! and error cover both.

use std::future::Future;
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::http::HttpResource;
use crate::schema::{open_enum, Extra};
use crate::{
    Entity, Operation, OperationError, RemoteResource, ResourceState, ResourceStore,
    TransportError,
};

pub const DETECTION_JOBS_PATH: &str = "detection/jobs";

const RESULTS_PATH: &str = "results";

open_enum! {
    pub enum JobStatus {
        Queued => "queued",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Queued
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionJob {
    pub id: String,
    pub aoi_id: String,
    #[serde(default)]
    pub status: JobStatus,
    pub before_date: Option<String>,
    pub after_date: Option<String>,
    pub created_at: Option<String>,
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Entity for DetectionJob {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

/// Request for a new detection run between two acquisition dates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewDetectionJob {
    pub aoi_id: String,
    pub before_date: String,
    pub after_date: String,
    /// Local scene paths; the backend picks scenes itself when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_image_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_image_path: Option<String>,
}

impl NewDetectionJob {
    pub fn new(
        aoi_id: impl Into<String>,
        before_date: impl Into<String>,
        after_date: impl Into<String>,
    ) -> Self {
        Self {
            aoi_id: aoi_id.into(),
            before_date: before_date.into(),
            after_date: after_date.into(),
            before_image_path: None,
            after_image_path: None,
        }
    }

    pub fn images(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.before_image_path = Some(before.into());
        self.after_image_path = Some(after.into());
        self
    }
}

/// Outcome of one detection run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub id: Option<String>,
    pub job_id: Option<String>,
    /// Percentage of the AOI classified as changed
    pub change_percentage: Option<f64>,
    pub ndvi_before_mean: Option<f64>,
    pub ndvi_after_mean: Option<f64>,
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Remote client for detection jobs, with the nested results endpoint
pub trait DetectionRemote: RemoteResource<Entity = DetectionJob, Draft = NewDetectionJob> {
    fn results(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<Vec<DetectionResult>, TransportError>> + Send;
}

pub type HttpJobs = HttpResource<DetectionJob, NewDetectionJob>;

impl DetectionRemote for HttpJobs {
    fn results(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<Vec<DetectionResult>, TransportError>> + Send {
        self.get_json(self.item_url(&job_id, Some(RESULTS_PATH)))
    }
}

/// The `detection` namespace
///
/// Derefs to the job [`ResourceStore`], so the collection operations are
/// called on it directly.
pub struct DetectionStore<R: DetectionRemote = HttpJobs> {
    jobs: ResourceStore<R>,
    results: Mutex<Vec<DetectionResult>>,
}

impl<R: DetectionRemote> DetectionStore<R> {
    pub fn new(remote: R) -> Self {
        Self {
            jobs: ResourceStore::new("detection", remote),
            results: Mutex::new(Vec::new()),
        }
    }

    pub fn jobs(&self) -> &ResourceStore<R> {
        &self.jobs
    }

    /// Results of the most recent successful [`fetch_results`](Self::fetch_results)
    pub fn results(&self) -> Vec<DetectionResult> {
        self.lock_results().clone()
    }

    /// Load the results of one job, replacing the held results
    ///
    /// On failure the previously held results are kept.
    pub async fn fetch_results(&self, job_id: &str) -> Result<Vec<DetectionResult>, OperationError> {
        let call = self.jobs.remote().results(job_id);
        self.jobs
            .track(Operation::Nested("fetch_results"), call, |results| {
                tracing::debug!(job_id, count = results.len(), "Received detection results");
                *self.lock_results() = results.clone();
            })
            .await
    }

    fn lock_results(&self) -> MutexGuard<'_, Vec<DetectionResult>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: DetectionRemote> Deref for DetectionStore<R> {
    type Target = ResourceStore<R>;

    fn deref(&self) -> &Self::Target {
        &self.jobs
    }
}

pub fn detection_store(client: Client, config: &ApiConfig) -> DetectionStore {
    DetectionStore::new(HttpResource::new(client, config, DETECTION_JOBS_PATH))
}

/// Derived views over the job collection
pub trait JobViews {
    fn running_jobs(&self) -> Vec<&DetectionJob>;
    fn completed_jobs(&self) -> Vec<&DetectionJob>;
    fn jobs_for_aoi(&self, aoi_id: &str) -> Vec<&DetectionJob>;
}

impl JobViews for ResourceState<DetectionJob> {
    fn running_jobs(&self) -> Vec<&DetectionJob> {
        self.iter()
            .filter(|job| job.status == JobStatus::Running)
            .collect()
    }

    fn completed_jobs(&self) -> Vec<&DetectionJob> {
        self.iter()
            .filter(|job| job.status == JobStatus::Completed)
            .collect()
    }

    fn jobs_for_aoi(&self, aoi_id: &str) -> Vec<&DetectionJob> {
        self.iter().filter(|job| job.aoi_id == aoi_id).collect()
    }
}
