//! Root aggregate store
//!
//! Owns the four resource namespaces and a small store of its own for
//! session-level state. The namespaces are reached through accessors; the
//! root never copies their data.

pub mod action;
pub mod reducer;
pub mod state;

use std::sync::{Mutex, MutexGuard, PoisonError};

use reqwest::Client;
use tokio::sync::watch;

pub use action::RootAction;
pub use reducer::reducer;
pub use state::{RootState, SystemStatus, User};

use crate::alerts::{alerts_store, AlertsStore};
use crate::aoi::{aoi_store, AoiStore};
use crate::config::ApiConfig;
use crate::detection::{detection_store, DetectionStore};
use crate::http::http_client;
use crate::imagery::{imagery_store, ImageryStore};
use crate::{LoggingMiddleware, Store, TransportError};

type Inner = Store<RootState, RootAction, LoggingMiddleware>;

/// The application's single state tree
///
/// Constructed once at startup and passed to whatever renders it.
///
/// # Example
/// ```ignore
/// let app = AppStore::new(&ApiConfig::from_env()?)?;
/// app.aoi().fetch_all().await;
/// app.set_system_status(SystemStatus::Degraded);
/// ```
pub struct AppStore {
    inner: Mutex<Inner>,
    revision: watch::Sender<u64>,
    aoi: AoiStore,
    imagery: ImageryStore,
    detection: DetectionStore,
    alerts: AlertsStore,
}

impl AppStore {
    /// Build the HTTP client from `config` and every namespace on top of it
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let client = http_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Build every namespace on a caller-provided client
    pub fn with_client(client: Client, config: &ApiConfig) -> Self {
        tracing::info!(base_url = config.base_url(), "Creating app store");
        let (revision, _) = watch::channel(0);
        Self {
            inner: Mutex::new(Store::with_middleware(
                RootState::default(),
                reducer,
                LoggingMiddleware::new("root"),
            )),
            revision,
            aoi: aoi_store(client.clone(), config),
            imagery: imagery_store(client.clone(), config),
            detection: detection_store(client.clone(), config),
            alerts: alerts_store(client, config),
        }
    }

    pub fn aoi(&self) -> &AoiStore {
        &self.aoi
    }

    pub fn imagery(&self) -> &ImageryStore {
        &self.imagery
    }

    pub fn detection(&self) -> &DetectionStore {
        &self.detection
    }

    pub fn alerts(&self) -> &AlertsStore {
        &self.alerts
    }

    /// Snapshot of the root state
    pub fn state(&self) -> RootState {
        self.lock().state().clone()
    }

    /// Revision counter bumped on every root state change
    ///
    /// Namespaces have their own `subscribe`.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn set_loading(&self, loading: bool) {
        self.dispatch(RootAction::SessionSetLoading(loading));
    }

    pub fn set_error(&self, error: Option<String>) {
        self.dispatch(RootAction::SessionSetError(error));
    }

    pub fn clear_error(&self) {
        self.dispatch(RootAction::SessionClearError);
    }

    pub fn set_user(&self, user: Option<User>) {
        self.dispatch(RootAction::SessionSetUser(user));
    }

    pub fn set_system_status(&self, status: SystemStatus) {
        self.dispatch(RootAction::SystemStatusSet(status));
    }

    /// Dispatch a root action; returns whether the state changed
    pub fn dispatch(&self, action: RootAction) -> bool {
        let changed = self.lock().dispatch(action);
        if changed {
            self.revision.send_modify(|revision| *revision += 1);
        }
        changed
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
