//! Alerts raised by detection runs, and the rules that raise them
//!
//! The namespace holds two independent resource stores. Each has its own
//! loading flag and error; [`AlertsStore::is_loading`] and
//! [`AlertsStore::clear_error`] cover both.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::http::HttpResource;
use crate::schema::{open_enum, Extra};
use crate::{Entity, OperationError, RemoteResource, ResourceState, ResourceStore};

pub const ALERTS_PATH: &str = "alerts";
pub const ALERT_RULES_PATH: &str = "alerts/rules";

open_enum! {
    pub enum AlertStatus {
        Active => "active",
        Acknowledged => "acknowledged",
        Resolved => "resolved",
    }
}

impl Default for AlertStatus {
    fn default() -> Self {
        Self::Active
    }
}

open_enum! {
    pub enum Severity {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub aoi_id: Option<String>,
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: AlertStatus,
    pub severity: Option<Severity>,
    pub message: Option<String>,
    pub change_percentage: Option<f64>,
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Entity for Alert {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub aoi_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub message: String,
}

fn default_true() -> bool {
    true
}

/// Condition under which an AOI raises alerts, and where they are sent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    pub aoi_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub change_threshold: Option<f64>,
    /// Delivery channels such as "email" or "webhook"
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Entity for AlertRule {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewAlertRule {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aoi_id: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_threshold: Option<f64>,
    pub channels: Vec<String>,
}

impl NewAlertRule {
    /// Active rule with no AOI filter and no channels
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aoi_id: None,
            is_active: true,
            change_threshold: None,
            channels: Vec::new(),
        }
    }

    pub fn for_aoi(mut self, aoi_id: impl Into<String>) -> Self {
        self.aoi_id = Some(aoi_id.into());
        self
    }

    pub fn threshold(mut self, change_threshold: f64) -> Self {
        self.change_threshold = Some(change_threshold);
        self
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channels.push(channel.into());
        self
    }
}

pub type HttpAlerts = HttpResource<Alert, NewAlert>;
pub type HttpAlertRules = HttpResource<AlertRule, NewAlertRule>;

/// The `alerts` namespace
pub struct AlertsStore<A = HttpAlerts, R = HttpAlertRules>
where
    A: RemoteResource<Entity = Alert, Draft = NewAlert>,
    R: RemoteResource<Entity = AlertRule, Draft = NewAlertRule>,
{
    alerts: ResourceStore<A>,
    rules: ResourceStore<R>,
}

impl<A, R> AlertsStore<A, R>
where
    A: RemoteResource<Entity = Alert, Draft = NewAlert>,
    R: RemoteResource<Entity = AlertRule, Draft = NewAlertRule>,
{
    pub fn new(alerts: A, rules: R) -> Self {
        Self {
            alerts: ResourceStore::new("alerts", alerts),
            rules: ResourceStore::new("alert_rules", rules),
        }
    }

    pub fn alerts(&self) -> &ResourceStore<A> {
        &self.alerts
    }

    pub fn rules(&self) -> &ResourceStore<R> {
        &self.rules
    }

    /// True while an operation on either store is outstanding
    pub fn is_loading(&self) -> bool {
        self.alerts.read(ResourceState::is_loading) || self.rules.read(ResourceState::is_loading)
    }

    pub fn clear_error(&self) {
        self.alerts.clear_error();
        self.rules.clear_error();
    }

    /// Mark an alert acknowledged on the backend
    pub async fn acknowledge(&self, alert: &Alert) -> Result<Alert, OperationError> {
        self.set_status(alert, AlertStatus::Acknowledged).await
    }

    /// Mark an alert resolved on the backend
    pub async fn resolve(&self, alert: &Alert) -> Result<Alert, OperationError> {
        self.set_status(alert, AlertStatus::Resolved).await
    }

    async fn set_status(&self, alert: &Alert, status: AlertStatus) -> Result<Alert, OperationError> {
        let changed = Alert {
            status,
            ..alert.clone()
        };
        self.alerts.update(&changed).await
    }
}

pub fn alerts_store(client: Client, config: &ApiConfig) -> AlertsStore {
    AlertsStore::new(
        HttpResource::new(client.clone(), config, ALERTS_PATH),
        HttpResource::new(client, config, ALERT_RULES_PATH),
    )
}

pub trait AlertViews {
    fn active_alerts(&self) -> Vec<&Alert>;
}

impl AlertViews for ResourceState<Alert> {
    fn active_alerts(&self) -> Vec<&Alert> {
        self.iter()
            .filter(|alert| alert.status == AlertStatus::Active)
            .collect()
    }
}

pub trait RuleViews {
    fn active_rules(&self) -> Vec<&AlertRule>;
}

impl RuleViews for ResourceState<AlertRule> {
    fn active_rules(&self) -> Vec<&AlertRule> {
        self.iter().filter(|rule| rule.is_active).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransportError;
    use geowatch_core::testing::{Call, MockRemote};
    use serde_json::json;

    type TestAlerts = AlertsStore<MockRemote<Alert, NewAlert>, MockRemote<AlertRule, NewAlertRule>>;

    fn stores() -> (
        TestAlerts,
        MockRemote<Alert, NewAlert>,
        MockRemote<AlertRule, NewAlertRule>,
    ) {
        let alerts = MockRemote::new();
        let rules = MockRemote::new();
        (
            AlertsStore::new(alerts.clone(), rules.clone()),
            alerts,
            rules,
        )
    }

    fn alert(id: &str, status: &str) -> Alert {
        serde_json::from_value(json!({"id": id, "aoi_id": "a1", "status": status})).unwrap()
    }

    fn rule(id: &str, is_active: bool) -> AlertRule {
        serde_json::from_value(json!({"id": id, "name": id, "is_active": is_active})).unwrap()
    }

    #[tokio::test]
    async fn test_acknowledge_replaces_alert() {
        let (store, alerts, _rules) = stores();
        let raised = alert("al-1", "active");
        alerts.reply_list(Ok(vec![raised.clone(), alert("al-2", "active")]));
        alerts.reply_update(Ok(alert("al-1", "acknowledged")));

        store.alerts().fetch_all().await;
        let acked = store.acknowledge(&raised).await.unwrap();

        assert_eq!(acked.status, AlertStatus::Acknowledged);
        assert_eq!(alerts.calls()[1], Call::Update("al-1".into()));
        store.alerts().read(|state| {
            assert_eq!(state.items()[0].status, AlertStatus::Acknowledged);
            assert_eq!(state.active_alerts().len(), 1);
        });
    }

    #[tokio::test]
    async fn test_stores_track_errors_separately() {
        let (store, alerts, rules) = stores();
        alerts.reply_list(Err(TransportError::Network("offline".into())));
        rules.reply_list(Ok(vec![rule("r1", true), rule("r2", false)]));

        store.alerts().fetch_all().await;
        store.rules().fetch_all().await;

        assert_eq!(store.alerts().state().error(), Some("offline"));
        assert_eq!(store.rules().state().error(), None);
        assert_eq!(store.rules().read(|s| s.active_rules().len()), 1);

        store.clear_error();
        assert_eq!(store.alerts().state().error(), None);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_rule_crud() {
        let (store, _alerts, rules) = stores();
        rules
            .reply_create(Ok(rule("r1", true)))
            .reply_update(Ok(rule("r1", false)))
            .reply_delete(Ok(()));
        let draft = NewAlertRule::new("r1").for_aoi("a1").channel("email");

        let created = store.rules().create(&draft).await.unwrap();
        store.rules().update(&created).await.unwrap();
        assert!(store.rules().read(|s| s.active_rules().is_empty()));
        store.rules().delete(&created.id).await.unwrap();

        assert!(store.rules().state().is_empty());
        assert_eq!(
            rules.calls()[0],
            Call::Create(json!({
                "name": "r1",
                "aoi_id": "a1",
                "is_active": true,
                "channels": ["email"],
            }))
        );
    }

    #[test]
    fn test_unknown_severity_kept() {
        let alert: Alert = serde_json::from_value(json!({
            "id": "al-1",
            "severity": "extreme",
        }))
        .unwrap();

        assert_eq!(alert.status, AlertStatus::Active);
        assert_eq!(alert.severity, Some(Severity::Other("extreme".into())));
    }
}
