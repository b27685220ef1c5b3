//! Tests for #[derive(Action)] macro

#![allow(dead_code)]

use geowatch::root::{RootAction, SystemStatus};
use geowatch::{Action, ActionCategory};

#[test]
fn test_name_for_every_variant_style() {
    #[derive(geowatch::Action, Clone, Debug)]
    enum Plain {
        Refresh,
        Load(u32),
        Rename { id: u32, name: String },
    }

    assert_eq!(Plain::Refresh.name(), "Refresh");
    assert_eq!(Plain::Load(1).name(), "Load");
    assert_eq!(
        Plain::Rename {
            id: 1,
            name: "x".into()
        }
        .name(),
        "Rename"
    );
}

#[test]
fn test_inferred_categories() {
    #[derive(geowatch::Action, Clone, Debug)]
    #[action(infer_categories)]
    enum SyncAction {
        AoiFetch,
        DidFail(String),
        AlertRuleDelete(String),
        ClearError,
    }

    assert_eq!(SyncAction::AoiFetch.category(), Some("aoi"));
    assert_eq!(SyncAction::AlertRuleDelete("r1".into()).category(), Some("alert_rule"));
    assert_eq!(SyncAction::DidFail("x".into()).category(), Some("async_result"));
    assert_eq!(SyncAction::ClearError.category(), None);

    assert!(SyncAction::AoiFetch.is_aoi());
    assert!(!SyncAction::ClearError.is_aoi());
    assert!(SyncAction::DidFail("x".into()).is_async_result());
}

#[test]
fn test_explicit_and_skipped_categories() {
    #[derive(geowatch::Action, Clone, Debug)]
    #[action(infer_categories)]
    enum Session {
        #[action(category = "session")]
        Logout,
        #[action(skip_category)]
        SessionSetUser(String),
    }

    assert_eq!(Session::Logout.category(), Some("session"));
    assert!(Session::Logout.is_session());
    assert_eq!(Session::SessionSetUser("u".into()).category(), None);
    assert!(!Session::SessionSetUser("u".into()).is_session());
}

#[test]
fn test_generic_enum() {
    #[derive(geowatch::Action, Clone, Debug)]
    #[action(infer_categories)]
    enum Collection<T: Clone + std::fmt::Debug + Send + 'static> {
        ItemsSet(Vec<T>),
        ItemsClear,
    }

    let action = Collection::ItemsSet(vec![1u8]);
    assert_eq!(action.name(), "ItemsSet");
    assert!(action.is_items());
    assert!(Collection::<u8>::ItemsClear.is_items());
}

#[test]
fn test_root_actions() {
    let set_user = RootAction::SessionSetUser(None);
    let status = RootAction::SystemStatusSet(SystemStatus::Degraded);

    assert_eq!(set_user.name(), "SessionSetUser");
    assert!(set_user.is_session());
    assert!(RootAction::SessionClearError.is_session());
    assert_eq!(status.category(), Some("system_status"));
    assert!(status.is_system_status());
}
