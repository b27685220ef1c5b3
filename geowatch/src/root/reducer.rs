//! Root reducer
//!
//! Every arm reports a change only when the value actually differs, so
//! subscribers are not woken by repeated identical writes.

use super::action::RootAction;
use super::state::RootState;

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

pub fn reducer(state: &mut RootState, action: RootAction) -> bool {
    match action {
        RootAction::SessionSetLoading(loading) => replace(&mut state.is_loading, loading),
        RootAction::SessionSetError(error) => replace(&mut state.error, error),
        RootAction::SessionClearError => state.error.take().is_some(),
        RootAction::SessionSetUser(user) => replace(&mut state.user, user),
        RootAction::SystemStatusSet(status) => replace(&mut state.system_status, status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::root::state::{SystemStatus, User};

    fn operator() -> User {
        User {
            id: "u1".into(),
            name: "Ops".into(),
            email: None,
        }
    }

    #[test]
    fn test_set_loading_reports_change_once() {
        let mut state = RootState::default();

        assert!(reducer(&mut state, RootAction::SessionSetLoading(true)));
        assert!(state.is_loading);
        assert!(!reducer(&mut state, RootAction::SessionSetLoading(true)));
    }

    #[test]
    fn test_error_set_and_clear() {
        let mut state = RootState::default();

        reducer(&mut state, RootAction::SessionSetError(Some("quota exceeded".into())));
        assert_eq!(state.error.as_deref(), Some("quota exceeded"));

        assert!(reducer(&mut state, RootAction::SessionClearError));
        assert_eq!(state.error, None);
        assert!(!reducer(&mut state, RootAction::SessionClearError));
    }

    #[test]
    fn test_user_sign_in_and_out() {
        let mut state = RootState::default();

        assert!(reducer(&mut state, RootAction::SessionSetUser(Some(operator()))));
        assert_eq!(state.user, Some(operator()));

        assert!(reducer(&mut state, RootAction::SessionSetUser(None)));
        assert_eq!(state.user, None);
    }

    #[test]
    fn test_system_status() {
        let mut state = RootState::default();
        assert_eq!(state.system_status, SystemStatus::Operational);

        assert!(!reducer(&mut state, RootAction::SystemStatusSet(SystemStatus::Operational)));
        assert!(reducer(&mut state, RootAction::SystemStatusSet(SystemStatus::Degraded)));
        assert_eq!(state.system_status.as_str(), "degraded");
    }

    #[test]
    fn test_system_status_raw_spelling_is_not_a_change() {
        let mut state = RootState::default();

        let raw = SystemStatus::Other("operational".into());
        assert!(!reducer(&mut state, RootAction::SystemStatusSet(raw)));
        assert!(reducer(&mut state, RootAction::SystemStatusSet(SystemStatus::Other("maintenance".into()))));
        assert!(!reducer(&mut state, RootAction::SystemStatusSet("maintenance".into())));
    }
}
