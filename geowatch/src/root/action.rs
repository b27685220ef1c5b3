//! Root store actions
//!
//! Variant prefixes give the inferred category: `Session*` actions are
//! `session`, `SystemStatus*` actions are `system_status`. The category is
//! written to every dispatch log record.

use super::state::{SystemStatus, User};

#[derive(geowatch::Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum RootAction {
    // ===== Session =====
    SessionSetLoading(bool),

    /// `None` clears the error
    SessionSetError(Option<String>),

    SessionClearError,

    /// `None` signs the user out
    SessionSetUser(Option<User>),

    // ===== Backend health =====
    SystemStatusSet(SystemStatus),
}
