//! Application-wide state owned by the root store
//!
//! Namespace data is not copied here; the root store only tracks
//! session-level flags, the signed-in user and the backend's health.

use serde::{Deserialize, Serialize};

use crate::schema::open_enum;

/// The signed-in operator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

open_enum! {
    /// Health reported for the processing backend
    pub enum SystemStatus {
        Operational => "operational",
        Degraded => "degraded",
        Maintenance => "maintenance",
    }
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self::Operational
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RootState {
    /// Application-level busy flag, independent of the namespaces' own
    pub is_loading: bool,

    /// Application-level error message
    pub error: Option<String>,

    /// None until a user is signed in
    pub user: Option<User>,

    pub system_status: SystemStatus,
}
