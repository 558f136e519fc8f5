//! User DTO as returned by the attendance API.

use serde::{Deserialize, Serialize};

/// Role string that marks an employee as field staff.
pub const FIELD_STAFF_ROLE: &str = "field_staff";

/// Employee account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// Staff category used to scope holiday rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffType {
    Office,
    Field,
}

impl User {
    /// Staff category derived from the role.
    pub fn staff_type(&self) -> StaffType {
        if self.role == FIELD_STAFF_ROLE {
            StaffType::Field
        } else {
            StaffType::Office
        }
    }
}
