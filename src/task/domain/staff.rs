//! Staff actor reference.

use super::StaffId;
use serde::{Deserialize, Serialize};

/// A staff member as seen by the task engine. The engine never creates or
/// deletes staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    id: StaffId,
    display_name: String,
    is_admin: bool,
}

impl Staff {
    /// Creates a staff reference.
    #[must_use]
    pub fn new(id: StaffId, display_name: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            is_admin,
        }
    }

    /// Returns the staff identifier.
    #[must_use]
    pub const fn id(&self) -> &StaffId {
        &self.id
    }

    /// Returns the display name, falling back to the identifier when blank.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            return self.id.as_str();
        }
        &self.display_name
    }

    /// Returns whether the staff member is an administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }
}
