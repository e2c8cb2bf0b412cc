//! Officer Data Structure

use crate::shared::error::SharedError;
use crate::shared::record_id::RecordId;
use serde::{Deserialize, Serialize};

/// An officer complaints can be assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Officer {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    /// Number of assignment events observed for this officer. Only ever
    /// incremented; it is not the number of complaints currently assigned.
    #[serde(default)]
    pub assigned_complaints: u32,
}

impl Officer {
    pub fn new(id: RecordId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            assigned_complaints: 0,
        }
    }

    pub fn record_assignment(&mut self) {
        self.assigned_complaints = self.assigned_complaints.saturating_add(1);
    }
}

/// Fields an admin provides when adding an officer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOfficer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub email: String,
}

impl NewOfficer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn validate(&self) -> Result<(), SharedError> {
        if self.name.trim().is_empty() {
            return Err(SharedError::validation("name", "Please fill in all fields"));
        }
        if self.email.trim().is_empty() {
            return Err(SharedError::validation("email", "Please fill in all fields"));
        }
        Ok(())
    }
}
