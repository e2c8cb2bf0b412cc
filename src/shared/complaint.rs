//! Complaint Data Structure
//!
//! A complaint submitted by a citizen and worked on by officers. Wire field
//! names are camelCase to match the complaint API.

use crate::shared::error::SharedError;
use crate::shared::officer::Officer;
use crate::shared::record_id::RecordId;
use crate::shared::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Processing state of a complaint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ComplaintStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "resolved")]
    Resolved,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 3] = [Self::Pending, Self::InProgress, Self::Resolved];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = SharedError;

    /// Accepts `in-progress`, `in_progress`, `In Progress` and the like
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in-progress" | "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            _ => Err(SharedError::validation(
                "status",
                format!("unknown complaint status '{}'", value),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for ComplaintStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Complaint category tag. Anything unrecognized is filed under `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintCategory {
    Water,
    Electricity,
    Roads,
    Sanitation,
    #[default]
    Other,
}

impl ComplaintCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Electricity => "electricity",
            Self::Roads => "roads",
            Self::Sanitation => "sanitation",
            Self::Other => "other",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "water" => Self::Water,
            "electricity" => Self::Electricity,
            "roads" | "road" => Self::Roads,
            "sanitation" => Self::Sanitation,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ComplaintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ComplaintCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

/// An explicit `null` reads the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A complaint as held by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    #[serde(default, alias = "_id")]
    pub id: RecordId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, alias = "type", deserialize_with = "null_as_default")]
    pub category: ComplaintCategory,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ComplaintStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub citizen_id: RecordId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub citizen_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub officer_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub officer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// Build the provisional record for a citizen submission
    pub fn provisional(data: NewComplaint, submitter: &User, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::provisional(),
            title: data.title,
            description: data.description,
            location: data.location,
            category: data.category,
            status: ComplaintStatus::Pending,
            citizen_id: submitter.id.clone(),
            citizen_name: submitter.name.clone(),
            officer_id: None,
            officer_name: None,
            status_remarks: None,
            file_url: data.file_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: ComplaintStatus, remarks: Option<String>, now: DateTime<Utc>) {
        self.status = status;
        self.status_remarks = remarks;
        self.updated_at = now;
    }

    pub fn assign_to(&mut self, officer: &Officer, now: DateTime<Utc>) {
        self.officer_id = Some(officer.id.clone());
        self.officer_name = Some(officer.name.clone());
        self.updated_at = now;
    }

    /// Drop the officer reference. Returns whether anything changed.
    pub fn clear_officer(&mut self, now: DateTime<Utc>) -> bool {
        if self.officer_id.is_none() && self.officer_name.is_none() {
            return false;
        }
        self.officer_id = None;
        self.officer_name = None;
        self.updated_at = now;
        true
    }

    pub fn is_assigned_to(&self, officer_id: &RecordId) -> bool {
        self.officer_id.as_ref() == Some(officer_id)
    }
}

/// Fields a citizen provides when submitting a complaint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(alias = "type")]
    pub category: ComplaintCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl NewComplaint {
    pub fn new(
        title: impl Into<String>,
        category: ComplaintCategory,
        location: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            location: location.into(),
            category,
            file_url: None,
        }
    }

    pub fn validate(&self) -> Result<(), SharedError> {
        if self.title.trim().is_empty() {
            return Err(SharedError::validation("title", "Title cannot be empty"));
        }
        if self.location.trim().is_empty() {
            return Err(SharedError::validation("location", "Location cannot be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(SharedError::validation("description", "Description cannot be empty"));
        }
        Ok(())
    }
}

/// Body of `PUT /complaints/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ComplaintStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Body of the officer `POST /complaints/officer/update-status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerStatusRequest {
    pub complaint_id: RecordId,
    pub status: ComplaintStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Body of `POST /complaints/assign`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignOfficerRequest {
    pub complaint_id: RecordId,
    pub officer_id: RecordId,
}
