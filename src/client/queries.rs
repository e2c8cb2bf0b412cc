//! Read-side projections over the complaint list.
//!
//! Pure functions on snapshots; nothing here touches the synchronizer.

use crate::shared::complaint::{Complaint, ComplaintStatus};
use crate::shared::record_id::RecordId;
use crate::shared::user::{User, UserRole};

/// Complaints `user` gets to see: citizens their own, officers those
/// assigned to them, admins everything.
pub fn visible_complaints<'a>(complaints: &'a [Complaint], user: &User) -> Vec<&'a Complaint> {
    complaints
        .iter()
        .filter(|complaint| match user.role {
            UserRole::Citizen => complaint.citizen_id == user.id,
            UserRole::Officer => complaint.is_assigned_to(&user.id),
            UserRole::Admin => true,
        })
        .collect()
}

/// Dashboard totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

impl StatusCounts {
    pub fn get(&self, status: ComplaintStatus) -> usize {
        match status {
            ComplaintStatus::Pending => self.pending,
            ComplaintStatus::InProgress => self.in_progress,
            ComplaintStatus::Resolved => self.resolved,
        }
    }
}

pub fn status_counts<'a>(complaints: impl IntoIterator<Item = &'a Complaint>) -> StatusCounts {
    complaints
        .into_iter()
        .fold(StatusCounts::default(), |mut counts, complaint| {
            counts.total += 1;
            match complaint.status {
                ComplaintStatus::Pending => counts.pending += 1,
                ComplaintStatus::InProgress => counts.in_progress += 1,
                ComplaintStatus::Resolved => counts.resolved += 1,
            }
            counts
        })
}

/// Admin list filter: optional status plus a free-text search over title,
/// location and citizen name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
    pub status: Option<ComplaintStatus>,
    pub search: String,
}

impl ComplaintFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: ComplaintStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn matches(&self, complaint: &Complaint) -> bool {
        if self.status.is_some_and(|status| complaint.status != status) {
            return false;
        }

        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || [&complaint.title, &complaint.location, &complaint.citizen_name]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn apply<'a>(&self, complaints: &'a [Complaint]) -> Vec<&'a Complaint> {
        complaints.iter().filter(|c| self.matches(c)).collect()
    }
}

/// A citizen seen in the complaint list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitizenSummary {
    pub id: RecordId,
    pub name: String,
    pub complaint_count: usize,
}

/// Unique citizens in first-seen order with their complaint counts. The name
/// shown is the one on the citizen's latest record in list order.
pub fn citizen_directory(complaints: &[Complaint]) -> Vec<CitizenSummary> {
    let mut directory: Vec<CitizenSummary> = Vec::new();
    for complaint in complaints {
        match directory.iter_mut().find(|c| c.id == complaint.citizen_id) {
            Some(summary) => {
                summary.complaint_count += 1;
                summary.name = complaint.citizen_name.clone();
            }
            None => directory.push(CitizenSummary {
                id: complaint.citizen_id.clone(),
                name: complaint.citizen_name.clone(),
                complaint_count: 1,
            }),
        }
    }
    directory
}
