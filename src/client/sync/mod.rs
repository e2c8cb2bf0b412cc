//! # Complaint State Synchronizer
//!
//! Single in-memory source of truth for the complaint and officer collections
//! of one session. Every write is optimistic: the local change is applied and
//! cached before the call returns, and the server round trip runs as a
//! spawned task handed back as a [`PendingSync`]. A failed round trip never
//! rolls the local change back.
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo(sync: cms_client::client::sync::ComplaintSynchronizer, user: cms_client::shared::User) {
//! use cms_client::shared::{ComplaintCategory, NewComplaint};
//!
//! let data = NewComplaint::new("Pothole", ComplaintCategory::Roads, "5th Ave", "deep");
//! let pending = sync.add_complaint(data, &user);
//!
//! // Already visible, before the server has answered
//! assert_eq!(sync.complaints()[0].title, "Pothole");
//!
//! let outcome = pending.wait().await;
//! # let _ = outcome;
//! # }
//! ```
//!
//! ## Reconciliation
//!
//! - Submissions swap the provisional record for the server's record.
//! - Status changes and assignments refetch the role's complaint list.
//! - Concurrent reconciliations are not ordered; the last one to finish wins.

mod pending;

pub use pending::{PendingSync, SyncError, WriteOutcome};

use crate::client::auth::CredentialStore;
use crate::client::gateway::{ComplaintGateway, GatewayError};
use crate::client::local_cache::{keys, LocalCache};
use crate::shared::complaint::{Complaint, ComplaintStatus, NewComplaint};
use crate::shared::officer::{NewOfficer, Officer};
use crate::shared::record_id::RecordId;
use crate::shared::user::{User, UserRole};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Note attached to a submission the server never confirmed
pub const SAVED_LOCALLY: &str = "Complaint saved locally";

pub const OFFICER_NOT_FOUND: &str = "Officer not found";

/// Point-in-time copy of the synchronizer state
#[derive(Debug, Clone, Default)]
pub struct SyncSnapshot {
    pub complaints: Vec<Complaint>,
    pub officers: Vec<Officer>,
    pub loading: bool,
}

#[derive(Debug, Default)]
struct SyncState {
    complaints: Vec<Complaint>,
    officers: Vec<Officer>,
    loading: bool,
}

/// Collections a mutation changed and that must be written through
#[derive(Debug, Clone, Copy)]
struct Touched {
    complaints: bool,
    officers: bool,
}

impl Touched {
    const NOTHING: Self = Self { complaints: false, officers: false };
    const COMPLAINTS: Self = Self { complaints: true, officers: false };
    const OFFICERS: Self = Self { complaints: false, officers: true };
    const BOTH: Self = Self { complaints: true, officers: true };
}

struct Inner {
    state: RwLock<SyncState>,
    gateway: ComplaintGateway,
    cache: LocalCache,
    credentials: CredentialStore,
}

/// Handle to the synchronizer. Clones share state.
#[derive(Clone)]
pub struct ComplaintSynchronizer {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ComplaintSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("ComplaintSynchronizer")
            .field("complaints", &state.complaints.len())
            .field("officers", &state.officers.len())
            .field("loading", &state.loading)
            .finish()
    }
}

impl ComplaintSynchronizer {
    pub fn new(gateway: ComplaintGateway, cache: LocalCache) -> Self {
        let credentials = CredentialStore::new(cache.clone());
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(SyncState::default()),
                gateway,
                cache,
                credentials,
            }),
        }
    }

    pub fn gateway(&self) -> &ComplaintGateway {
        &self.inner.gateway
    }

    pub fn cache(&self) -> &LocalCache {
        &self.inner.cache
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    /// Load both collections from the cache. Missing or unreadable entries
    /// leave the collection empty.
    pub fn hydrate(&self) {
        let complaints = self.cached_collection::<Complaint>(keys::COMPLAINTS);
        let officers = self.cached_collection::<Officer>(keys::OFFICERS);
        tracing::info!(
            "[SYNC] Hydrated {} complaints and {} officers from cache",
            complaints.len(),
            officers.len()
        );

        let mut state = self.write_state();
        state.complaints = complaints;
        state.officers = officers;
    }

    /// Drop in-memory state. Cached collections stay for the stale-read path.
    pub fn clear(&self) {
        *self.write_state() = SyncState::default();
    }

    pub fn complaints(&self) -> Vec<Complaint> {
        self.read_state().complaints.clone()
    }

    pub fn officers(&self) -> Vec<Officer> {
        self.read_state().officers.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().loading
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        let state = self.read_state();
        SyncSnapshot {
            complaints: state.complaints.clone(),
            officers: state.officers.clone(),
            loading: state.loading,
        }
    }

    pub fn complaint(&self, id: impl Into<RecordId>) -> Option<Complaint> {
        let id = id.into();
        self.read_state().complaints.iter().find(|c| c.id == id).cloned()
    }

    /// Replace the complaint list with the server's view for `role`.
    ///
    /// Never fails: every outcome ends as a state change with `loading`
    /// cleared. A transport failure falls back to the cached list.
    pub async fn fetch_all(&self, role: UserRole, credential: Option<&str>) {
        let Some(token) = credential.map(str::trim).filter(|token| !token.is_empty()) else {
            tracing::debug!("[SYNC] No credential, skipping complaint fetch");
            self.finish_fetch(Vec::new(), false);
            return;
        };

        self.write_state().loading = true;

        match self.inner.gateway.fetch_complaints(role, token).await {
            Ok(payload) if payload.is_recognized() => {
                let shape = payload.shape();
                let complaints = payload.into_records();
                tracing::debug!(
                    "[SYNC] Fetched {} complaints for {} ({})",
                    complaints.len(),
                    role,
                    shape
                );
                self.finish_fetch(complaints, true);
            }
            Ok(payload) => {
                tracing::warn!(
                    "[SYNC] Unexpected complaints payload ({}), showing none",
                    payload.shape()
                );
                self.finish_fetch(Vec::new(), false);
            }
            Err(GatewayError::Transport(e)) => {
                let cached = self.cached_collection::<Complaint>(keys::COMPLAINTS);
                if cached.is_empty() {
                    tracing::warn!("[SYNC] Network error fetching complaints, no cached copy: {}", e);
                } else {
                    tracing::warn!(
                        "[SYNC] Network error fetching complaints, using {} cached: {}",
                        cached.len(),
                        e
                    );
                }
                self.finish_fetch(cached, false);
            }
            Err(GatewayError::InvalidResponse(message)) => {
                tracing::error!("[SYNC] Invalid response from complaints endpoint: {}", message);
                self.finish_fetch(Vec::new(), false);
            }
            Err(e) => {
                tracing::error!("[SYNC] Failed to fetch complaints: {}", e);
                self.finish_fetch(Vec::new(), false);
            }
        }
    }

    /// [`fetch_all`](Self::fetch_all) as a background task
    pub fn refresh(&self, role: UserRole, credential: Option<String>) -> PendingSync<()> {
        let this = self.clone();
        PendingSync::spawn(async move { this.fetch_all(role, credential.as_deref()).await })
    }

    /// Prepend a provisional complaint and submit it in the background
    pub fn add_complaint(&self, data: NewComplaint, current_user: &User) -> PendingSync<WriteOutcome> {
        let provisional = Complaint::provisional(data.clone(), current_user, Utc::now());
        let provisional_id = provisional.id.clone();

        self.mutate(|state| {
            state.complaints.insert(0, provisional);
            ((), Touched::COMPLAINTS)
        });
        tracing::info!("[SYNC] Complaint {} added locally", provisional_id);

        let token = self.inner.credentials.token().unwrap_or_default();
        let this = self.clone();
        PendingSync::spawn(async move { this.submit(provisional_id, data, token).await })
    }

    async fn submit(&self, provisional_id: RecordId, data: NewComplaint, token: String) -> WriteOutcome {
        match self.inner.gateway.submit_complaint(&token, &data).await {
            Ok(Some(record)) => {
                let id = self.reconcile_submission(&provisional_id, record);
                tracing::info!("[SYNC] Complaint {} synced as {}", provisional_id, id);
                WriteOutcome::synced(Some(id))
            }
            Ok(None) => {
                tracing::info!("[SYNC] Complaint {} accepted without a record", provisional_id);
                WriteOutcome::synced(Some(provisional_id))
            }
            Err(e) => {
                tracing::warn!("[SYNC] Complaint {} kept locally: {}", provisional_id, e);
                WriteOutcome::local_only(Some(provisional_id), SAVED_LOCALLY)
            }
        }
    }

    /// Swap the provisional record for the server's. Returns the final id.
    fn reconcile_submission(&self, provisional_id: &RecordId, mut record: Complaint) -> RecordId {
        if record.id.is_empty() {
            record.id = provisional_id.clone();
        }
        let id = record.id.clone();

        self.mutate(|state| {
            let Some(slot) = state.complaints.iter_mut().find(|c| &c.id == provisional_id) else {
                tracing::debug!("[SYNC] Provisional complaint {} no longer held", provisional_id);
                return ((), Touched::NOTHING);
            };
            // Submitter fields are ours; keep them if the server left them out
            if record.citizen_id.is_empty() {
                record.citizen_id = slot.citizen_id.clone();
            }
            if record.citizen_name.is_empty() {
                record.citizen_name = slot.citizen_name.clone();
            }
            *slot = record;
            ((), Touched::COMPLAINTS)
        });

        id
    }

    /// Set status and remarks locally, then push the change
    pub fn update_status(
        &self,
        id: impl Into<RecordId>,
        status: ComplaintStatus,
        remarks: Option<String>,
        current_user: &User,
    ) -> PendingSync<WriteOutcome> {
        let id = id.into();
        let now = Utc::now();

        let found = self.mutate(|state| match state.complaints.iter_mut().find(|c| c.id == id) {
            Some(complaint) => {
                complaint.set_status(status, remarks.clone(), now);
                (true, Touched::COMPLAINTS)
            }
            None => (false, Touched::NOTHING),
        });
        if !found {
            tracing::debug!("[SYNC] Complaint {} not held locally, pushing status anyway", id);
        }

        let role = current_user.role;
        let token = self.inner.credentials.token().unwrap_or_default();
        let this = self.clone();
        PendingSync::spawn(async move {
            match this.inner.gateway.update_status(role, &token, &id, status, remarks).await {
                Ok(()) => {
                    tracing::info!("[SYNC] Status of {} synced as {}", id, status);
                    this.fetch_all(role, Some(&token)).await;
                    WriteOutcome::synced(Some(id))
                }
                Err(e) => {
                    tracing::error!("[SYNC] Failed to sync status of {}: {}", id, e);
                    WriteOutcome::local_only(Some(id), e.user_message())
                }
            }
        })
    }

    pub fn delete_complaint(&self, id: impl Into<RecordId>) -> PendingSync<WriteOutcome> {
        let id = id.into();

        self.mutate(|state| {
            let before = state.complaints.len();
            state.complaints.retain(|c| c.id != id);
            let touched = if state.complaints.len() != before {
                Touched::COMPLAINTS
            } else {
                Touched::NOTHING
            };
            ((), touched)
        });

        let token = self.inner.credentials.token().unwrap_or_default();
        let this = self.clone();
        PendingSync::spawn(async move {
            match this.inner.gateway.delete_complaint(&token, &id).await {
                Ok(()) => {
                    tracing::info!("[SYNC] Complaint {} deleted on server", id);
                    WriteOutcome::synced(Some(id))
                }
                Err(e) => {
                    tracing::error!("[SYNC] Failed to delete complaint {} on server: {}", id, e);
                    WriteOutcome::local_only(Some(id), e.user_message())
                }
            }
        })
    }

    /// Assign a known officer to a complaint.
    ///
    /// An unknown officer changes nothing and settles immediately with a
    /// failed outcome.
    pub fn assign_officer(
        &self,
        complaint_id: impl Into<RecordId>,
        officer_id: impl Into<RecordId>,
    ) -> PendingSync<WriteOutcome> {
        let complaint_id = complaint_id.into();
        let officer_id = officer_id.into();
        let now = Utc::now();

        let assigned = self.mutate(|state| {
            let Some(officer) = state.officers.iter_mut().find(|o| o.id == officer_id) else {
                return (false, Touched::NOTHING);
            };
            officer.record_assignment();
            let officer = officer.clone();

            match state.complaints.iter_mut().find(|c| c.id == complaint_id) {
                Some(complaint) => complaint.assign_to(&officer, now),
                None => tracing::debug!("[SYNC] Complaint {} not held locally", complaint_id),
            }
            (true, Touched::BOTH)
        });

        if !assigned {
            tracing::error!(
                "[SYNC] Cannot assign complaint {}: officer {} not found",
                complaint_id,
                officer_id
            );
            return PendingSync::ready(WriteOutcome::rejected(OFFICER_NOT_FOUND));
        }

        let token = self.inner.credentials.token().unwrap_or_default();
        let this = self.clone();
        PendingSync::spawn(async move {
            match this.inner.gateway.assign_officer(&token, &complaint_id, &officer_id).await {
                Ok(()) => {
                    tracing::info!("[SYNC] Complaint {} assigned to {}", complaint_id, officer_id);
                    this.fetch_all(UserRole::Admin, Some(&token)).await;
                    WriteOutcome::synced(Some(complaint_id))
                }
                Err(e) => {
                    tracing::error!("[SYNC] Failed to sync assignment of {}: {}", complaint_id, e);
                    WriteOutcome::local_only(Some(complaint_id), e.user_message())
                }
            }
        })
    }

    /// Add an officer to the local roster
    pub fn add_officer(&self, data: NewOfficer) -> Officer {
        let id = data.id.filter(|id| !id.is_empty()).unwrap_or_else(RecordId::provisional);
        let officer = Officer::new(id, data.name, data.email);

        self.mutate(|state| {
            state.officers.push(officer.clone());
            ((), Touched::OFFICERS)
        });
        tracing::info!("[SYNC] Officer {} added", officer.id);

        officer
    }

    /// Remove an officer and unassign their complaints. Removing an unknown
    /// officer is a no-op. Returns whether the officer was held.
    pub fn remove_officer(&self, id: impl Into<RecordId>) -> bool {
        let id = id.into();
        let now = Utc::now();

        let (removed, cleared) = self.mutate(|state| {
            let before = state.officers.len();
            state.officers.retain(|o| o.id != id);
            let removed = state.officers.len() != before;

            let cleared = state
                .complaints
                .iter_mut()
                .filter(|c| c.is_assigned_to(&id))
                .filter_map(|c| c.clear_officer(now).then_some(()))
                .count();

            let touched = Touched {
                complaints: cleared > 0,
                officers: removed,
            };
            ((removed, cleared), touched)
        });

        if removed || cleared > 0 {
            tracing::info!("[SYNC] Officer {} removed, {} complaints unassigned", id, cleared);
        }
        removed
    }

    fn finish_fetch(&self, complaints: Vec<Complaint>, persist: bool) {
        let mut state = self.write_state();
        if persist {
            self.persist(keys::COMPLAINTS, &complaints);
        }
        state.complaints = complaints;
        state.loading = false;
    }

    /// Apply `f` under the state lock and write through what it touched.
    /// Cache writes happen under the same lock so they land in order.
    fn mutate<R>(&self, f: impl FnOnce(&mut SyncState) -> (R, Touched)) -> R {
        let mut state = self.write_state();
        let (result, touched) = f(&mut *state);
        if touched.complaints {
            self.persist(keys::COMPLAINTS, &state.complaints);
        }
        if touched.officers {
            self.persist(keys::OFFICERS, &state.officers);
        }
        result
    }

    fn persist<T: Serialize>(&self, key: &str, records: &[T]) {
        if let Err(e) = self.inner.cache.set_json(key, records) {
            tracing::error!("[SYNC] Failed to cache {}: {}", key, e);
        }
    }

    fn cached_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.inner.cache.get_json::<Vec<T>>(key) {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("[SYNC] Ignoring unreadable cache entry: {}", e);
                Vec::new()
            }
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SyncState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SyncState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
