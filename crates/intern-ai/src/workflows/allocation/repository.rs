use serde::{Deserialize, Serialize};

use super::domain::{Allocation, AllocationId, AllocationStatus};

/// Stored allocation plus the run that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub allocation_id: AllocationId,
    pub run_id: String,
    pub allocation: Allocation,
}

impl AllocationRecord {
    pub fn status_view(&self) -> AllocationStatusView {
        AllocationStatusView {
            allocation_id: self.allocation_id.clone(),
            run_id: self.run_id.clone(),
            candidate: self.allocation.candidate_name.clone(),
            provider: self.allocation.provider_name.clone(),
            score: self.allocation.score,
            rationale: self.allocation.rationale.clone(),
            status: self.allocation.status.label(),
        }
    }
}

/// Storage abstraction so the service can be exercised without a database.
pub trait AllocationRepository: Send + Sync {
    fn insert(&self, record: AllocationRecord) -> Result<AllocationRecord, RepositoryError>;
    /// Replaces the stored record only while its status still equals `expected`.
    /// The check and the write happen under one lock or transaction.
    fn update_if(
        &self,
        record: AllocationRecord,
        expected: AllocationStatus,
    ) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AllocationId) -> Result<Option<AllocationRecord>, RepositoryError>;
    fn list(
        &self,
        status: Option<AllocationStatus>,
    ) -> Result<Vec<AllocationRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record is already {}", .found.label())]
    StatusChanged { found: AllocationStatus },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Flattened allocation exposed over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationStatusView {
    pub allocation_id: AllocationId,
    pub run_id: String,
    pub candidate: String,
    pub provider: String,
    pub score: u8,
    pub rationale: String,
    pub status: &'static str,
}
