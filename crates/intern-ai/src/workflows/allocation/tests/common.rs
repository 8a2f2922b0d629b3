use std::collections::HashMap;
use std::sync::{Arc, Barrier, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::AllocationConfig;
use crate::workflows::allocation::domain::{
    AcademicLevel, AllocationId, AllocationStatus, Candidate, CandidateId, Provider, ProviderId,
    Roster, SizeClass,
};
use crate::workflows::allocation::events::LogEntry;
use crate::workflows::allocation::pipeline::{AgentStatus, PipelineObserver, PipelineStage};
use crate::workflows::allocation::repository::{
    AllocationRecord, AllocationRepository, RepositoryError,
};
use crate::workflows::allocation::service::AllocationService;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub(super) fn student(
    id: u64,
    name: &str,
    level: AcademicLevel,
    gpa: f32,
    skills: &[&str],
    interests: &[&str],
) -> Candidate {
    Candidate {
        id: CandidateId(id),
        name: name.to_string(),
        email: None,
        major: Some("Computer Science".to_string()),
        level,
        gpa,
        skills: strings(skills),
        interests: strings(interests),
    }
}

pub(super) fn company(
    id: u64,
    name: &str,
    size: SizeClass,
    capacity: u32,
    requirements: &[&str],
    culture: &[&str],
) -> Provider {
    Provider {
        id: ProviderId(id),
        name: name.to_string(),
        category: "Technology".to_string(),
        location: "San Francisco, CA".to_string(),
        size,
        requirements: strings(requirements),
        culture: strings(culture),
        capacity,
    }
}

/// Two students, two single-seat companies, each student a perfect skill fit for one.
pub(super) fn two_by_two_roster() -> Roster {
    Roster::new(
        vec![
            student(
                1,
                "Xavier Chen",
                AcademicLevel::Senior,
                3.8,
                &["Python", "Machine Learning"],
                &["AI Research"],
            ),
            student(
                2,
                "Yara Patel",
                AcademicLevel::Junior,
                3.0,
                &["Java"],
                &["Enterprise"],
            ),
        ],
        vec![
            company(
                1,
                "NeuralWorks",
                SizeClass::Startup,
                1,
                &["Python", "Machine Learning"],
                &["AI Research"],
            ),
            company(
                2,
                "Ledger Systems",
                SizeClass::Large,
                1,
                &["Java"],
                &["Enterprise Software"],
            ),
        ],
    )
}

/// Two Python students competing for one seat.
pub(super) fn contested_seat_roster() -> Roster {
    Roster::new(
        vec![
            student(1, "Xavier Chen", AcademicLevel::Junior, 3.8, &["Python"], &[]),
            student(2, "Yara Patel", AcademicLevel::Junior, 3.2, &["Python"], &[]),
        ],
        vec![company(1, "DataCorp", SizeClass::Medium, 1, &["Python"], &[])],
    )
}

pub(super) fn allocation_config(retention: usize) -> AllocationConfig {
    AllocationConfig {
        event_log_retention: retention,
    }
}

pub(super) fn build_service() -> (AllocationService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AllocationService::new(repository.clone(), &allocation_config(1000));
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<AllocationId, AllocationRecord>>>,
}

impl AllocationRepository for MemoryRepository {
    fn insert(&self, record: AllocationRecord) -> Result<AllocationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.allocation_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.allocation_id.clone(), record.clone());
        Ok(record)
    }

    fn update_if(
        &self,
        record: AllocationRecord,
        expected: AllocationStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard
            .get_mut(&record.allocation_id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.allocation.status != expected {
            return Err(RepositoryError::StatusChanged {
                found: stored.allocation.status,
            });
        }
        *stored = record;
        Ok(())
    }

    fn fetch(&self, id: &AllocationId) -> Result<Option<AllocationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(
        &self,
        status: Option<AllocationStatus>,
    ) -> Result<Vec<AllocationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<AllocationRecord> = guard
            .values()
            .filter(|record| status.map_or(true, |wanted| record.allocation.status == wanted))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.allocation_id.cmp(&b.allocation_id));
        Ok(records)
    }
}

pub(super) struct UnavailableRepository;

impl AllocationRepository for UnavailableRepository {
    fn insert(&self, _record: AllocationRecord) -> Result<AllocationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_if(
        &self,
        _record: AllocationRecord,
        _expected: AllocationStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AllocationId) -> Result<Option<AllocationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(
        &self,
        _status: Option<AllocationStatus>,
    ) -> Result<Vec<AllocationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Store whose `fetch` waits until `readers` callers have arrived, so
/// concurrent deciders all read the same status before any of them writes.
pub(super) struct GatedRepository {
    pub(super) inner: MemoryRepository,
    gate: Barrier,
}

impl GatedRepository {
    pub(super) fn new(readers: usize) -> Self {
        Self {
            inner: MemoryRepository::default(),
            gate: Barrier::new(readers),
        }
    }
}

impl AllocationRepository for GatedRepository {
    fn insert(&self, record: AllocationRecord) -> Result<AllocationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update_if(
        &self,
        record: AllocationRecord,
        expected: AllocationStatus,
    ) -> Result<(), RepositoryError> {
        self.inner.update_if(record, expected)
    }

    fn fetch(&self, id: &AllocationId) -> Result<Option<AllocationRecord>, RepositoryError> {
        let record = self.inner.fetch(id);
        self.gate.wait();
        record
    }

    fn list(
        &self,
        status: Option<AllocationStatus>,
    ) -> Result<Vec<AllocationRecord>, RepositoryError> {
        self.inner.list(status)
    }
}

/// Observer that records every notification in arrival order.
#[derive(Default)]
pub(super) struct RecordingObserver {
    pub(super) statuses: Mutex<Vec<(PipelineStage, AgentStatus)>>,
    pub(super) entries: Mutex<Vec<LogEntry>>,
}

impl RecordingObserver {
    pub(super) fn statuses(&self) -> Vec<(PipelineStage, AgentStatus)> {
        self.statuses.lock().expect("observer mutex poisoned").clone()
    }

    pub(super) fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().expect("observer mutex poisoned").clone()
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_status_change(&self, stage: PipelineStage, status: AgentStatus) {
        self.statuses
            .lock()
            .expect("observer mutex poisoned")
            .push((stage, status));
    }

    fn on_log_entry(&self, entry: &LogEntry) {
        self.entries
            .lock()
            .expect("observer mutex poisoned")
            .push(entry.clone());
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
