use intern_ai::workflows::allocation::{
    AgentStatus, AllocationId, AllocationRecord, AllocationRepository, AllocationStatus, LogEntry,
    LogStatus, PipelineObserver, PipelineStage, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Allocation store for the demo server; ids sort in creation order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAllocationRepository {
    records: Arc<Mutex<BTreeMap<AllocationId, AllocationRecord>>>,
}

impl AllocationRepository for InMemoryAllocationRepository {
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
        Ok(guard
            .values()
            .filter(|record| status.map_or(true, |wanted| record.allocation.status == wanted))
            .cloned()
            .collect())
    }
}

/// Prints audit entries as the pipeline emits them.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ConsoleObserver;

impl PipelineObserver for ConsoleObserver {
    fn on_status_change(&self, _stage: PipelineStage, _status: AgentStatus) {}

    fn on_log_entry(&self, entry: &LogEntry) {
        println!("{}", format_log_entry(entry));
    }
}

pub(crate) fn format_log_entry(entry: &LogEntry) -> String {
    let marker = match entry.status {
        LogStatus::Processing => "..",
        LogStatus::Success => "ok",
        LogStatus::Error => "!!",
    };
    format!(
        "[{}] {} {:<20} {}",
        entry.timestamp.format("%H:%M:%S"),
        marker,
        entry.agent,
        entry.message
    )
}
