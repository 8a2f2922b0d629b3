use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{AllocationId, AllocationStatus, CandidateId, ProviderId, Roster};
use super::events::{EventLog, LogEntry, LogFilter, LogStats};
use super::insights::{CandidateAnalysis, MatchInsight};
use super::pipeline::{
    AgentBoard, AgentStatus, PipelineObserver, PipelineOrchestrator, PipelineRun, PipelineStage,
    RunOutcome, StageError,
};
use super::repository::{
    AllocationRecord, AllocationRepository, AllocationStatusView, RepositoryError,
};
use super::summary::AllocationSummary;
use crate::config::AllocationConfig;

static ALLOCATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_allocation_id() -> AllocationId {
    let id = ALLOCATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AllocationId(format!("alloc-{id:06}"))
}

/// Reviewer verdict on a pending allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub const fn status(self) -> AllocationStatus {
        match self {
            Self::Approved => AllocationStatus::Approved,
            Self::Rejected => AllocationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

/// Tracks the latest status per agent and forwards events downstream.
#[derive(Default)]
pub struct StatusTracker {
    statuses: Mutex<BTreeMap<PipelineStage, AgentStatus>>,
    downstream: Option<Arc<dyn PipelineObserver>>,
}

impl StatusTracker {
    pub fn forwarding_to(downstream: Arc<dyn PipelineObserver>) -> Self {
        Self {
            statuses: Mutex::default(),
            downstream: Some(downstream),
        }
    }

    pub fn snapshot(&self) -> BTreeMap<PipelineStage, AgentStatus> {
        let mut board = AgentBoard::new().snapshot();
        let seen = self.statuses.lock().unwrap_or_else(PoisonError::into_inner);
        board.extend(seen.iter().map(|(stage, status)| (*stage, *status)));
        board
    }
}

impl PipelineObserver for StatusTracker {
    fn on_status_change(&self, stage: PipelineStage, status: AgentStatus) {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(stage, status);
        if let Some(downstream) = &self.downstream {
            downstream.on_status_change(stage, status);
        }
    }

    fn on_log_entry(&self, entry: &LogEntry) {
        if let Some(downstream) = &self.downstream {
            downstream.on_log_entry(entry);
        }
    }
}

/// Stage failure flattened for API consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureView {
    pub stage: &'static str,
    pub agent: &'static str,
    pub error: String,
    #[serde(skip)]
    pub invalid_input: bool,
}

/// What one call to [`AllocationService::run`] produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureView>,
    pub allocations: Vec<AllocationStatusView>,
    pub summary: AllocationSummary,
    pub remaining_capacity: BTreeMap<ProviderId, u32>,
    pub analyses: Vec<CandidateAnalysis>,
    pub rankings: BTreeMap<CandidateId, Vec<MatchInsight>>,
    pub agents: BTreeMap<PipelineStage, AgentStatus>,
}

impl RunReport {
    fn new(run: &PipelineRun, records: &[AllocationRecord]) -> Self {
        let (outcome, failure) = match &run.outcome {
            RunOutcome::Completed => ("completed", None),
            RunOutcome::EmptyPool(_) => ("empty_pool", None),
            RunOutcome::Aborted(failure) => (
                "aborted",
                Some(FailureView {
                    stage: failure.stage.key(),
                    agent: failure.stage.agent(),
                    error: failure.error.to_string(),
                    invalid_input: matches!(failure.error, StageError::InvalidInput(_)),
                }),
            ),
        };

        Self {
            run_id: run.run_id.clone(),
            outcome,
            failure,
            allocations: records.iter().map(AllocationRecord::status_view).collect(),
            summary: run.summary(),
            remaining_capacity: run.ledger.remaining_by_provider().clone(),
            analyses: run.analyses.clone(),
            rankings: run.rankings.clone(),
            agents: run.stage_statuses.clone(),
        }
    }

    pub fn rejected_input(&self) -> bool {
        self.failure
            .as_ref()
            .is_some_and(|failure| failure.invalid_input)
    }
}

/// Runs the pipeline, stores its allocations, and handles reviewer decisions.
pub struct AllocationService<R> {
    orchestrator: PipelineOrchestrator,
    repository: Arc<R>,
    log: Mutex<EventLog>,
    runs: Mutex<()>,
    tracker: Arc<StatusTracker>,
    retention: usize,
}

impl<R> AllocationService<R>
where
    R: AllocationRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: &AllocationConfig) -> Self {
        Self::with_tracker(repository, config, StatusTracker::default())
    }

    /// Builds the service with a tracker that may forward pipeline events elsewhere.
    pub fn with_tracker(
        repository: Arc<R>,
        config: &AllocationConfig,
        tracker: StatusTracker,
    ) -> Self {
        Self::with_orchestrator(repository, config, tracker, PipelineOrchestrator::new())
    }

    pub fn with_orchestrator(
        repository: Arc<R>,
        config: &AllocationConfig,
        tracker: StatusTracker,
        orchestrator: PipelineOrchestrator,
    ) -> Self {
        let tracker = Arc::new(tracker);
        let orchestrator = orchestrator.with_observer(tracker.clone());
        Self {
            orchestrator,
            repository,
            log: Mutex::new(EventLog::new()),
            runs: Mutex::new(()),
            tracker,
            retention: config.event_log_retention,
        }
    }

    /// Runs the pipeline over `roster` and stores every allocation it produced.
    ///
    /// Aborted runs still return a report; stored allocations are whatever the
    /// optimization stage committed before the failure.
    pub fn run(&self, roster: Roster) -> Result<RunReport, AllocationServiceError> {
        // Runs are serialized so staged log ids never overlap; the shared log
        // stays readable while a run is in flight.
        let run = {
            let _serial = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
            let mut staged = self.lock_log().staging();
            let run = self.orchestrator.run(&roster, &mut staged);
            let mut log = self.lock_log();
            log.absorb(staged);
            log.retain_latest(self.retention);
            run
        };

        let mut records = Vec::with_capacity(run.allocations.len());
        for allocation in &run.allocations {
            let record = AllocationRecord {
                allocation_id: next_allocation_id(),
                run_id: run.run_id.clone(),
                allocation: allocation.clone(),
            };
            records.push(self.repository.insert(record)?);
        }

        let report = RunReport::new(&run, &records);
        if let Some(failure) = &report.failure {
            warn!(
                run_id = %report.run_id,
                stage = failure.stage,
                error = %failure.error,
                "run aborted"
            );
        } else {
            info!(run_id = %report.run_id, allocations = records.len(), "run stored");
        }
        Ok(report)
    }

    /// Moves a pending allocation to its final status.
    pub fn decide(
        &self,
        allocation_id: &AllocationId,
        decision: Decision,
    ) -> Result<AllocationRecord, AllocationServiceError> {
        let mut record = self
            .repository
            .fetch(allocation_id)?
            .ok_or(RepositoryError::NotFound)?;

        let current = record.allocation.status;
        if current.is_final() {
            return Err(illegal_transition(allocation_id, current));
        }

        record.allocation.status = decision.status();
        match self.repository.update_if(record.clone(), current) {
            Ok(()) => {}
            Err(RepositoryError::StatusChanged { found }) => {
                warn!(
                    allocation_id = %allocation_id.0,
                    status = found.label(),
                    "allocation decided concurrently"
                );
                return Err(illegal_transition(allocation_id, found));
            }
            Err(err) => return Err(err.into()),
        }
        info!(
            allocation_id = %allocation_id.0,
            status = record.allocation.status.label(),
            "allocation decided"
        );
        Ok(record)
    }

    pub fn get(
        &self,
        allocation_id: &AllocationId,
    ) -> Result<AllocationRecord, AllocationServiceError> {
        let record = self
            .repository
            .fetch(allocation_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list(
        &self,
        status: Option<AllocationStatus>,
    ) -> Result<Vec<AllocationRecord>, AllocationServiceError> {
        Ok(self.repository.list(status)?)
    }

    /// Newest-first audit entries matching `filter`.
    pub fn logs(&self, filter: &LogFilter) -> Vec<LogEntry> {
        self.lock_log().query(filter)
    }

    pub fn log_stats(&self) -> LogStats {
        self.lock_log().stats()
    }

    pub fn agent_statuses(&self) -> BTreeMap<PipelineStage, AgentStatus> {
        self.tracker.snapshot()
    }

    fn lock_log(&self) -> MutexGuard<'_, EventLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn log_is_free(&self) -> bool {
        self.log.try_lock().is_ok()
    }
}

fn illegal_transition(
    allocation_id: &AllocationId,
    status: AllocationStatus,
) -> AllocationServiceError {
    AllocationServiceError::IllegalTransition {
        allocation_id: allocation_id.0.clone(),
        status: status.label(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AllocationServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("allocation {allocation_id} is already {status}")]
    IllegalTransition {
        allocation_id: String,
        status: &'static str,
    },
}
