//! Four-stage allocation run: analysis, matching, optimization, conflict resolution.
//!
//! Stages execute strictly in order. Each one moves its agent to Processing,
//! does its work, then lands on Success or Error; the first Error aborts the
//! run. Nothing is retried and capacity already consumed stays consumed.

mod cancel;
mod observer;
mod resolver;
mod stage;

pub use cancel::CancellationToken;
pub use observer::{NoopObserver, PipelineObserver};
pub use resolver::{ConfirmingResolver, ConflictResolver, Resolution, ResolutionError};
pub use stage::{AgentBoard, AgentStatus, PipelineStage, TransitionError};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::candidates::CandidateGenerator;
use super::domain::{Allocation, CandidateId, Roster};
use super::events::{EventLog, LogStatus};
use super::insights::{CandidateAnalysis, MatchInsight};
use super::matcher::{CapacityLedger, MatchContext, Matcher};
use super::scoring::ScoreModel;
use super::summary::AllocationSummary;
use super::validation::{RosterValidator, ValidationError};
use crate::telemetry;

/// Why a stage's work failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StageError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
    #[error("run cancelled")]
    Cancelled,
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} stage failed: {}", .stage.agent(), .error)]
pub struct StageFailure {
    pub stage: PipelineStage,
    pub error: StageError,
}

/// Side of the market that was empty when a run was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPool {
    NoCandidates,
    NoProviders,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed,
    /// Nothing to match; no stage ran and nothing was logged.
    EmptyPool(EmptyPool),
    Aborted(StageFailure),
}

/// Everything one run produced, including partial results of an aborted run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub allocations: Vec<Allocation>,
    pub ledger: CapacityLedger,
    pub analyses: Vec<CandidateAnalysis>,
    pub rankings: BTreeMap<CandidateId, Vec<MatchInsight>>,
    pub resolution: Option<Resolution>,
    pub stage_statuses: BTreeMap<PipelineStage, AgentStatus>,
    pub candidate_count: usize,
}

impl PipelineRun {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }

    pub fn failure(&self) -> Option<&StageFailure> {
        match &self.outcome {
            RunOutcome::Aborted(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn summary(&self) -> AllocationSummary {
        AllocationSummary::from_allocations(&self.allocations, self.candidate_count)
    }
}

/// Per-run mutable state shared by the stages.
struct StageContext<'a> {
    board: AgentBoard,
    log: &'a mut EventLog,
    observer: &'a dyn PipelineObserver,
}

impl StageContext<'_> {
    fn set_status(&mut self, stage: PipelineStage, status: AgentStatus) -> Result<(), StageError> {
        self.board.transition(stage, status)?;
        self.observer.on_status_change(stage, status);
        Ok(())
    }

    fn log(&mut self, stage: PipelineStage, message: String, status: LogStatus) {
        let entry = self.log.append(stage.agent(), message, status);
        self.observer.on_log_entry(entry);
    }
}

/// Drives the staged run. Cheap to clone; clones share the matcher lock.
#[derive(Clone)]
pub struct PipelineOrchestrator {
    validator: RosterValidator,
    generator: CandidateGenerator,
    matcher: Matcher,
    resolver: Arc<dyn ConflictResolver>,
    observer: Arc<dyn PipelineObserver>,
    cancellation: Option<CancellationToken>,
    run_lock: Arc<Mutex<()>>,
    run_sequence: Arc<AtomicU64>,
}

impl Default for PipelineOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineOrchestrator {
    pub fn new() -> Self {
        Self {
            validator: RosterValidator::default(),
            generator: CandidateGenerator::default(),
            matcher: Matcher::new(),
            resolver: Arc::new(ConfirmingResolver),
            observer: Arc::new(NoopObserver),
            cancellation: None,
            run_lock: Arc::new(Mutex::new(())),
            run_sequence: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn with_model(mut self, model: ScoreModel) -> Self {
        self.generator = CandidateGenerator::new(model);
        self
    }

    pub fn with_validator(mut self, validator: RosterValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_resolver<C>(mut self, resolver: C) -> Self
    where
        C: ConflictResolver + 'static,
    {
        self.resolver = Arc::new(resolver);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Opts in to cooperative cancellation; without a token a run always finishes.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Serializes matcher invocations with another orchestrator over the same providers.
    pub fn sharing_run_lock(mut self, lock: Arc<Mutex<()>>) -> Self {
        self.run_lock = lock;
        self
    }

    pub fn run_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.run_lock)
    }

    pub fn generator(&self) -> &CandidateGenerator {
        &self.generator
    }

    /// Executes one run over a snapshot of `roster`.
    ///
    /// Provider capacity is consumed on `PipelineRun::ledger`, never on the
    /// roster itself; apply the ledger to write it back.
    pub fn run(&self, roster: &Roster, log: &mut EventLog) -> PipelineRun {
        let sequence = self.run_sequence.fetch_add(1, Ordering::Relaxed);
        let run_id = format!("run-{sequence:06}");
        let span = telemetry::allocation_run_span(
            &run_id,
            roster.candidates.len(),
            roster.providers.len(),
        );
        let _entered = span.enter();

        let started_at = Utc::now();
        let mut run = PipelineRun {
            run_id,
            started_at,
            finished_at: started_at,
            outcome: RunOutcome::Completed,
            allocations: Vec::new(),
            ledger: CapacityLedger::snapshot(&roster.providers),
            analyses: Vec::new(),
            rankings: BTreeMap::new(),
            resolution: None,
            stage_statuses: AgentBoard::new().snapshot(),
            candidate_count: roster.candidates.len(),
        };

        let empty = if roster.candidates.is_empty() {
            Some(EmptyPool::NoCandidates)
        } else if roster.providers.is_empty() {
            Some(EmptyPool::NoProviders)
        } else {
            None
        };
        if let Some(reason) = empty {
            info!(?reason, "skipping allocation run over an empty pool");
            run.outcome = RunOutcome::EmptyPool(reason);
            return run;
        }

        let mut context = StageContext {
            board: AgentBoard::new(),
            log,
            observer: self.observer.as_ref(),
        };

        for stage in PipelineStage::ordered() {
            if let Err(error) = self.execute(stage, roster, &mut run, &mut context) {
                warn!(stage = stage.key(), %error, "allocation run aborted");
                run.outcome = RunOutcome::Aborted(StageFailure { stage, error });
                break;
            }
        }

        run.stage_statuses = context.board.snapshot();
        run.finished_at = Utc::now();
        info!(
            allocations = run.allocations.len(),
            completed = run.is_completed(),
            "allocation run finished"
        );
        run
    }

    fn execute(
        &self,
        stage: PipelineStage,
        roster: &Roster,
        run: &mut PipelineRun,
        context: &mut StageContext<'_>,
    ) -> Result<(), StageError> {
        context.set_status(stage, AgentStatus::Processing)?;
        context.log(stage, start_message(stage).to_string(), LogStatus::Processing);
        info!(stage = stage.key(), "stage started");

        match self.perform(stage, roster, run) {
            Ok(message) => {
                context.set_status(stage, AgentStatus::Success)?;
                context.log(stage, message, LogStatus::Success);
                Ok(())
            }
            Err(error) => {
                context.set_status(stage, AgentStatus::Error)?;
                context.log(stage, format!("Stage aborted: {error}"), LogStatus::Error);
                Err(error)
            }
        }
    }

    fn perform(
        &self,
        stage: PipelineStage,
        roster: &Roster,
        run: &mut PipelineRun,
    ) -> Result<String, StageError> {
        if self
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(StageError::Cancelled);
        }

        match stage {
            PipelineStage::Analysis => {
                self.validator.validate(roster)?;
                run.analyses = roster
                    .candidates
                    .iter()
                    .map(CandidateAnalysis::of)
                    .collect();
                Ok(format!(
                    "Analyzed {} student profiles",
                    roster.candidates.len()
                ))
            }
            PipelineStage::Matching => {
                for candidate in &roster.candidates {
                    let insights = self
                        .generator
                        .rank_for(candidate, &roster.providers, &run.ledger)
                        .into_iter()
                        .filter_map(|pair| {
                            roster
                                .provider(pair.provider_id)
                                .map(|provider| MatchInsight::of(candidate, provider, pair.score))
                        })
                        .collect();
                    run.rankings.insert(candidate.id, insights);
                }
                Ok(format!(
                    "Matched {} students with {} companies",
                    roster.candidates.len(),
                    roster.providers.len()
                ))
            }
            PipelineStage::Optimization => {
                let _guard = self
                    .run_lock
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let pairs = self.generator.generate_with(
                    &roster.candidates,
                    &roster.providers,
                    &run.ledger,
                );
                let pair_count = pairs.len();
                run.allocations = self.matcher.assign(
                    pairs,
                    MatchContext {
                        candidates: &roster.candidates,
                        providers: &roster.providers,
                        created_at: run.started_at,
                    },
                    &mut run.ledger,
                );
                Ok(format!(
                    "Generated {} allocations from {} candidate pairs",
                    run.allocations.len(),
                    pair_count
                ))
            }
            PipelineStage::ConflictResolution => {
                let resolution = self.resolver.resolve(&run.allocations, &run.ledger)?;
                run.resolution = Some(resolution);
                Ok(if resolution.conflicts_resolved == 0 {
                    "All conflicts resolved successfully".to_string()
                } else {
                    format!("Resolved {} allocation conflicts", resolution.conflicts_resolved)
                })
            }
        }
    }
}

fn start_message(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::Analysis => "Analyzing student profiles and skills...",
        PipelineStage::Matching => "Matching students with company requirements...",
        PipelineStage::Optimization => "Creating allocations from ranked candidate pairs...",
        PipelineStage::ConflictResolution => "Resolving any allocation conflicts...",
    }
}
