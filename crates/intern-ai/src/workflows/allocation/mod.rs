//! Internship allocation engine.
//!
//! Candidates and providers are scored pairwise, the best pairs are committed
//! greedily against provider capacity, and a four-agent pipeline records every
//! step in an append-only audit log. Allocations leave the engine as `Pending`
//! and only change status through [`AllocationService::decide`].

pub mod candidates;
pub mod domain;
pub mod events;
pub mod insights;
pub mod matcher;
pub mod pipeline;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod summary;
pub mod validation;

#[cfg(test)]
mod tests;

pub use candidates::{CandidateGenerator, ScoredPair};
pub use domain::{
    AcademicLevel, Allocation, AllocationId, AllocationStatus, Candidate, CandidateId, Provider,
    ProviderId, Roster, SizeClass,
};
pub use events::{EventLog, LogEntry, LogFilter, LogStats, LogStatus};
pub use insights::{CandidateAnalysis, MatchInsight};
pub use matcher::{CapacityLedger, MatchContext, Matcher};
pub use pipeline::{
    AgentBoard, AgentStatus, CancellationToken, ConfirmingResolver, ConflictResolver, EmptyPool,
    NoopObserver, PipelineObserver, PipelineOrchestrator, PipelineRun, PipelineStage, Resolution,
    ResolutionError, RunOutcome, StageError, StageFailure, TransitionError,
};
pub use repository::{
    AllocationRecord, AllocationRepository, AllocationStatusView, RepositoryError,
};
pub use router::allocation_router;
pub use scoring::{compute_score, MatchScore, MatchTier, ScoreFactor, ScoreModel, ScoreWeights};
pub use service::{
    AllocationService, AllocationServiceError, Decision, DecisionRequest, FailureView, RunReport,
    StatusTracker,
};
pub use summary::AllocationSummary;
pub use validation::{RosterValidator, ValidationError, ValidationPolicy};
