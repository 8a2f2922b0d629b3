//! End-to-end allocation runs through the public orchestrator and service facade.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use intern_ai::workflows::allocation::{
        AcademicLevel, AllocationId, AllocationRecord, AllocationRepository, AllocationStatus,
        Candidate, CandidateId, Provider, ProviderId, RepositoryError, SizeClass,
    };

    pub(super) fn candidate(
        id: u64,
        level: AcademicLevel,
        gpa: f32,
        skills: &[&str],
        interests: &[&str],
    ) -> Candidate {
        Candidate {
            id: CandidateId(id),
            name: format!("Student {id}"),
            email: Some(format!("student{id}@university.edu")),
            major: Some("Computer Science".to_string()),
            level,
            gpa,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            interests: interests.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub(super) fn provider(
        id: u64,
        size: SizeClass,
        capacity: u32,
        requirements: &[&str],
        culture: &[&str],
    ) -> Provider {
        Provider {
            id: ProviderId(id),
            name: format!("Company {id}"),
            category: "Technology".to_string(),
            location: "Remote".to_string(),
            size,
            requirements: requirements.iter().map(|s| s.to_string()).collect(),
            culture: culture.iter().map(|s| s.to_string()).collect(),
            capacity,
        }
    }

    #[derive(Default)]
    pub(super) struct MemoryRepository {
        records: Mutex<HashMap<AllocationId, AllocationRecord>>,
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
            Ok(guard
                .values()
                .filter(|record| status.map_or(true, |s| record.allocation.status == s))
                .cloned()
                .collect())
        }
    }

    pub(super) fn repository() -> Arc<MemoryRepository> {
        Arc::new(MemoryRepository::default())
    }
}

use common::*;
use intern_ai::config::AllocationConfig;
use intern_ai::workflows::allocation::{
    compute_score, AcademicLevel, AllocationService, CandidateId, EventLog, PipelineOrchestrator,
    ProviderId, Roster, RunOutcome, SizeClass,
};

#[test]
fn skill_fits_pair_up_one_to_one() {
    let x = candidate(
        1,
        AcademicLevel::Senior,
        3.8,
        &["Python", "ML"],
        &["Research"],
    );
    let y = candidate(2, AcademicLevel::Junior, 3.0, &["Java"], &["Banking"]);
    let p = provider(1, SizeClass::Startup, 1, &["Python", "ML"], &["Research"]);
    let q = provider(2, SizeClass::Large, 1, &["Java"], &["Banking"]);
    let mut roster = Roster::new(vec![x.clone(), y], vec![p.clone(), q]);

    let run = PipelineOrchestrator::new().run(&roster, &mut EventLog::new());

    assert!(run.is_completed());
    let pairs: Vec<(CandidateId, ProviderId)> = run
        .allocations
        .iter()
        .map(|allocation| (allocation.candidate_id, allocation.provider_id))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (CandidateId(1), ProviderId(1)),
            (CandidateId(2), ProviderId(2)),
        ]
    );
    assert!(compute_score(&x, &p) >= 90);
    assert!(run.allocations[0].rationale.starts_with("Excellent skill alignment"));
    assert!(run.allocations[1].rationale.starts_with("Excellent skill alignment"));

    run.ledger.apply_to(&mut roster.providers);
    assert!(roster.providers.iter().all(|provider| provider.capacity == 0));
}

#[test]
fn single_seat_goes_to_the_higher_gpa() {
    let roster = Roster::new(
        vec![
            candidate(1, AcademicLevel::Junior, 3.8, &["Python"], &[]),
            candidate(2, AcademicLevel::Junior, 3.2, &["Python"], &[]),
        ],
        vec![provider(1, SizeClass::Medium, 1, &["Python"], &[])],
    );

    let run = PipelineOrchestrator::new().run(&roster, &mut EventLog::new());

    assert_eq!(run.allocations.len(), 1);
    assert_eq!(run.allocations[0].candidate_id, CandidateId(1));
    assert_eq!(run.ledger.remaining(ProviderId(1)), 0);
    assert!(!run
        .allocations
        .iter()
        .any(|allocation| allocation.candidate_id == CandidateId(2)));
}

#[test]
fn no_providers_means_no_allocations_and_no_failure() {
    let roster = Roster::new(
        vec![candidate(1, AcademicLevel::Junior, 3.5, &["Rust"], &[])],
        Vec::new(),
    );
    let mut log = EventLog::new();

    let run = PipelineOrchestrator::new().run(&roster, &mut log);

    assert!(matches!(run.outcome, RunOutcome::EmptyPool(_)));
    assert!(run.allocations.is_empty());
    assert!(log.is_empty());
}

#[test]
fn repeated_runs_are_deterministic() {
    let roster = Roster::new(
        (1..=6)
            .map(|id| {
                candidate(
                    id,
                    AcademicLevel::Sophomore,
                    2.5 + id as f32 * 0.2,
                    &["Python", "SQL"],
                    &["Data"],
                )
            })
            .collect(),
        vec![
            provider(1, SizeClass::Small, 2, &["Python"], &["Data"]),
            provider(2, SizeClass::Medium, 2, &["SQL", "Tableau"], &[]),
        ],
    );
    let orchestrator = PipelineOrchestrator::new();

    let first = orchestrator.run(&roster, &mut EventLog::new());
    let second = orchestrator.run(&roster, &mut EventLog::new());

    let view = |run: &intern_ai::workflows::allocation::PipelineRun| {
        run.allocations
            .iter()
            .map(|a| (a.candidate_id, a.provider_id, a.score, a.rationale.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(view(&first), view(&second));
    assert_eq!(first.allocations.len(), 4);
}

#[test]
fn service_round_trip_from_run_to_decision() {
    let service = AllocationService::new(repository(), &AllocationConfig::default());
    let roster = Roster::new(
        vec![candidate(1, AcademicLevel::Senior, 3.9, &["Go", "DevOps"], &[])],
        vec![provider(7, SizeClass::Startup, 1, &["Go"], &[])],
    );

    let report = service.run(roster).expect("run succeeds");
    let id = report.allocations[0].allocation_id.clone();
    let decided = service
        .decide(&id, intern_ai::workflows::allocation::Decision::Rejected)
        .expect("decision applies");

    assert_eq!(decided.allocation.status.label(), "rejected");
    assert_eq!(service.list(None).expect("list").len(), 1);
}
