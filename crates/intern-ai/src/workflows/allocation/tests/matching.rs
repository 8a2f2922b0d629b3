use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use proptest::prelude::*;

use super::common::*;
use crate::workflows::allocation::candidates::CandidateGenerator;
use crate::workflows::allocation::domain::{
    AcademicLevel, Allocation, CandidateId, ProviderId, Roster, SizeClass,
};
use crate::workflows::allocation::matcher::{CapacityLedger, MatchContext, Matcher};

fn allocate(roster: &Roster) -> (Vec<Allocation>, CapacityLedger) {
    let generator = CandidateGenerator::default();
    let mut ledger = CapacityLedger::snapshot(&roster.providers);
    let pairs = generator.generate_with(&roster.candidates, &roster.providers, &ledger);
    let allocations = Matcher::new().assign(
        pairs,
        MatchContext {
            candidates: &roster.candidates,
            providers: &roster.providers,
            created_at: Utc::now(),
        },
        &mut ledger,
    );
    (allocations, ledger)
}

#[test]
fn each_student_lands_on_their_skill_match() {
    let roster = two_by_two_roster();

    let (allocations, ledger) = allocate(&roster);

    let pairs: Vec<(CandidateId, ProviderId)> = allocations
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
    assert!(allocations[0].score >= 90);
    assert_eq!(ledger.total_remaining(), 0);
}

#[test]
fn stronger_gpa_wins_a_contested_seat() {
    let roster = contested_seat_roster();

    let (allocations, ledger) = allocate(&roster);

    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].candidate_id, CandidateId(1));
    assert_eq!(allocations[0].candidate_name, "Xavier Chen");
    assert_eq!(ledger.remaining(ProviderId(1)), 0);
}

#[test]
fn generator_skips_providers_without_capacity() {
    let mut roster = two_by_two_roster();
    roster.providers[1].capacity = 0;

    let pairs = CandidateGenerator::default().generate(&roster.candidates, &roster.providers);

    assert_eq!(pairs.len(), 2);
    assert!(pairs.iter().all(|pair| pair.provider_id == ProviderId(1)));
}

#[test]
fn ranking_orders_providers_best_first() {
    let roster = two_by_two_roster();
    let ledger = CapacityLedger::snapshot(&roster.providers);

    let ranked =
        CandidateGenerator::default().rank_for(&roster.candidates[1], &roster.providers, &ledger);

    let order: Vec<ProviderId> = ranked.iter().map(|pair| pair.provider_id).collect();
    assert_eq!(order, vec![ProviderId(2), ProviderId(1)]);
}

#[test]
fn java_requirement_also_matches_javascript_skill() {
    let candidate = student(1, "Jo Park", AcademicLevel::Junior, 3.0, &["JavaScript"], &[]);
    let provider = company(1, "Backend Inc", SizeClass::Medium, 1, &["Java"], &[]);
    let roster = Roster::new(vec![candidate], vec![provider]);

    let (allocations, _) = allocate(&roster);

    assert_eq!(allocations.len(), 1);
    assert!(allocations[0].rationale.starts_with("Excellent skill alignment"));
}

const SKILLS: [&str; 6] = ["Python", "Java", "SQL", "React", "Machine Learning", "Go"];

fn roster_strategy() -> impl Strategy<Value = Roster> {
    let candidates = proptest::collection::vec(
        (
            0.0f32..=4.0,
            proptest::sample::subsequence(SKILLS.to_vec(), 1..=3),
        ),
        0..8,
    );
    let providers = proptest::collection::vec(
        (0u32..4, proptest::sample::subsequence(SKILLS.to_vec(), 0..=3)),
        0..5,
    );

    (candidates, providers).prop_map(|(candidates, providers)| {
        Roster::new(
            candidates
                .into_iter()
                .enumerate()
                .map(|(index, (gpa, skills))| {
                    student(
                        index as u64 + 1,
                        &format!("Student {index}"),
                        AcademicLevel::Junior,
                        gpa,
                        &skills,
                        &[],
                    )
                })
                .collect(),
            providers
                .into_iter()
                .enumerate()
                .map(|(index, (capacity, requirements))| {
                    company(
                        index as u64 + 1,
                        &format!("Company {index}"),
                        SizeClass::Small,
                        capacity,
                        &requirements,
                        &[],
                    )
                })
                .collect(),
        )
    })
}

proptest! {
    #[test]
    fn assignments_respect_capacity_and_exclusivity(roster in roster_strategy()) {
        let (allocations, ledger) = allocate(&roster);

        let mut per_provider: BTreeMap<ProviderId, u32> = BTreeMap::new();
        let mut placed = HashSet::new();
        for allocation in &allocations {
            prop_assert!(placed.insert(allocation.candidate_id));
            *per_provider.entry(allocation.provider_id).or_default() += 1;
        }
        for provider in &roster.providers {
            let used = per_provider.get(&provider.id).copied().unwrap_or(0);
            prop_assert!(used <= provider.capacity);
            prop_assert_eq!(ledger.consumed(provider.id), used);
        }
    }

    #[test]
    fn allocations_come_out_sorted_by_score(roster in roster_strategy()) {
        let (allocations, _) = allocate(&roster);
        prop_assert!(allocations.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }

    #[test]
    fn identical_inputs_allocate_identically(roster in roster_strategy()) {
        let (first, _) = allocate(&roster);
        let (second, _) = allocate(&roster);

        let key = |allocations: &[Allocation]| -> Vec<(CandidateId, ProviderId, u8, String)> {
            allocations
                .iter()
                .map(|a| (a.candidate_id, a.provider_id, a.score, a.rationale.clone()))
                .collect()
        };
        prop_assert_eq!(key(&first), key(&second));
    }

    #[test]
    fn placements_never_exceed_open_seats(roster in roster_strategy()) {
        let (allocations, _) = allocate(&roster);
        let seats: u64 = roster.providers.iter().map(|p| u64::from(p.capacity)).sum();
        prop_assert!(allocations.len() as u64 <= seats.min(roster.candidates.len() as u64));
    }
}
