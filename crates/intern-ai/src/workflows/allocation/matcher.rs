//! Greedy capacity-constrained assignment.
//!
//! Pairs are committed best score first. This approximates a maximum-weight
//! bipartite matching (providers expose `capacity` slots each) and is not
//! optimal: a high-scoring early commit can block two later pairs whose
//! combined score is larger. That trade-off is accepted.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::candidates::ScoredPair;
use super::domain::{Allocation, AllocationStatus, Candidate, CandidateId, Provider, ProviderId};

/// Run-scoped copy of provider capacities.
///
/// The matcher only ever decrements this ledger; the caller decides whether to
/// write the remaining counts back with [`CapacityLedger::apply_to`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapacityLedger {
    starting: BTreeMap<ProviderId, u32>,
    remaining: BTreeMap<ProviderId, u32>,
}

impl CapacityLedger {
    pub fn snapshot(providers: &[Provider]) -> Self {
        let starting: BTreeMap<ProviderId, u32> = providers
            .iter()
            .map(|provider| (provider.id, provider.capacity))
            .collect();
        Self {
            remaining: starting.clone(),
            starting,
        }
    }

    pub fn remaining(&self, provider: ProviderId) -> u32 {
        self.remaining.get(&provider).copied().unwrap_or(0)
    }

    pub fn starting(&self, provider: ProviderId) -> u32 {
        self.starting.get(&provider).copied().unwrap_or(0)
    }

    pub fn consumed(&self, provider: ProviderId) -> u32 {
        self.starting(provider) - self.remaining(provider)
    }

    /// Takes one slot; returns `false` when the provider is full or unknown.
    pub fn consume(&mut self, provider: ProviderId) -> bool {
        match self.remaining.get_mut(&provider) {
            Some(slots) if *slots > 0 => {
                *slots -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn remaining_by_provider(&self) -> &BTreeMap<ProviderId, u32> {
        &self.remaining
    }

    pub fn total_remaining(&self) -> u64 {
        self.remaining.values().map(|slots| u64::from(*slots)).sum()
    }

    /// Writes remaining capacity back onto the caller's providers.
    pub fn apply_to(&self, providers: &mut [Provider]) {
        for provider in providers {
            if let Some(slots) = self.remaining.get(&provider.id) {
                provider.capacity = *slots;
            }
        }
    }
}

/// Orders pairs by score descending, then candidate id, then provider id.
pub fn compare_pairs(a: &ScoredPair, b: &ScoredPair) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        .then_with(|| a.provider_id.cmp(&b.provider_id))
}

/// Borrowed roster data the matcher needs to materialize allocations.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub candidates: &'a [Candidate],
    pub providers: &'a [Provider],
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher;

impl Matcher {
    pub fn new() -> Self {
        Self
    }

    /// Commits pairs greedily. The ledger is mutated in place, one slot per commit.
    ///
    /// Candidates without an open provider are left out of the result.
    pub fn assign(
        &self,
        mut pairs: Vec<ScoredPair>,
        context: MatchContext<'_>,
        ledger: &mut CapacityLedger,
    ) -> Vec<Allocation> {
        pairs.sort_by(compare_pairs);

        let candidate_names: HashMap<CandidateId, &str> = context
            .candidates
            .iter()
            .map(|candidate| (candidate.id, candidate.name.as_str()))
            .collect();
        let provider_names: HashMap<ProviderId, &str> = context
            .providers
            .iter()
            .map(|provider| (provider.id, provider.name.as_str()))
            .collect();

        let mut placed: HashSet<CandidateId> = HashSet::new();
        let mut allocations = Vec::new();

        for pair in pairs {
            if placed.contains(&pair.candidate_id) {
                continue;
            }
            let (Some(candidate_name), Some(provider_name)) = (
                candidate_names.get(&pair.candidate_id),
                provider_names.get(&pair.provider_id),
            ) else {
                continue;
            };
            if !ledger.consume(pair.provider_id) {
                continue;
            }

            debug!(
                candidate = %pair.candidate_id,
                provider = %pair.provider_id,
                score = pair.score,
                "committed allocation"
            );
            placed.insert(pair.candidate_id);
            allocations.push(Allocation {
                candidate_id: pair.candidate_id,
                candidate_name: candidate_name.to_string(),
                provider_id: pair.provider_id,
                provider_name: provider_name.to_string(),
                score: pair.score,
                rationale: pair.rationale,
                status: AllocationStatus::Pending,
                created_at: context.created_at,
            });
        }

        allocations
    }
}
