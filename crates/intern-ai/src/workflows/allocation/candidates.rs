use serde::{Deserialize, Serialize};

use super::domain::{Candidate, CandidateId, Provider, ProviderId};
use super::matcher::CapacityLedger;
use super::scoring::ScoreModel;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A scored (candidate, provider) combination awaiting assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub candidate_id: CandidateId,
    pub provider_id: ProviderId,
    pub score: u8,
    pub rationale: String,
}

/// Enumerates every pair whose provider still has open positions.
#[derive(Debug, Clone, Default)]
pub struct CandidateGenerator {
    model: ScoreModel,
}

impl CandidateGenerator {
    pub fn new(model: ScoreModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &ScoreModel {
        &self.model
    }

    /// Scores the full cross product, skipping providers without capacity.
    ///
    /// Output order is candidate-major, provider-minor, matching input order.
    pub fn generate(&self, candidates: &[Candidate], providers: &[Provider]) -> Vec<ScoredPair> {
        let ledger = CapacityLedger::snapshot(providers);
        self.generate_with(candidates, providers, &ledger)
    }

    /// Like [`generate`](Self::generate) but reads capacity from a run ledger.
    pub fn generate_with(
        &self,
        candidates: &[Candidate],
        providers: &[Provider],
        ledger: &CapacityLedger,
    ) -> Vec<ScoredPair> {
        let open: Vec<&Provider> = providers
            .iter()
            .filter(|provider| ledger.remaining(provider.id) > 0)
            .collect();

        #[cfg(feature = "parallel")]
        let pairs = candidates
            .par_iter()
            .flat_map_iter(|candidate| {
                open.iter()
                    .map(move |provider| self.pair(candidate, provider))
            })
            .collect();

        #[cfg(not(feature = "parallel"))]
        let pairs = candidates
            .iter()
            .flat_map(|candidate| open.iter().map(move |provider| self.pair(candidate, provider)))
            .collect();

        pairs
    }

    /// Providers with capacity ranked for one candidate, best first.
    pub fn rank_for(
        &self,
        candidate: &Candidate,
        providers: &[Provider],
        ledger: &CapacityLedger,
    ) -> Vec<ScoredPair> {
        let mut ranked: Vec<ScoredPair> = providers
            .iter()
            .filter(|provider| ledger.remaining(provider.id) > 0)
            .map(|provider| self.pair(candidate, provider))
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.provider_id.cmp(&b.provider_id))
        });
        ranked
    }

    fn pair(&self, candidate: &Candidate, provider: &Provider) -> ScoredPair {
        let score = self.model.score(candidate, provider);
        let rationale = self.model.rationale(candidate, &score);
        ScoredPair {
            candidate_id: candidate.id,
            provider_id: provider.id,
            score: score.total,
            rationale,
        }
    }
}
