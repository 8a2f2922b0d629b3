use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::super::domain::{Allocation, CandidateId, ProviderId};
use super::super::matcher::CapacityLedger;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub confirmed: usize,
    pub conflicts_resolved: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("{0} was allocated more than once")]
    DuplicateCandidate(CandidateId),
    #[error("{provider} received {allocated} allocations but offered {capacity}")]
    OverCapacity {
        provider: ProviderId,
        allocated: u32,
        capacity: u32,
    },
    #[error("conflict resolution unavailable: {0}")]
    Unavailable(String),
}

/// Final stage collaborator. Implementations may inspect but never rewrite allocations.
pub trait ConflictResolver: Send + Sync {
    fn resolve(
        &self,
        allocations: &[Allocation],
        ledger: &CapacityLedger,
    ) -> Result<Resolution, ResolutionError>;
}

/// Default resolver: confirms the matcher's output without making decisions.
///
/// It reports an error if exclusivity or capacity was somehow violated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmingResolver;

impl ConflictResolver for ConfirmingResolver {
    fn resolve(
        &self,
        allocations: &[Allocation],
        ledger: &CapacityLedger,
    ) -> Result<Resolution, ResolutionError> {
        let mut placed = HashSet::new();
        let mut per_provider: BTreeMap<ProviderId, u32> = BTreeMap::new();

        for allocation in allocations {
            if !placed.insert(allocation.candidate_id) {
                return Err(ResolutionError::DuplicateCandidate(allocation.candidate_id));
            }
            *per_provider.entry(allocation.provider_id).or_default() += 1;
        }

        for (provider, allocated) in per_provider {
            let capacity = ledger.starting(provider);
            if allocated > capacity {
                return Err(ResolutionError::OverCapacity {
                    provider,
                    allocated,
                    capacity,
                });
            }
        }

        Ok(Resolution {
            confirmed: allocations.len(),
            conflicts_resolved: 0,
        })
    }
}
