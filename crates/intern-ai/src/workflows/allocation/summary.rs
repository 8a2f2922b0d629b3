use serde::{Deserialize, Serialize};

use super::domain::Allocation;

/// Roll-up shown beside a run's allocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub allocated: usize,
    pub candidates: usize,
    pub average_score: u8,
    pub excellent: usize,
    pub good: usize,
    pub moderate: usize,
    /// Share of candidates placed, 0-100.
    pub placement_rate: u8,
}

impl AllocationSummary {
    pub const EXCELLENT_FLOOR: u8 = 90;
    pub const GOOD_FLOOR: u8 = 80;

    pub fn from_allocations(allocations: &[Allocation], candidates: usize) -> Self {
        let mut summary = Self {
            allocated: allocations.len(),
            candidates,
            ..Self::default()
        };

        for allocation in allocations {
            match allocation.score {
                score if score >= Self::EXCELLENT_FLOOR => summary.excellent += 1,
                score if score >= Self::GOOD_FLOOR => summary.good += 1,
                _ => summary.moderate += 1,
            }
        }

        if !allocations.is_empty() {
            let total: u32 = allocations.iter().map(|a| u32::from(a.score)).sum();
            summary.average_score = (f64::from(total) / allocations.len() as f64).round() as u8;
        }
        if candidates > 0 {
            let rate = allocations.len() as f64 / candidates as f64 * 100.0;
            summary.placement_rate = rate.round().min(100.0) as u8;
        }

        summary
    }
}
