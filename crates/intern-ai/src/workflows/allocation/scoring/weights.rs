use serde::{Deserialize, Serialize};

/// Relative weight of each factor in the composite score. Weights sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub skill_match: f64,
    pub gpa: f64,
    pub interest_alignment: f64,
    pub academic_fit: f64,
    pub location_fit: f64,
    pub experience: f64,
}

impl ScoreWeights {
    pub const fn standard() -> Self {
        Self {
            skill_match: 0.40,
            gpa: 0.20,
            interest_alignment: 0.15,
            academic_fit: 0.10,
            location_fit: 0.10,
            experience: 0.05,
        }
    }

    pub fn total(&self) -> f64 {
        self.skill_match
            + self.gpa
            + self.interest_alignment
            + self.academic_fit
            + self.location_fit
            + self.experience
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::standard()
    }
}
