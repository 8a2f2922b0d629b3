mod rationale;
pub(crate) mod rules;
mod weights;

pub use rationale::MatchTier;
pub use weights::ScoreWeights;

use super::domain::{Candidate, Provider};
use serde::{Deserialize, Serialize};

/// The six factors blended into a compatibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    SkillMatch,
    Gpa,
    InterestAlignment,
    AcademicFit,
    LocationFit,
    Experience,
}

impl ScoreFactor {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::SkillMatch,
            Self::Gpa,
            Self::InterestAlignment,
            Self::AcademicFit,
            Self::LocationFit,
            Self::Experience,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SkillMatch => "Skill match",
            Self::Gpa => "GPA",
            Self::InterestAlignment => "Interest alignment",
            Self::AcademicFit => "Academic level fit",
            Self::LocationFit => "Location fit",
            Self::Experience => "Experience",
        }
    }

    fn weight(self, weights: &ScoreWeights) -> f64 {
        match self {
            Self::SkillMatch => weights.skill_match,
            Self::Gpa => weights.gpa,
            Self::InterestAlignment => weights.interest_alignment,
            Self::AcademicFit => weights.academic_fit,
            Self::LocationFit => weights.location_fit,
            Self::Experience => weights.experience,
        }
    }
}

/// One factor's contribution, kept so rationales and audits can be traced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    /// Sub-score on the 0..=100 scale, before weighting.
    pub sub_score: f64,
    pub weight: f64,
}

impl ScoreComponent {
    pub fn weighted(&self) -> f64 {
        self.sub_score * self.weight
    }
}

/// Composite score plus the components it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub total: u8,
    pub components: Vec<ScoreComponent>,
}

impl MatchScore {
    pub fn sub_score(&self, factor: ScoreFactor) -> f64 {
        self.components
            .iter()
            .find(|component| component.factor == factor)
            .map(|component| component.sub_score)
            .unwrap_or(0.0)
    }

    pub fn tier(&self) -> MatchTier {
        MatchTier::for_score(self.total)
    }
}

/// Stateless scorer for (candidate, provider) pairs.
#[derive(Debug, Clone, Default)]
pub struct ScoreModel {
    weights: ScoreWeights,
}

impl ScoreModel {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn standard() -> Self {
        Self::new(ScoreWeights::standard())
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    pub fn score(&self, candidate: &Candidate, provider: &Provider) -> MatchScore {
        let components: Vec<ScoreComponent> = ScoreFactor::ordered()
            .into_iter()
            .map(|factor| ScoreComponent {
                factor,
                sub_score: sub_score(factor, candidate, provider),
                weight: factor.weight(&self.weights),
            })
            .collect();

        let weighted: f64 = components.iter().map(ScoreComponent::weighted).sum();
        let total = weighted.round().clamp(0.0, 100.0) as u8;

        MatchScore { total, components }
    }

    pub fn compute_score(&self, candidate: &Candidate, provider: &Provider) -> u8 {
        self.score(candidate, provider).total
    }

    /// Human-readable explanation derived from the same thresholds as the score.
    pub fn rationale(&self, candidate: &Candidate, score: &MatchScore) -> String {
        rationale::compose(candidate, score)
    }
}

/// Scores a pair with the standard weights.
pub fn compute_score(candidate: &Candidate, provider: &Provider) -> u8 {
    ScoreModel::standard().compute_score(candidate, provider)
}

fn sub_score(factor: ScoreFactor, candidate: &Candidate, provider: &Provider) -> f64 {
    match factor {
        ScoreFactor::SkillMatch => rules::skill_match(candidate, provider),
        ScoreFactor::Gpa => rules::gpa_score(candidate.gpa),
        ScoreFactor::InterestAlignment => rules::interest_alignment(candidate, provider),
        ScoreFactor::AcademicFit => rules::academic_fit(candidate.level, provider.size),
        ScoreFactor::LocationFit => rules::location_fit(candidate, provider),
        ScoreFactor::Experience => rules::experience_score(candidate),
    }
}
