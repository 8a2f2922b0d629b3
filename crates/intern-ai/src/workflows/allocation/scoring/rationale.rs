use super::super::domain::Candidate;
use super::MatchScore;
use super::ScoreFactor;

/// Qualitative tier for a composite score, also used by allocation summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exceptional,
    VeryGood,
    Good,
    Moderate,
}

impl MatchTier {
    pub fn for_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::Exceptional,
            80..=89 => Self::VeryGood,
            70..=79 => Self::Good,
            _ => Self::Moderate,
        }
    }

    pub const fn phrase(self) -> &'static str {
        match self {
            Self::Exceptional => "Exceptional overall match",
            Self::VeryGood => "Very good match",
            Self::Good => "Good potential match",
            Self::Moderate => "Moderate compatibility",
        }
    }
}

/// Builds the audit rationale: skill tier, academic note, culture note, overall tier.
pub(crate) fn compose(candidate: &Candidate, score: &MatchScore) -> String {
    let mut reasons = Vec::with_capacity(4);

    let skill_match = score.sub_score(ScoreFactor::SkillMatch);
    if skill_match >= 80.0 {
        reasons.push("Excellent skill alignment");
    } else if skill_match >= 60.0 {
        reasons.push("Good skill match");
    } else {
        reasons.push("Limited skill overlap");
    }

    if candidate.gpa >= 3.5 {
        reasons.push("Strong academic performance");
    }

    if score.sub_score(ScoreFactor::InterestAlignment) >= 70.0 {
        reasons.push("Great cultural fit");
    }

    reasons.push(MatchTier::for_score(score.total).phrase());

    reasons.join(", ")
}
