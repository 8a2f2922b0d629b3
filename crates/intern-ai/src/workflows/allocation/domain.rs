use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for students in the candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "student-{}", self.0)
    }
}

/// Identifier wrapper for companies offering placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub u64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "company-{}", self.0)
    }
}

/// Identifier assigned to an allocation once it is stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AllocationId(pub String);

/// Year of study, ordered Freshman < Sophomore < Junior < Senior.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum AcademicLevel {
    Freshman,
    Sophomore,
    Junior,
    Senior,
    /// Labels the scoring tables do not know. Sorts above `Senior`.
    #[default]
    #[serde(other)]
    Unspecified,
}

impl AcademicLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unspecified => "Unspecified",
            Self::Freshman => "Freshman",
            Self::Sophomore => "Sophomore",
            Self::Junior => "Junior",
            Self::Senior => "Senior",
        }
    }

    /// Lenient parse used by roster imports; matches on the leading word.
    pub fn from_label(raw: &str) -> Self {
        match leading_word(raw).as_str() {
            "freshman" => Self::Freshman,
            "sophomore" => Self::Sophomore,
            "junior" => Self::Junior,
            "senior" => Self::Senior,
            _ => Self::Unspecified,
        }
    }
}

/// Company headcount bracket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum SizeClass {
    Startup,
    Small,
    Medium,
    Large,
    /// Unknown headcount label. Sorts above `Large`.
    #[default]
    #[serde(other)]
    Unspecified,
}

impl SizeClass {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unspecified => "Unspecified",
            Self::Startup => "Startup",
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }

    /// Accepts labels such as `"Startup (50-100 employees)"`.
    pub fn from_label(raw: &str) -> Self {
        match leading_word(raw).as_str() {
            "startup" => Self::Startup,
            "small" => Self::Small,
            "medium" => Self::Medium,
            "large" => Self::Large,
            _ => Self::Unspecified,
        }
    }
}

fn leading_word(raw: &str) -> String {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .find(|word| !word.is_empty())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Student profile supplied by the intake collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub level: AcademicLevel,
    pub gpa: f32,
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Company offering a bounded number of internship positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub category: String,
    pub location: String,
    #[serde(default)]
    pub size: SizeClass,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub culture: Vec<String>,
    pub capacity: u32,
}

/// Snapshot of both sides of the market handed to one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub candidates: Vec<Candidate>,
    pub providers: Vec<Provider>,
}

impl Roster {
    pub fn new(candidates: Vec<Candidate>, providers: Vec<Provider>) -> Self {
        Self {
            candidates,
            providers,
        }
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|candidate| candidate.id == id)
    }

    pub fn provider(&self, id: ProviderId) -> Option<&Provider> {
        self.providers.iter().find(|provider| provider.id == id)
    }
}

/// Review lifecycle of an allocation. The engine only ever emits `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl AllocationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub const fn is_final(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// Committed, capacity-respecting pairing produced by the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub provider_id: ProviderId,
    pub provider_name: String,
    pub score: u8,
    pub rationale: String,
    pub status: AllocationStatus,
    pub created_at: DateTime<Utc>,
}
