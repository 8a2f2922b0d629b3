use std::collections::HashSet;

use super::domain::{Candidate, CandidateId, Provider, ProviderId, Roster};

/// Structural problems that stop a run before any scoring happens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} for {record} must be between {min} and {max} characters (found {found})")]
    FieldLength {
        record: String,
        field: &'static str,
        min: usize,
        max: usize,
        found: usize,
    },
    #[error("gpa for {candidate} must be within 0.0..=4.0 (found {found})")]
    GpaOutOfRange { candidate: CandidateId, found: f32 },
    #[error("{candidate} lists no skills")]
    MissingSkills { candidate: CandidateId },
    #[error("capacity for {provider} exceeds {max} positions (found {found})")]
    CapacityTooLarge {
        provider: ProviderId,
        max: u32,
        found: u32,
    },
    #[error("{0} appears more than once in the roster")]
    DuplicateCandidate(CandidateId),
    #[error("{0} appears more than once in the roster")]
    DuplicateProvider(ProviderId),
}

/// Bounds applied to intake records.
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    pub name_length: (usize, usize),
    pub category_length: (usize, usize),
    pub location_length: (usize, usize),
    pub max_capacity: u32,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            name_length: (2, 100),
            category_length: (2, 50),
            location_length: (2, 100),
            max_capacity: 100,
        }
    }
}

/// Guard that rejects malformed rosters before they reach the score model.
#[derive(Debug, Clone, Default)]
pub struct RosterValidator {
    policy: ValidationPolicy,
}

impl RosterValidator {
    pub fn with_policy(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn validate(&self, roster: &Roster) -> Result<(), ValidationError> {
        self.validate_parts(&roster.candidates, &roster.providers)
    }

    pub fn validate_parts(
        &self,
        candidates: &[Candidate],
        providers: &[Provider],
    ) -> Result<(), ValidationError> {
        let mut seen_candidates = HashSet::new();
        for candidate in candidates {
            if !seen_candidates.insert(candidate.id) {
                return Err(ValidationError::DuplicateCandidate(candidate.id));
            }
            self.validate_candidate(candidate)?;
        }

        let mut seen_providers = HashSet::new();
        for provider in providers {
            if !seen_providers.insert(provider.id) {
                return Err(ValidationError::DuplicateProvider(provider.id));
            }
            self.validate_provider(provider)?;
        }

        Ok(())
    }

    pub fn validate_candidate(&self, candidate: &Candidate) -> Result<(), ValidationError> {
        check_length(
            candidate.id.to_string(),
            "name",
            &candidate.name,
            self.policy.name_length,
        )?;

        if !candidate.gpa.is_finite() || !(0.0..=4.0).contains(&candidate.gpa) {
            return Err(ValidationError::GpaOutOfRange {
                candidate: candidate.id,
                found: candidate.gpa,
            });
        }

        if candidate.skills.iter().all(|skill| skill.trim().is_empty()) {
            return Err(ValidationError::MissingSkills {
                candidate: candidate.id,
            });
        }

        Ok(())
    }

    pub fn validate_provider(&self, provider: &Provider) -> Result<(), ValidationError> {
        let record = provider.id.to_string();
        check_length(
            record.clone(),
            "name",
            &provider.name,
            self.policy.name_length,
        )?;
        check_length(
            record.clone(),
            "category",
            &provider.category,
            self.policy.category_length,
        )?;
        check_length(
            record,
            "location",
            &provider.location,
            self.policy.location_length,
        )?;

        if provider.capacity > self.policy.max_capacity {
            return Err(ValidationError::CapacityTooLarge {
                provider: provider.id,
                max: self.policy.max_capacity,
                found: provider.capacity,
            });
        }

        Ok(())
    }
}

fn check_length(
    record: String,
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
) -> Result<(), ValidationError> {
    let found = value.trim().chars().count();
    if found < min || found > max {
        return Err(ValidationError::FieldLength {
            record,
            field,
            min,
            max,
            found,
        });
    }
    Ok(())
}
