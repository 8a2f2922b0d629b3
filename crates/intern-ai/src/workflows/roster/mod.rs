//! CSV intake for candidate and provider rosters.
//!
//! Candidate headers: `id,name,major,year,gpa,skills,interests` (plus an
//! optional `email`). Provider headers:
//! `id,name,industry,location,size,positions,requirements,culture`.

mod parser;

use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use crate::workflows::allocation::domain::{Candidate, Provider, Roster};
use crate::workflows::allocation::validation::{RosterValidator, ValidationError};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Invalid(ValidationError),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster file: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::Invalid(err) => write!(f, "roster record rejected: {}", err),
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Invalid(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<ValidationError> for RosterImportError {
    fn from(err: ValidationError) -> Self {
        Self::Invalid(err)
    }
}

/// Reads rosters from CSV exports and rejects records the engine would refuse.
#[derive(Debug, Clone, Default)]
pub struct RosterImporter {
    validator: RosterValidator,
}

impl RosterImporter {
    pub fn new(validator: RosterValidator) -> Self {
        Self { validator }
    }

    pub fn candidates_from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<Candidate>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        self.candidates_from_reader(file)
    }

    pub fn candidates_from_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<Vec<Candidate>, RosterImportError> {
        let candidates = parser::parse_candidates(reader)?;
        for candidate in &candidates {
            self.validator.validate_candidate(candidate).map_err(|err| {
                warn!(error = %err, "rejecting candidate row");
                err
            })?;
        }
        Ok(candidates)
    }

    pub fn providers_from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<Provider>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        self.providers_from_reader(file)
    }

    pub fn providers_from_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<Vec<Provider>, RosterImportError> {
        let providers = parser::parse_providers(reader)?;
        for provider in &providers {
            self.validator.validate_provider(provider).map_err(|err| {
                warn!(error = %err, "rejecting provider row");
                err
            })?;
        }
        Ok(providers)
    }

    /// Loads both sides and checks id uniqueness across the combined roster.
    pub fn roster_from_paths<C, P>(
        &self,
        candidates: C,
        providers: P,
    ) -> Result<Roster, RosterImportError>
    where
        C: AsRef<Path>,
        P: AsRef<Path>,
    {
        let roster = Roster::new(
            self.candidates_from_path(candidates)?,
            self.providers_from_path(providers)?,
        );
        self.validator.validate(&roster)?;
        info!(
            candidates = roster.candidates.len(),
            providers = roster.providers.len(),
            "roster imported"
        );
        Ok(roster)
    }
}
