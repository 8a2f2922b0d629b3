use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::workflows::allocation::domain::{
    AcademicLevel, Candidate, CandidateId, Provider, ProviderId, SizeClass,
};

pub(crate) fn parse_candidates<R: Read>(reader: R) -> Result<Vec<Candidate>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut candidates = Vec::new();
    for record in csv_reader.deserialize::<CandidateRow>() {
        candidates.push(record?.into_candidate());
    }
    Ok(candidates)
}

pub(crate) fn parse_providers<R: Read>(reader: R) -> Result<Vec<Provider>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut providers = Vec::new();
    for record in csv_reader.deserialize::<ProviderRow>() {
        providers.push(record?.into_provider());
    }
    Ok(providers)
}

#[derive(Debug, Deserialize)]
struct CandidateRow {
    id: u64,
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    major: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    year: Option<String>,
    gpa: f32,
    #[serde(default)]
    skills: String,
    #[serde(default)]
    interests: String,
}

impl CandidateRow {
    fn into_candidate(self) -> Candidate {
        Candidate {
            id: CandidateId(self.id),
            name: self.name,
            email: self.email,
            major: self.major,
            level: self
                .year
                .as_deref()
                .map(AcademicLevel::from_label)
                .unwrap_or_default(),
            gpa: self.gpa,
            skills: split_list(&self.skills),
            interests: split_list(&self.interests),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderRow {
    id: u64,
    name: String,
    industry: String,
    location: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    size: Option<String>,
    positions: u32,
    #[serde(default)]
    requirements: String,
    #[serde(default)]
    culture: String,
}

impl ProviderRow {
    fn into_provider(self) -> Provider {
        Provider {
            id: ProviderId(self.id),
            name: self.name,
            category: self.industry,
            location: self.location,
            size: self
                .size
                .as_deref()
                .map(SizeClass::from_label)
                .unwrap_or_default(),
            requirements: split_list(&self.requirements),
            culture: split_list(&self.culture),
            capacity: self.positions,
        }
    }
}

/// Splits a list cell on `,` or `;`, dropping blanks.
fn split_list(cell: &str) -> Vec<String> {
    cell.split([',', ';'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
