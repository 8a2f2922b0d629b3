//! Qualitative read-outs produced by the analysis and matching stages.
//!
//! Nothing here feeds back into scoring or assignment; the output is surfaced
//! to reviewers alongside the allocations.

use serde::{Deserialize, Serialize};

use super::domain::{AcademicLevel, Candidate, CandidateId, Provider, ProviderId};
use super::scoring::rules::contains_ignore_case;

const CORE_TECH_SKILLS: [&str; 6] = ["Python", "JavaScript", "Java", "C++", "React", "Node.js"];
const COMMON_SKILLS: [&str; 5] = ["Python", "JavaScript", "SQL", "Git", "React"];

/// Profile analysis for a single student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAnalysis {
    pub candidate_id: CandidateId,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub compatibility: u8,
    pub career_paths: Vec<String>,
    pub skill_gaps: Vec<String>,
}

impl CandidateAnalysis {
    pub fn of(candidate: &Candidate) -> Self {
        Self {
            candidate_id: candidate.id,
            strengths: strengths(candidate),
            weaknesses: weaknesses(candidate),
            recommendations: recommendations(candidate),
            compatibility: compatibility(candidate),
            career_paths: career_paths(candidate),
            skill_gaps: skill_gaps(candidate),
        }
    }
}

/// Per-pair commentary attached to a provider ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInsight {
    pub provider_id: ProviderId,
    pub score: u8,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub recommendations: Vec<String>,
}

impl MatchInsight {
    /// Commentary is one-directional, unlike scoring: a skill is shared when a
    /// requirement contains it, and a requirement is missing unless some skill
    /// contains it.
    pub fn of(candidate: &Candidate, provider: &Provider, score: u8) -> Self {
        let missing: Vec<&str> = provider
            .requirements
            .iter()
            .filter(|requirement| {
                !candidate
                    .skills
                    .iter()
                    .any(|skill| contains_ignore_case(skill, requirement))
            })
            .map(String::as_str)
            .collect();

        let mut strengths = Vec::new();
        let shared: Vec<&str> = candidate
            .skills
            .iter()
            .filter(|skill| {
                provider
                    .requirements
                    .iter()
                    .any(|requirement| contains_ignore_case(requirement, skill))
            })
            .map(String::as_str)
            .collect();
        if !shared.is_empty() {
            strengths.push(format!("Shared skills: {}", shared.join(", ")));
        }
        if candidate.gpa >= 3.5 {
            strengths.push("High academic performance".to_string());
        }

        let mut concerns = Vec::new();
        if !missing.is_empty() {
            concerns.push(format!("Missing skills: {}", missing.join(", ")));
        }
        if candidate.gpa < 3.0 {
            concerns.push("Below average GPA".to_string());
        }

        let mut recommendations = Vec::new();
        if !missing.is_empty() {
            let next: Vec<&str> = missing.iter().take(3).copied().collect();
            recommendations.push(format!("Consider learning: {}", next.join(", ")));
        }
        if matches!(
            candidate.level,
            AcademicLevel::Freshman | AcademicLevel::Sophomore
        ) {
            recommendations.push("Great opportunity for early career development".to_string());
        }

        Self {
            provider_id: provider.id,
            score,
            strengths,
            concerns,
            recommendations,
        }
    }
}

fn has_skill(candidate: &Candidate, name: &str) -> bool {
    candidate.skills.iter().any(|skill| skill == name)
}

fn strengths(candidate: &Candidate) -> Vec<String> {
    let mut strengths = Vec::new();
    if candidate.gpa >= 3.5 {
        strengths.push("Strong Academic Performance".to_string());
    }
    if candidate.skills.len() >= 5 {
        strengths.push("Diverse Skill Set".to_string());
    }
    if candidate.interests.len() >= 3 {
        strengths.push("Clear Career Interests".to_string());
    }

    let tech: Vec<&str> = candidate
        .skills
        .iter()
        .map(String::as_str)
        .filter(|skill| CORE_TECH_SKILLS.contains(skill))
        .collect();
    if !tech.is_empty() {
        strengths.push(format!("Strong in {}", tech.join(", ")));
    }
    strengths
}

fn weaknesses(candidate: &Candidate) -> Vec<String> {
    let mut weaknesses = Vec::new();
    if candidate.gpa < 3.0 {
        weaknesses.push("Below Average GPA".to_string());
    }
    if candidate.skills.len() < 3 {
        weaknesses.push("Limited Technical Skills".to_string());
    }
    if candidate.interests.len() < 2 {
        weaknesses.push("Unclear Career Direction".to_string());
    }
    weaknesses
}

fn recommendations(candidate: &Candidate) -> Vec<String> {
    let mut recommendations = Vec::new();
    if candidate.gpa >= 3.5 {
        recommendations.push("Consider applying to competitive tech companies".to_string());
    }
    if has_skill(candidate, "Machine Learning") || has_skill(candidate, "AI") {
        recommendations.push("Excellent fit for AI/ML roles at tech companies".to_string());
    }
    if has_skill(candidate, "React") || has_skill(candidate, "JavaScript") {
        recommendations.push("Strong frontend development opportunities available".to_string());
    }
    if has_skill(candidate, "Python") && has_skill(candidate, "Data Science") {
        recommendations.push("Perfect for data science and analytics positions".to_string());
    }
    if candidate.level == AcademicLevel::Senior {
        recommendations.push("Consider full-time positions or advanced internships".to_string());
    } else {
        recommendations.push("Great time to gain experience through internships".to_string());
    }
    recommendations
}

fn compatibility(candidate: &Candidate) -> u8 {
    let mut score: i32 = 50;

    if candidate.gpa >= 3.5 {
        score += 20;
    } else if candidate.gpa < 3.0 {
        score -= 10;
    }

    if candidate.skills.len() >= 5 {
        score += 15;
    } else if candidate.skills.len() < 3 {
        score -= 15;
    }

    if candidate.interests.len() >= 3 {
        score += 15;
    } else if candidate.interests.len() < 2 {
        score -= 10;
    }

    score.clamp(0, 100) as u8
}

fn career_paths(candidate: &Candidate) -> Vec<String> {
    let mut paths = Vec::new();
    if has_skill(candidate, "Machine Learning") || has_skill(candidate, "AI") {
        paths.push("AI/ML Engineer".to_string());
    }
    if has_skill(candidate, "React") || has_skill(candidate, "JavaScript") {
        paths.push("Frontend Developer".to_string());
    }
    if has_skill(candidate, "Python") && has_skill(candidate, "Data Science") {
        paths.push("Data Scientist".to_string());
    }
    if has_skill(candidate, "Java") || has_skill(candidate, "Spring") {
        paths.push("Backend Developer".to_string());
    }
    if paths.is_empty() {
        paths.push("Software Developer".to_string());
    }
    paths
}

fn skill_gaps(candidate: &Candidate) -> Vec<String> {
    COMMON_SKILLS
        .iter()
        .filter(|common| {
            let common = common.to_lowercase();
            !candidate
                .skills
                .iter()
                .any(|skill| skill.to_lowercase().contains(&common))
        })
        .map(|common| common.to_string())
        .collect()
}
