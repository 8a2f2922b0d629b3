use super::super::domain::{AcademicLevel, Candidate, Provider, SizeClass};

/// Sub-score used whenever the provider publishes no requirements or culture tags.
pub(crate) const NEUTRAL_SCORE: f64 = 50.0;

/// No location-preference model exists yet, so every pair gets the same value.
pub(crate) const LOCATION_SCORE: f64 = 70.0;

pub(crate) const COMPLEX_SKILLS: [&str; 5] = [
    "Machine Learning",
    "AI",
    "Blockchain",
    "DevOps",
    "Cloud Computing",
];

/// Case-insensitive containment in either direction.
///
/// This is a heuristic: "Java" also matches "JavaScript".
pub(crate) fn fuzzy_match(left: &str, right: &str) -> bool {
    let left = left.trim().to_lowercase();
    let right = right.trim().to_lowercase();
    if left.is_empty() || right.is_empty() {
        return false;
    }
    left.contains(&right) || right.contains(&left)
}

/// Case-insensitive `haystack.contains(needle)`; blank needles never match.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    !needle.is_empty() && haystack.trim().to_lowercase().contains(&needle)
}

pub(crate) fn matched_requirements<'a>(
    candidate: &Candidate,
    provider: &'a Provider,
) -> Vec<&'a str> {
    provider
        .requirements
        .iter()
        .filter(|requirement| {
            candidate
                .skills
                .iter()
                .any(|skill| fuzzy_match(skill, requirement))
        })
        .map(String::as_str)
        .collect()
}

pub(crate) fn skill_match(candidate: &Candidate, provider: &Provider) -> f64 {
    if provider.requirements.is_empty() {
        return NEUTRAL_SCORE;
    }

    let matched = matched_requirements(candidate, provider).len();
    matched as f64 / provider.requirements.len() as f64 * 100.0
}

pub(crate) fn gpa_score(gpa: f32) -> f64 {
    if gpa >= 3.8 {
        100.0
    } else if gpa >= 3.5 {
        85.0
    } else if gpa >= 3.0 {
        70.0
    } else if gpa >= 2.5 {
        50.0
    } else {
        30.0
    }
}

pub(crate) fn interest_alignment(candidate: &Candidate, provider: &Provider) -> f64 {
    if provider.culture.is_empty() {
        return NEUTRAL_SCORE;
    }

    let aligned = candidate
        .interests
        .iter()
        .filter(|interest| provider.culture.iter().any(|tag| fuzzy_match(interest, tag)))
        .count();

    aligned as f64 / candidate.interests.len().max(1) as f64 * 100.0
}

pub(crate) fn level_score(level: AcademicLevel) -> f64 {
    match level {
        AcademicLevel::Freshman => 30.0,
        AcademicLevel::Sophomore => 50.0,
        AcademicLevel::Junior => 80.0,
        AcademicLevel::Senior => 100.0,
        AcademicLevel::Unspecified => 50.0,
    }
}

pub(crate) fn size_score(size: SizeClass) -> f64 {
    match size {
        SizeClass::Startup => 90.0,
        SizeClass::Small => 80.0,
        SizeClass::Medium => 70.0,
        SizeClass::Large => 60.0,
        SizeClass::Unspecified => 70.0,
    }
}

pub(crate) fn academic_fit(level: AcademicLevel, size: SizeClass) -> f64 {
    (level_score(level) + size_score(size)) / 2.0
}

pub(crate) fn location_fit(_candidate: &Candidate, _provider: &Provider) -> f64 {
    LOCATION_SCORE
}

pub(crate) fn has_complex_skill(candidate: &Candidate) -> bool {
    candidate.skills.iter().any(|skill| {
        let skill = skill.to_lowercase();
        COMPLEX_SKILLS
            .iter()
            .any(|complex| skill.contains(&complex.to_lowercase()))
    })
}

pub(crate) fn experience_score(candidate: &Candidate) -> f64 {
    let mut score = (candidate.skills.len() as f64 * 10.0).min(60.0);
    if has_complex_skill(candidate) {
        score += 20.0;
    }
    if candidate.gpa >= 3.5 {
        score += 20.0;
    }
    score.min(100.0)
}
