use proptest::prelude::*;

use super::common::*;
use crate::workflows::allocation::domain::{AcademicLevel, SizeClass};
use crate::workflows::allocation::scoring::{
    compute_score, MatchTier, ScoreFactor, ScoreModel, ScoreWeights,
};

#[test]
fn standard_weights_sum_to_one() {
    let weights = ScoreWeights::standard();
    assert!((weights.total() - 1.0).abs() < 1e-9);
}

#[test]
fn perfect_skill_fit_scores_exceptional() {
    let roster = two_by_two_roster();
    let model = ScoreModel::standard();

    let score = model.score(&roster.candidates[0], &roster.providers[0]);

    assert_eq!(score.sub_score(ScoreFactor::SkillMatch), 100.0);
    assert!(score.total >= 90, "score was {}", score.total);
    assert_eq!(score.tier(), MatchTier::Exceptional);
    assert_eq!(
        model.rationale(&roster.candidates[0], &score),
        "Excellent skill alignment, Strong academic performance, Great cultural fit, Exceptional overall match"
    );
}

#[test]
fn mismatched_pair_has_limited_overlap() {
    let roster = two_by_two_roster();
    let model = ScoreModel::standard();

    let score = model.score(&roster.candidates[1], &roster.providers[0]);

    assert_eq!(score.sub_score(ScoreFactor::SkillMatch), 0.0);
    assert_eq!(score.tier(), MatchTier::Moderate);
    assert_eq!(
        model.rationale(&roster.candidates[1], &score),
        "Limited skill overlap, Moderate compatibility"
    );
}

#[test]
fn absent_lists_fall_back_to_neutral_sub_scores() {
    let candidate = student(1, "Sam Rivera", AcademicLevel::Junior, 3.2, &["Go"], &["Cloud"]);
    let provider = company(1, "OpenFloor", SizeClass::Unspecified, 1, &[], &[]);

    let score = ScoreModel::standard().score(&candidate, &provider);

    assert_eq!(score.sub_score(ScoreFactor::SkillMatch), 50.0);
    assert_eq!(score.sub_score(ScoreFactor::InterestAlignment), 50.0);
    assert_eq!(score.sub_score(ScoreFactor::AcademicFit), 75.0);
    assert_eq!(score.sub_score(ScoreFactor::LocationFit), 70.0);
}

#[test]
fn experience_caps_and_rewards_complex_skills() {
    let candidate = student(
        1,
        "Priya Nair",
        AcademicLevel::Senior,
        3.9,
        &["Rust", "Go", "SQL", "Docker", "Kubernetes", "DevOps", "Cloud Computing"],
        &[],
    );
    let provider = company(1, "Infra Co", SizeClass::Large, 1, &["Rust"], &[]);

    let score = ScoreModel::standard().score(&candidate, &provider);

    assert_eq!(score.sub_score(ScoreFactor::Experience), 100.0);
}

#[test]
fn free_function_matches_standard_model() {
    let roster = two_by_two_roster();
    for candidate in &roster.candidates {
        for provider in &roster.providers {
            assert_eq!(
                compute_score(candidate, provider),
                ScoreModel::standard().compute_score(candidate, provider)
            );
        }
    }
}

#[test]
fn score_ignores_provider_name() {
    let roster = two_by_two_roster();
    let model = ScoreModel::standard();
    let mut renamed = roster.providers[0].clone();
    renamed.name = "Renamed Labs".to_string();

    let original = model.score(&roster.candidates[0], &roster.providers[0]);
    let copy = model.score(&roster.candidates[0], &renamed);

    assert_eq!(original, copy);
}

const SKILL_POOL: [&str; 8] = [
    "Python",
    "Java",
    "JavaScript",
    "SQL",
    "Machine Learning",
    "React",
    "DevOps",
    "Figma",
];

fn level() -> impl Strategy<Value = AcademicLevel> {
    prop_oneof![
        Just(AcademicLevel::Unspecified),
        Just(AcademicLevel::Freshman),
        Just(AcademicLevel::Sophomore),
        Just(AcademicLevel::Junior),
        Just(AcademicLevel::Senior),
    ]
}

fn size() -> impl Strategy<Value = SizeClass> {
    prop_oneof![
        Just(SizeClass::Unspecified),
        Just(SizeClass::Startup),
        Just(SizeClass::Small),
        Just(SizeClass::Medium),
        Just(SizeClass::Large),
    ]
}

fn picks() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::sample::subsequence(SKILL_POOL.to_vec(), 0..=SKILL_POOL.len())
}

proptest! {
    #[test]
    fn scores_stay_within_bounds(
        gpa in 0.0f32..=4.0,
        level in level(),
        size in size(),
        skills in picks(),
        interests in picks(),
        requirements in picks(),
        culture in picks(),
    ) {
        let mut skills = skills;
        if skills.is_empty() {
            skills.push("Python");
        }
        let candidate = student(1, "Prop Student", level, gpa, &skills, &interests);
        let provider = company(1, "Prop Co", size, 1, &requirements, &culture);

        let score = ScoreModel::standard().score(&candidate, &provider);

        prop_assert!(score.total <= 100);
        for component in &score.components {
            prop_assert!((0.0..=100.0).contains(&component.sub_score));
        }
        prop_assert_eq!(score.total, compute_score(&candidate, &provider));
    }
}
