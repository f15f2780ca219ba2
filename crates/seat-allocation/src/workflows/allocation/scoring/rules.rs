use super::super::domain::Applicant;
use super::config::{ScoringPolicy, AFFIRMATIVE_ACTION_FLAGS};
use super::ScoreBreakdown;

pub(crate) const SCORE_CEILING: f64 = 1000.0;

pub(crate) fn score_applicant(applicant: &Applicant, policy: &ScoringPolicy) -> ScoreBreakdown {
    let weighted_base = applicant.academic_record_score * policy.academic_weight()
        + applicant.evaluation_score * policy.evaluation_weight();

    let affirmative_bonus: f64 = AFFIRMATIVE_ACTION_FLAGS
        .iter()
        .filter(|flag| applicant.has_condition(flag))
        .map(|flag| policy.bonus_for(flag))
        .sum();

    let vulnerability_count = policy
        .vulnerability_flags
        .iter()
        .filter(|flag| applicant.has_condition(flag))
        .count();
    let raw_vulnerability = vulnerability_count as f64 * policy.vulnerability_base();
    let vulnerability_bonus = raw_vulnerability.min(policy.vulnerability_cap());

    let total = round_to_hundredths(weighted_base + affirmative_bonus + vulnerability_bonus)
        .min(SCORE_CEILING);

    ScoreBreakdown {
        weighted_base,
        affirmative_bonus,
        vulnerability_bonus,
        total,
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
