mod config;
mod rules;

pub use config::{
    ScoringPolicy, ACADEMIC_WEIGHT_KEY, AFFIRMATIVE_ACTION_FLAGS, DEFAULT_VULNERABILITY_FLAGS,
    EVALUATION_WEIGHT_KEY, VULNERABILITY_BASE_KEY, VULNERABILITY_MAX_KEY,
};

use super::domain::Applicant;
use serde::Serialize;

/// Stateless calculator that applies the scoring policy to an applicant.
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    policy: ScoringPolicy,
}

impl ScoreCalculator {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Compute the postulation score and store it on the applicant.
    pub fn compute(&self, applicant: &mut Applicant) -> f64 {
        let score = self.breakdown(applicant).total;
        applicant.postulation_score = score;
        score
    }

    pub fn breakdown(&self, applicant: &Applicant) -> ScoreBreakdown {
        rules::score_applicant(applicant, &self.policy)
    }
}

/// Score components kept for audits; `total` is what ranks applicants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub weighted_base: f64,
    pub affirmative_bonus: f64,
    pub vulnerability_bonus: f64,
    pub total: f64,
}
