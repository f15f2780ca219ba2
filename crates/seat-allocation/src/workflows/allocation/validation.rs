use std::collections::BTreeSet;

use super::domain::{Applicant, Application};
use super::incidents::{Incident, IncidentKind};

pub const DEFAULT_MAX_CHOICES: usize = 5;

/// Choice list accepted for allocation plus the incidents raised while checking it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedApplications {
    pub accepted: Vec<Application>,
    pub incidents: Vec<Incident>,
}

/// Enforces the maximum number of choices per applicant.
#[derive(Debug, Clone, Copy)]
pub struct ApplicationListValidator {
    max_choices: usize,
}

impl Default for ApplicationListValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHOICES)
    }
}

impl ApplicationListValidator {
    pub fn new(max_choices: usize) -> Self {
        Self { max_choices }
    }

    pub fn max_choices(&self) -> usize {
        self.max_choices
    }

    /// Sort choices by priority and drop everything past the limit.
    ///
    /// The sort is stable, so choices sharing a priority keep their input order. Each
    /// repeated priority is reported once. The applicant is left untouched; callers swap
    /// in `accepted` before allocation starts.
    pub fn validate(&self, applicant: &Applicant) -> ValidatedApplications {
        let mut ordered = applicant.applications.clone();
        ordered.sort_by_key(|application| application.priority);

        let mut incidents = Vec::new();

        let mut seen = BTreeSet::new();
        let mut repeated = BTreeSet::new();
        for application in &ordered {
            if !seen.insert(application.priority) {
                repeated.insert(application.priority);
            }
        }
        for priority in repeated {
            incidents.push(Incident::new(
                applicant.id.clone(),
                IncidentKind::DuplicatePriority { priority },
            ));
        }

        if ordered.len() > self.max_choices {
            let dropped = ordered.split_off(self.max_choices);
            incidents.push(Incident::new(
                applicant.id.clone(),
                IncidentKind::ApplicationsTruncated {
                    max_choices: self.max_choices,
                    dropped: dropped
                        .into_iter()
                        .map(|application| application.program_id)
                        .collect(),
                },
            ));
        }

        ValidatedApplications {
            accepted: ordered,
            incidents,
        }
    }
}
