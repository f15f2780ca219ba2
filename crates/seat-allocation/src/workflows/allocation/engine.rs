use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::domain::{
    AllocationResult, Applicant, ApplicantId, AssignmentState, Program, ProgramId,
};
use super::incidents::{Incident, IncidentKind, IncidentLog};
use super::scoring::{ScoreCalculator, ScoringPolicy};
use super::segments::{SegmentDefinition, SegmentRuleSet};
use super::validation::ApplicationListValidator;
use super::AllocationError;

/// Greedy, segment-ordered seat assignment over one input snapshot.
#[derive(Debug, Clone, Default)]
pub struct AllocationEngine {
    calculator: ScoreCalculator,
    validator: ApplicationListValidator,
    rules: SegmentRuleSet,
}

/// Everything a run produces. `applicants` carry their computed scores and accepted
/// choice lists; `programs` carry the remaining seats after the run.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub results: Vec<AllocationResult>,
    pub incidents: IncidentLog,
    pub unassigned: Vec<ApplicantId>,
    pub applicants: Vec<Applicant>,
    pub programs: Vec<Program>,
}

impl AllocationOutcome {
    pub fn result_for(&self, applicant_id: &ApplicantId) -> Option<&AllocationResult> {
        self.results
            .iter()
            .find(|result| &result.applicant_id == applicant_id)
    }

    pub fn incident_messages(&self) -> Vec<String> {
        self.incidents.messages()
    }
}

impl AllocationEngine {
    pub fn new(scoring: ScoringPolicy, max_choices: usize, rules: SegmentRuleSet) -> Self {
        Self {
            calculator: ScoreCalculator::new(scoring),
            validator: ApplicationListValidator::new(max_choices),
            rules,
        }
    }

    pub fn rules(&self) -> &SegmentRuleSet {
        &self.rules
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    pub fn validator(&self) -> &ApplicationListValidator {
        &self.validator
    }

    /// Score, validate and allocate.
    ///
    /// Only structural problems (duplicate applicant or program ids) fail the run. Unknown
    /// programs and over-long choice lists become incidents; exhausted pools simply move the
    /// applicant on to the next choice. An unknown program is reported once per applicant and
    /// program, however many segments walk that applicant.
    pub fn run(
        &self,
        mut applicants: Vec<Applicant>,
        mut programs: Vec<Program>,
    ) -> Result<AllocationOutcome, AllocationError> {
        ensure_unique_applicants(&applicants)?;
        let program_index = index_programs(&programs)?;

        let mut incidents = IncidentLog::new();
        for applicant in applicants.iter_mut() {
            self.calculator.compute(applicant);
            let validated = self.validator.validate(applicant);
            applicant.applications = validated.accepted;
            incidents.extend(validated.incidents);
        }
        info!(applicants = applicants.len(), "postulation scores computed");

        let mut walk = AssignmentWalk {
            applicants: &applicants,
            programs: &mut programs,
            program_index: &program_index,
            states: vec![AssignmentState::Unassigned; applicants.len()],
            results: Vec::new(),
            incidents: &mut incidents,
            reported_unknown: HashSet::new(),
        };

        for (position, segment) in self.rules.segments().iter().enumerate() {
            walk.process_segment(position + 1, segment);
        }

        let AssignmentWalk { states, results, .. } = walk;

        let unassigned: Vec<ApplicantId> = applicants
            .iter()
            .zip(&states)
            .filter(|(_, state)| !state.is_assigned())
            .map(|(applicant, _)| applicant.id.clone())
            .collect();

        info!(
            assigned = results.len(),
            unassigned = unassigned.len(),
            incidents = incidents.len(),
            "allocation finished"
        );

        Ok(AllocationOutcome {
            results,
            incidents,
            unassigned,
            applicants,
            programs,
        })
    }
}

struct AssignmentWalk<'a> {
    applicants: &'a [Applicant],
    programs: &'a mut [Program],
    program_index: &'a HashMap<ProgramId, usize>,
    states: Vec<AssignmentState>,
    results: Vec<AllocationResult>,
    incidents: &'a mut IncidentLog,
    reported_unknown: HashSet<(usize, ProgramId)>,
}

impl AssignmentWalk<'_> {
    fn process_segment(&mut self, order: usize, segment: &SegmentDefinition) {
        let mut candidates: Vec<usize> = self
            .applicants
            .iter()
            .enumerate()
            .filter(|(index, applicant)| {
                !self.states[*index].is_assigned() && segment.is_eligible(applicant)
            })
            .map(|(index, _)| index)
            .collect();

        if candidates.is_empty() {
            debug!(order, segment = %segment.pool_key, "no eligible unassigned applicants");
            return;
        }

        // Stable: equal scores keep input order.
        let applicants = self.applicants;
        candidates.sort_by(|left, right| {
            applicants[*right]
                .postulation_score
                .total_cmp(&applicants[*left].postulation_score)
        });

        info!(
            order,
            segment = %segment.pool_key,
            candidates = candidates.len(),
            "processing segment"
        );

        for index in candidates {
            self.assign_first_available(index, segment);
        }
    }

    fn assign_first_available(&mut self, index: usize, segment: &SegmentDefinition) {
        let applicants = self.applicants;
        let applicant = &applicants[index];

        for application in &applicant.applications {
            let Some(&program_position) = self.program_index.get(&application.program_id) else {
                if self
                    .reported_unknown
                    .insert((index, application.program_id.clone()))
                {
                    self.incidents.record(Incident::new(
                        applicant.id.clone(),
                        IncidentKind::UnknownProgram {
                            program_id: application.program_id.clone(),
                        },
                    ));
                }
                continue;
            };

            let program = &mut self.programs[program_position];
            if program.claim_seat(&segment.pool_key) {
                self.results.push(AllocationResult {
                    applicant_id: applicant.id.clone(),
                    postulation_score: applicant.postulation_score,
                    segment: segment.pool_key.clone(),
                    priority: application.priority,
                    program_id: program.id.clone(),
                    program_name: program.name.clone(),
                });
                self.states[index] = AssignmentState::Assigned {
                    segment: segment.pool_key.clone(),
                    program_id: program.id.clone(),
                    priority: application.priority,
                };
                return;
            }
        }
    }
}

fn ensure_unique_applicants(applicants: &[Applicant]) -> Result<(), AllocationError> {
    let mut seen = HashSet::with_capacity(applicants.len());
    for applicant in applicants {
        if !seen.insert(&applicant.id) {
            return Err(AllocationError::DuplicateApplicant(applicant.id.clone()));
        }
    }
    Ok(())
}

fn index_programs(programs: &[Program]) -> Result<HashMap<ProgramId, usize>, AllocationError> {
    let mut index = HashMap::with_capacity(programs.len());
    for (position, program) in programs.iter().enumerate() {
        if index.insert(program.id.clone(), position).is_some() {
            return Err(AllocationError::DuplicateProgram(program.id.clone()));
        }
    }
    Ok(index)
}
