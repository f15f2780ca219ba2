use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::workflows::allocation::domain::{AllocationResult, Applicant, Application, Program};
use crate::workflows::allocation::ports::{AdmissionSnapshot, AdmissionSource, ResultSink};
use crate::workflows::allocation::scoring::ScoringPolicy;
use crate::workflows::allocation::segments::{GENERAL_POOL, QUOTA_POLICY_POOL};
use crate::workflows::allocation::{AllocationEngine, AllocationError, SegmentRuleSet};

/// Applicant whose academic and evaluation scores are both `score`, so the
/// postulation score equals `score` under equal weights.
pub(super) fn applicant(id: &str, score: f64, choices: &[&str]) -> Applicant {
    let mut applicant = Applicant::new(id, score, score);
    for (position, program_id) in choices.iter().enumerate() {
        applicant = applicant.with_application(Application::new(
            *program_id,
            position as u32 + 1,
            format!("Program {program_id}"),
        ));
    }
    applicant
}

pub(super) fn program(id: &str, pools: &[(&str, u32)]) -> Program {
    let seats: BTreeMap<String, u32> = pools
        .iter()
        .map(|(pool, seats)| (pool.to_string(), *seats))
        .collect();
    Program::new(id, format!("Program {id}"), seats)
}

pub(super) fn general_program(id: &str, seats: u32) -> Program {
    program(id, &[(QUOTA_POLICY_POOL, 0), (GENERAL_POOL, seats)])
}

pub(super) fn engine() -> AllocationEngine {
    AllocationEngine::new(ScoringPolicy::default(), 5, SegmentRuleSet::standard())
}

pub(super) fn engine_with_max_choices(max_choices: usize) -> AllocationEngine {
    AllocationEngine::new(
        ScoringPolicy::default(),
        max_choices,
        SegmentRuleSet::standard(),
    )
}

#[derive(Clone)]
pub(super) struct MemorySource {
    snapshot: AdmissionSnapshot,
}

impl MemorySource {
    pub(super) fn new(applicants: Vec<Applicant>, programs: Vec<Program>) -> Self {
        Self {
            snapshot: AdmissionSnapshot {
                applicants,
                programs,
            },
        }
    }
}

impl AdmissionSource for MemorySource {
    fn load(&self) -> Result<AdmissionSnapshot, AllocationError> {
        Ok(self.snapshot.clone())
    }
}

pub(super) struct UnavailableSource;

impl AdmissionSource for UnavailableSource {
    fn load(&self) -> Result<AdmissionSnapshot, AllocationError> {
        Err(AllocationError::MissingColumns {
            file: "academic offer file",
            columns: vec!["OFERTA_GENERAL".to_string()],
        })
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySink {
    writes: Arc<Mutex<Vec<Vec<AllocationResult>>>>,
}

impl MemorySink {
    pub(super) fn writes(&self) -> Vec<Vec<AllocationResult>> {
        self.writes.lock().expect("sink mutex poisoned").clone()
    }
}

impl ResultSink for MemorySink {
    fn write(&self, results: &[AllocationResult]) -> Result<(), AllocationError> {
        self.writes
            .lock()
            .expect("sink mutex poisoned")
            .push(results.to_vec());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
