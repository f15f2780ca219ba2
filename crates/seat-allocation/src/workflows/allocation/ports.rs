use serde::Serialize;

use super::domain::{AllocationResult, Applicant, Program};
use super::AllocationError;

/// Applicants and programs loaded for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdmissionSnapshot {
    pub applicants: Vec<Applicant>,
    pub programs: Vec<Program>,
}

/// Input adapter so the allocation process can be exercised without files.
pub trait AdmissionSource: Send + Sync {
    fn load(&self) -> Result<AdmissionSnapshot, AllocationError>;
}

/// Output adapter receiving the final result set, including an empty one.
pub trait ResultSink: Send + Sync {
    fn write(&self, results: &[AllocationResult]) -> Result<(), AllocationError>;

    /// Human-readable destination used in logs and responses.
    fn location(&self) -> String;
}
