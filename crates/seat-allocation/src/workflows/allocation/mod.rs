//! Seat allocation for higher-education admission.
//!
//! Applicants are scored from their academic record, capacity evaluation and declared
//! conditions, then placed greedily through an ordered list of quota segments. Each
//! segment only sees applicants that are eligible for it and still unassigned.

pub mod domain;
pub mod engine;
pub mod export;
pub mod import;
pub mod incidents;
pub mod policy;
pub mod ports;
pub mod router;
pub mod scoring;
pub mod segments;
pub mod service;
pub mod validation;
pub mod workspace;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

pub use domain::{
    AllocationResult, Applicant, ApplicantId, Application, AssignmentState, Program, ProgramId,
};
pub use engine::{AllocationEngine, AllocationOutcome};
pub use export::{CsvResultWriter, RESULT_COLUMNS};
pub use import::CsvAdmissionSource;
pub use incidents::{Incident, IncidentKind, IncidentLog, IncidentSeverity};
pub use policy::{ColumnMapping, FileRoutes, OfferColumns, OutputMetadata, PolicyDocument};
pub use ports::{AdmissionSnapshot, AdmissionSource, ResultSink};
pub use router::allocation_router;
pub use scoring::{ScoreBreakdown, ScoreCalculator, ScoringPolicy};
pub use segments::{Eligibility, SegmentDefinition, SegmentRuleSet};
pub use service::{AllocationProcess, AllocationReport};
pub use validation::{ApplicationListValidator, ValidatedApplications, DEFAULT_MAX_CHOICES};
pub use workspace::{AllocationWorkspace, InputUpload};

/// Structural failures that abort a run. Recoverable problems are incidents instead.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid policy document: {0}")]
    Policy(#[from] serde_json::Error),
    #[error("column mapping is missing required key `{key}`")]
    MissingMapping { key: String },
    #[error("{file} is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        file: &'static str,
        columns: Vec<String>,
    },
    #[error("{file} row {row}: invalid value `{value}` in column {column}")]
    InvalidValue {
        file: &'static str,
        row: usize,
        column: String,
        value: String,
    },
    #[error("applicant {0} appears more than once")]
    DuplicateApplicant(ApplicantId),
    #[error("program {0} appears more than once in the offer")]
    DuplicateProgram(ProgramId),
}

impl AllocationError {
    /// Whether the failure comes from the input data rather than the environment.
    pub fn is_data_error(&self) -> bool {
        match self {
            AllocationError::Io { .. } => false,
            AllocationError::Csv(error) => !matches!(error.kind(), csv::ErrorKind::Io(_)),
            _ => true,
        }
    }
}
