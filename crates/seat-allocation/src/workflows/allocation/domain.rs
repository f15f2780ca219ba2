use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for applicants. Equality between applicants is by id only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for academic programs (offer ids).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramId(pub String);

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single program choice declared by an applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub program_id: ProgramId,
    /// Smaller is more preferred.
    pub priority: u32,
    pub program_name: String,
}

impl Application {
    pub fn new(program_id: impl Into<String>, priority: u32, program_name: impl Into<String>) -> Self {
        Self {
            program_id: ProgramId(program_id.into()),
            priority,
            program_name: program_name.into(),
        }
    }
}

/// Applicant snapshot consumed by the allocation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Applicant {
    pub id: ApplicantId,
    pub academic_record_score: f64,
    pub evaluation_score: f64,
    /// Affirmative-action and vulnerability flags keyed by column name.
    pub conditions: BTreeMap<String, bool>,
    pub applications: Vec<Application>,
    #[serde(default)]
    pub postulation_score: f64,
}

impl Applicant {
    pub fn new(id: impl Into<String>, academic_record_score: f64, evaluation_score: f64) -> Self {
        Self {
            id: ApplicantId(id.into()),
            academic_record_score,
            evaluation_score,
            conditions: BTreeMap::new(),
            applications: Vec::new(),
            postulation_score: 0.0,
        }
    }

    pub fn with_condition(mut self, flag: impl Into<String>, value: bool) -> Self {
        self.conditions.insert(flag.into(), value);
        self
    }

    pub fn with_application(mut self, application: Application) -> Self {
        self.applications.push(application);
        self
    }

    /// Missing flags read as false.
    pub fn has_condition(&self, flag: &str) -> bool {
        self.conditions.get(flag).copied().unwrap_or(false)
    }
}

impl PartialEq for Applicant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Applicant {}

/// Academic program with its segmented seat pools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    seats: BTreeMap<String, u32>,
    total_seats: u32,
    assigned_seats: u32,
}

impl Program {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        seats: BTreeMap<String, u32>,
    ) -> Self {
        let total_seats = seats.values().sum();
        Self {
            id: ProgramId(id.into()),
            name: name.into(),
            seats,
            total_seats,
            assigned_seats: 0,
        }
    }

    /// Remaining seats in a segment; unknown segments have none.
    pub fn remaining_seats(&self, segment: &str) -> u32 {
        self.seats.get(segment).copied().unwrap_or(0)
    }

    pub fn seats(&self) -> &BTreeMap<String, u32> {
        &self.seats
    }

    /// Sum of all pools at construction time.
    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    pub fn assigned_seats(&self) -> u32 {
        self.assigned_seats
    }

    /// Take one seat from `segment`. Fails without side effects when the pool is empty.
    pub fn claim_seat(&mut self, segment: &str) -> bool {
        match self.seats.get_mut(segment) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                self.assigned_seats += 1;
                true
            }
            _ => false,
        }
    }
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Program {}

/// Seat granted to an applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub applicant_id: ApplicantId,
    pub postulation_score: f64,
    pub segment: String,
    pub priority: u32,
    pub program_id: ProgramId,
    pub program_name: String,
}

/// Per-applicant progress through the segment passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentState {
    Unassigned,
    Assigned {
        segment: String,
        program_id: ProgramId,
        priority: u32,
    },
}

impl AssignmentState {
    pub fn is_assigned(&self) -> bool {
        matches!(self, AssignmentState::Assigned { .. })
    }
}
