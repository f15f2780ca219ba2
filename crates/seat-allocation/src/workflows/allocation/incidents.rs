use std::fmt;

use serde::Serialize;

use super::domain::{ApplicantId, ProgramId};

/// Severity attached to incidents. Incidents never abort a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentSeverity {
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncidentKind {
    ApplicationsTruncated {
        max_choices: usize,
        dropped: Vec<ProgramId>,
    },
    DuplicatePriority {
        priority: u32,
    },
    UnknownProgram {
        program_id: ProgramId,
    },
}

/// Recoverable data-quality event raised while validating or allocating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Incident {
    pub applicant_id: ApplicantId,
    pub severity: IncidentSeverity,
    #[serde(flatten)]
    pub kind: IncidentKind,
}

impl Incident {
    pub fn new(applicant_id: ApplicantId, kind: IncidentKind) -> Self {
        Self {
            applicant_id,
            severity: IncidentSeverity::Warning,
            kind,
        }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            IncidentKind::ApplicationsTruncated {
                max_choices,
                dropped,
            } => {
                let ids: Vec<&str> = dropped.iter().map(|id| id.0.as_str()).collect();
                format!(
                    "applicant {}: ignored {} application(s) (more than {} allowed); dropped programs: [{}]",
                    self.applicant_id,
                    dropped.len(),
                    max_choices,
                    ids.join(", ")
                )
            }
            IncidentKind::DuplicatePriority { priority } => format!(
                "applicant {}: priority {} declared more than once; input order kept",
                self.applicant_id, priority
            ),
            IncidentKind::UnknownProgram { program_id } => format!(
                "applicant {}: application to unknown program {}",
                self.applicant_id, program_id
            ),
        }
    }
}

impl fmt::Display for Incident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Run-scoped incident collector, created per run and handed back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IncidentLog {
    entries: Vec<Incident>,
}

impl IncidentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, incident: Incident) {
        tracing::warn!(applicant = %incident.applicant_id, "{}", incident.message());
        self.entries.push(incident);
    }

    pub fn extend(&mut self, incidents: impl IntoIterator<Item = Incident>) {
        for incident in incidents {
            self.record(incident);
        }
    }

    pub fn entries(&self) -> &[Incident] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(Incident::message).collect()
    }

    pub fn into_entries(self) -> Vec<Incident> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_message_names_applicant_and_dropped_programs() {
        let incident = Incident::new(
            ApplicantId("0912345678".to_string()),
            IncidentKind::ApplicationsTruncated {
                max_choices: 4,
                dropped: vec![ProgramId("P5".to_string())],
            },
        );

        let message = incident.message();
        assert!(message.contains("0912345678"));
        assert!(message.contains("ignored 1 application(s)"));
        assert!(message.contains("[P5]"));
        assert_eq!(incident.severity, IncidentSeverity::Warning);
    }

    #[test]
    fn log_preserves_insertion_order() {
        let mut log = IncidentLog::new();
        log.record(Incident::new(
            ApplicantId("A".to_string()),
            IncidentKind::UnknownProgram {
                program_id: ProgramId("X".to_string()),
            },
        ));
        log.record(Incident::new(
            ApplicantId("B".to_string()),
            IncidentKind::DuplicatePriority { priority: 2 },
        ));

        let messages = log.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("applicant A"));
        assert!(messages[1].starts_with("applicant B"));
    }
}
