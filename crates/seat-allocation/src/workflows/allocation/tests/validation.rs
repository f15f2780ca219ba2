use crate::workflows::allocation::domain::{Applicant, Application};
use crate::workflows::allocation::incidents::IncidentKind;
use crate::workflows::allocation::validation::ApplicationListValidator;

fn applicant_with_priorities(priorities: &[u32]) -> Applicant {
    priorities
        .iter()
        .enumerate()
        .fold(Applicant::new("A-1", 80.0, 80.0), |applicant, (index, priority)| {
            applicant.with_application(Application::new(
                format!("P{}", index + 1),
                *priority,
                "Program",
            ))
        })
}

#[test]
fn lists_within_limit_are_sorted_without_incidents() {
    let validator = ApplicationListValidator::new(4);
    let validated = validator.validate(&applicant_with_priorities(&[3, 1, 2]));

    let priorities: Vec<u32> = validated.accepted.iter().map(|a| a.priority).collect();
    assert_eq!(priorities, vec![1, 2, 3]);
    assert!(validated.incidents.is_empty());
}

#[test]
fn long_lists_keep_the_most_preferred_choices() {
    let validator = ApplicationListValidator::new(4);
    let validated = validator.validate(&applicant_with_priorities(&[5, 4, 3, 2, 1]));

    let priorities: Vec<u32> = validated.accepted.iter().map(|a| a.priority).collect();
    assert_eq!(priorities, vec![1, 2, 3, 4]);
    assert_eq!(validated.incidents.len(), 1);

    match &validated.incidents[0].kind {
        IncidentKind::ApplicationsTruncated {
            max_choices,
            dropped,
        } => {
            assert_eq!(*max_choices, 4);
            assert_eq!(dropped.len(), 1);
            assert_eq!(dropped[0].0, "P1", "priority 5 was declared first");
        }
        other => panic!("expected truncation incident, got {other:?}"),
    }
}

#[test]
fn list_at_exact_limit_is_untouched() {
    let validator = ApplicationListValidator::new(4);
    let validated = validator.validate(&applicant_with_priorities(&[1, 2, 3, 4]));

    assert_eq!(validated.accepted.len(), 4);
    assert!(validated.incidents.is_empty());
}

#[test]
fn repeated_priorities_are_reported_once_and_kept_in_input_order() {
    let validator = ApplicationListValidator::default();
    let validated = validator.validate(&applicant_with_priorities(&[2, 1, 2, 2]));

    let programs: Vec<&str> = validated
        .accepted
        .iter()
        .map(|application| application.program_id.0.as_str())
        .collect();
    assert_eq!(programs, vec!["P2", "P1", "P3", "P4"]);
    assert_eq!(validated.incidents.len(), 1);
    assert_eq!(
        validated.incidents[0].kind,
        IncidentKind::DuplicatePriority { priority: 2 }
    );
}

#[test]
fn validation_does_not_mutate_the_applicant() {
    let applicant = applicant_with_priorities(&[2, 1]);
    let _ = ApplicationListValidator::new(1).validate(&applicant);

    assert_eq!(applicant.applications.len(), 2);
    assert_eq!(applicant.applications[0].priority, 2);
}
