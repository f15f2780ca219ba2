use std::sync::Arc;

use super::common::{applicant, engine, general_program, MemorySink, MemorySource, UnavailableSource};
use crate::workflows::allocation::{AllocationError, AllocationProcess};

#[test]
fn run_scores_allocates_and_writes_results() {
    let source = Arc::new(MemorySource::new(
        vec![
            applicant("A-1", 90.0, &["P1", "P404"]),
            applicant("A-2", 80.0, &["P1"]),
        ],
        vec![general_program("P1", 1)],
    ));
    let sink = Arc::new(MemorySink::default());
    let process = AllocationProcess::new(source, sink.clone(), engine());

    let report = process.run().expect("process completes");

    assert_eq!(report.applicants, 2);
    assert_eq!(report.programs, 1);
    assert_eq!(report.assigned, 1);
    assert_eq!(report.unassigned.len(), 1);
    assert_eq!(report.output, "memory");
    assert!(report.incidents.is_empty(), "A-1 never reaches the unknown choice");

    let writes = sink.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0], report.results);
}

#[test]
fn empty_result_set_is_still_written() {
    let source = Arc::new(MemorySource::new(
        vec![applicant("A-1", 90.0, &["P404"])],
        vec![general_program("P1", 1)],
    ));
    let sink = Arc::new(MemorySink::default());
    let process = AllocationProcess::new(source, sink.clone(), engine());

    let report = process.run().expect("process completes");

    assert_eq!(report.assigned, 0);
    assert_eq!(report.incident_messages().len(), 1);
    assert_eq!(sink.writes(), vec![Vec::new()]);
}

#[test]
fn structural_errors_abort_before_writing() {
    let sink = Arc::new(MemorySink::default());
    let process = AllocationProcess::new(Arc::new(UnavailableSource), sink.clone(), engine());

    let error = process.run().expect_err("load fails");

    assert!(matches!(error, AllocationError::MissingColumns { .. }));
    assert!(sink.writes().is_empty());
}

#[test]
fn duplicate_applicants_abort_before_writing() {
    let source = Arc::new(MemorySource::new(
        vec![applicant("A-1", 90.0, &["P1"]), applicant("A-1", 80.0, &["P1"])],
        vec![general_program("P1", 1)],
    ));
    let sink = Arc::new(MemorySink::default());
    let process = AllocationProcess::new(source, sink.clone(), engine());

    assert!(matches!(
        process.run(),
        Err(AllocationError::DuplicateApplicant(_))
    ));
    assert!(sink.writes().is_empty());
}
