use clap::Args;
use seat_allocation::config::AppConfig;
use seat_allocation::error::AppError;
use seat_allocation::telemetry;
use seat_allocation::workflows::allocation::{
    AllocationReport, AllocationWorkspace, PolicyDocument,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    /// Policy document (defaults to APP_POLICY_PATH, then config.json)
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
    /// Write results here instead of the policy's result route
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Print the run report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_batch(args: RunArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let policy_path = args
        .policy
        .unwrap_or_else(|| config.allocation.policy_path.clone());
    let mut policy = PolicyDocument::from_path(&policy_path)?;
    if let Some(output) = args.output {
        policy.routes.results = output;
    }

    let workspace = AllocationWorkspace::new(policy);
    let report = workspace.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

fn render_report(report: &AllocationReport) -> String {
    let mut output = String::new();
    output.push_str("Seat allocation complete\n");
    output.push_str(&format!("  Applicants: {}\n", report.applicants));
    output.push_str(&format!("  Programs: {}\n", report.programs));
    output.push_str(&format!("  Assigned: {}\n", report.assigned));
    output.push_str(&format!("  Unassigned: {}\n", report.unassigned.len()));
    output.push_str(&format!("  Results: {}\n", report.output));

    let messages = report.incident_messages();
    if messages.is_empty() {
        output.push_str("No incidents recorded.\n");
    } else {
        output.push_str(&format!("Incidents ({}):\n", messages.len()));
        for message in messages {
            output.push_str(&format!("  - {message}\n"));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use seat_allocation::workflows::allocation::{
        ApplicantId, Incident, IncidentKind, IncidentLog, ProgramId,
    };

    fn report(incidents: IncidentLog) -> AllocationReport {
        AllocationReport {
            applicants: 3,
            programs: 2,
            assigned: 2,
            unassigned: vec![ApplicantId("C-3".to_string())],
            incidents,
            output: "outputs/resultados.csv".to_string(),
            results: Vec::new(),
        }
    }

    #[test]
    fn summary_lists_counts_and_clean_run() {
        let text = render_report(&report(IncidentLog::new()));
        assert!(text.contains("Assigned: 2"));
        assert!(text.contains("Unassigned: 1"));
        assert!(text.contains("Results: outputs/resultados.csv"));
        assert!(text.ends_with("No incidents recorded.\n"));
    }

    #[test]
    fn summary_lists_each_incident() {
        let mut incidents = IncidentLog::new();
        incidents.record(Incident::new(
            ApplicantId("A-1".to_string()),
            IncidentKind::UnknownProgram {
                program_id: ProgramId("P9".to_string()),
            },
        ));

        let text = render_report(&report(incidents));
        assert!(text.contains("Incidents (1):"));
        assert!(text.contains("  - applicant A-1: application to unknown program P9"));
    }
}
