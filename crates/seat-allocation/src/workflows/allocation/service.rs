use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{AllocationResult, ApplicantId};
use super::engine::AllocationEngine;
use super::incidents::IncidentLog;
use super::ports::{AdmissionSource, ResultSink};
use super::AllocationError;

/// Runs one allocation process end to end: load, score, allocate, persist.
pub struct AllocationProcess<S, W> {
    source: Arc<S>,
    sink: Arc<W>,
    engine: Arc<AllocationEngine>,
}

/// Summary of a finished run, shaped for CLI output and HTTP responses.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationReport {
    pub applicants: usize,
    pub programs: usize,
    pub assigned: usize,
    pub unassigned: Vec<ApplicantId>,
    pub incidents: IncidentLog,
    pub output: String,
    #[serde(skip)]
    pub results: Vec<AllocationResult>,
}

impl AllocationReport {
    pub fn incident_messages(&self) -> Vec<String> {
        self.incidents.messages()
    }
}

impl<S, W> AllocationProcess<S, W>
where
    S: AdmissionSource + 'static,
    W: ResultSink + 'static,
{
    pub fn new(source: Arc<S>, sink: Arc<W>, engine: AllocationEngine) -> Self {
        Self {
            source,
            sink,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &AllocationEngine {
        &self.engine
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Structural errors abort before anything is written.
    pub fn run(&self) -> Result<AllocationReport, AllocationError> {
        info!("allocation process started");
        let snapshot = self.source.load()?;
        let applicants = snapshot.applicants.len();
        let programs = snapshot.programs.len();

        let outcome = self.engine.run(snapshot.applicants, snapshot.programs)?;

        self.sink.write(&outcome.results)?;
        let output = self.sink.location();

        if !outcome.incidents.is_empty() {
            warn!(
                incidents = outcome.incidents.len(),
                "allocation finished with incidents"
            );
        }
        info!(
            assigned = outcome.results.len(),
            output = %output,
            "allocation results written"
        );

        Ok(AllocationReport {
            applicants,
            programs,
            assigned: outcome.results.len(),
            unassigned: outcome.unassigned,
            incidents: outcome.incidents,
            output,
            results: outcome.results,
        })
    }
}
