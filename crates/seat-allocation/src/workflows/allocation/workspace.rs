use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;
use tracing::info;

use super::export::CsvResultWriter;
use super::import::CsvAdmissionSource;
use super::policy::PolicyDocument;
use super::service::{AllocationProcess, AllocationReport};
use super::AllocationError;

/// Input files uploaded through the API. Absent fields leave the current file in place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputUpload {
    #[serde(default)]
    pub offer_csv: Option<String>,
    #[serde(default)]
    pub applications_csv: Option<String>,
}

/// File-backed allocation setup shared by the HTTP handlers and the CLI.
///
/// Runs are serialized: the result file is rewritten on every run.
#[derive(Debug)]
pub struct AllocationWorkspace {
    policy: PolicyDocument,
    run_lock: Mutex<()>,
}

impl AllocationWorkspace {
    pub fn new(policy: PolicyDocument) -> Self {
        Self {
            policy,
            run_lock: Mutex::new(()),
        }
    }

    pub fn from_policy_path<P: AsRef<Path>>(path: P) -> Result<Self, AllocationError> {
        Ok(Self::new(PolicyDocument::from_path(path)?))
    }

    pub fn policy(&self) -> &PolicyDocument {
        &self.policy
    }

    pub fn source(&self) -> CsvAdmissionSource {
        CsvAdmissionSource::from_policy(&self.policy)
    }

    pub fn writer(&self) -> CsvResultWriter {
        CsvResultWriter::new(
            self.policy.routes.results.clone(),
            self.policy.process.output.clone(),
        )
    }

    pub fn process(&self) -> AllocationProcess<CsvAdmissionSource, CsvResultWriter> {
        AllocationProcess::new(
            Arc::new(self.source()),
            Arc::new(self.writer()),
            self.policy.engine(),
        )
    }

    pub fn run(&self) -> Result<AllocationReport, AllocationError> {
        let _guard = self.run_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.process().run()
    }

    pub fn results_path(&self) -> &Path {
        &self.policy.routes.results
    }

    /// Store uploaded CSV text at the configured input routes. Returns the written paths.
    pub fn save_inputs(&self, upload: &InputUpload) -> Result<Vec<PathBuf>, AllocationError> {
        let _guard = self.run_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut saved = Vec::new();

        let targets = [
            (&upload.offer_csv, &self.policy.routes.offer),
            (&upload.applications_csv, &self.policy.routes.applications),
        ];
        for (content, path) in targets {
            let Some(content) = content else {
                continue;
            };
            write_file(path, content)?;
            info!(path = %path.display(), bytes = content.len(), "input file stored");
            saved.push(path.clone());
        }

        Ok(saved)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), AllocationError> {
    let io_error = |source| AllocationError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, content).map_err(io_error)
}
