mod mapping;
mod parser;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::info;

use super::domain::{Program, ProgramId};
use super::policy::{ColumnMapping, PolicyDocument};
use super::ports::{AdmissionSnapshot, AdmissionSource};
use super::AllocationError;

use mapping::{ApplicationLayout, OfferLayout};

pub(crate) const OFFER_FILE: &str = "academic offer file";
pub(crate) const APPLICATIONS_FILE: &str = "applications matrix";

/// Reads the academic offer and the applications matrix from CSV files.
#[derive(Debug, Clone)]
pub struct CsvAdmissionSource {
    offer_path: PathBuf,
    applications_path: PathBuf,
    columns: ColumnMapping,
}

impl CsvAdmissionSource {
    pub fn new(
        offer_path: impl Into<PathBuf>,
        applications_path: impl Into<PathBuf>,
        columns: ColumnMapping,
    ) -> Self {
        Self {
            offer_path: offer_path.into(),
            applications_path: applications_path.into(),
            columns,
        }
    }

    pub fn from_policy(policy: &PolicyDocument) -> Self {
        Self::new(
            policy.routes.offer.clone(),
            policy.routes.applications.clone(),
            policy.columns.clone(),
        )
    }

    /// Parse both files from readers. Missing columns and unparseable cells are fatal.
    pub fn from_readers<O: Read, A: Read>(
        offer: O,
        applications: A,
        columns: &ColumnMapping,
    ) -> Result<AdmissionSnapshot, AllocationError> {
        let offer_layout = OfferLayout::from_mapping(columns);
        let application_layout = ApplicationLayout::from_mapping(columns)?;

        let programs = parser::parse_programs(offer, &offer_layout)?;
        let program_names: HashMap<ProgramId, String> = programs
            .iter()
            .map(|program| (program.id.clone(), program.name.clone()))
            .collect();
        let applicants = parser::parse_applicants(applications, &application_layout, &program_names)?;

        info!(
            applicants = applicants.len(),
            programs = programs.len(),
            "admission data loaded"
        );

        Ok(AdmissionSnapshot {
            applicants,
            programs,
        })
    }

    /// Only the offer file; used when applicants are not needed.
    pub fn load_programs(&self) -> Result<Vec<Program>, AllocationError> {
        let offer = open(&self.offer_path)?;
        parser::parse_programs(offer, &OfferLayout::from_mapping(&self.columns))
    }

    pub fn offer_path(&self) -> &Path {
        &self.offer_path
    }

    pub fn applications_path(&self) -> &Path {
        &self.applications_path
    }
}

impl AdmissionSource for CsvAdmissionSource {
    fn load(&self) -> Result<AdmissionSnapshot, AllocationError> {
        let offer = open(&self.offer_path)?;
        let applications = open(&self.applications_path)?;
        Self::from_readers(offer, applications, &self.columns)
    }
}

fn open(path: &Path) -> Result<File, AllocationError> {
    File::open(path).map_err(|source| AllocationError::Io {
        path: path.to_path_buf(),
        source,
    })
}
