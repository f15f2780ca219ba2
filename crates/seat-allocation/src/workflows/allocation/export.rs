use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::domain::AllocationResult;
use super::policy::OutputMetadata;
use super::ports::ResultSink;
use super::AllocationError;

pub const RESULT_COLUMNS: [&str; 11] = [
    "PERIODO",
    "IES_ID",
    "IDENTIFICACION",
    "FECHA_POSTULACION",
    "PUNTAJE_POSTULACION",
    "SEGMENTO_ASPIRANTE",
    "INSTANCIA_POSTULACION",
    "PRIORIDAD_ELECCION_CARRERA",
    "NOMBRE_CARRERA",
    "OFA_ID",
    "CUS_ID",
];

/// Writes the result table, one row per granted seat, stamped with the run metadata.
#[derive(Debug, Clone)]
pub struct CsvResultWriter {
    path: PathBuf,
    metadata: OutputMetadata,
}

impl CsvResultWriter {
    pub fn new(path: impl Into<PathBuf>, metadata: OutputMetadata) -> Self {
        Self {
            path: path.into(),
            metadata,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the table is written to before it replaces `path`.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("resultados.csv"));
        name.push(".partial");
        self.path.with_file_name(name)
    }

    /// The header is always written, so an empty result set still yields a valid file.
    pub fn write_to<W: Write>(
        &self,
        writer: W,
        results: &[AllocationResult],
    ) -> Result<(), AllocationError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(RESULT_COLUMNS)?;

        let date = self.metadata.postulation_date.format("%Y-%m-%d").to_string();
        let instance = self.metadata.postulation_instance.to_string();

        for result in results {
            let score = format!("{:.2}", result.postulation_score);
            let priority = result.priority.to_string();
            csv_writer.write_record([
                self.metadata.period.as_str(),
                self.metadata.institution_id.as_str(),
                result.applicant_id.0.as_str(),
                date.as_str(),
                score.as_str(),
                result.segment.as_str(),
                instance.as_str(),
                priority.as_str(),
                result.program_name.as_str(),
                result.program_id.0.as_str(),
                self.metadata.submission_id.as_str(),
            ])?;
        }

        csv_writer.flush().map_err(|source| AllocationError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

impl ResultSink for CsvResultWriter {
    fn write(&self, results: &[AllocationResult]) -> Result<(), AllocationError> {
        let io_error = |source| AllocationError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        // Readers of `path` see either the previous table or the complete new one.
        let staging = self.staging_path();
        let file = File::create(&staging).map_err(io_error)?;
        if let Err(err) = self.write_to(file, results) {
            fs::remove_file(&staging).ok();
            return Err(err);
        }
        fs::rename(&staging, &self.path).map_err(io_error)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
