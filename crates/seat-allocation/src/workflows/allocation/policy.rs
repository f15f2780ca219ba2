use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::engine::AllocationEngine;
use super::scoring::ScoringPolicy;
use super::segments::SegmentRuleSet;
use super::validation::DEFAULT_MAX_CHOICES;
use super::AllocationError;

/// Policy document governing one allocation process: weights, bonus table, limits,
/// file routes and the column layout of the input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "ponderadores", default)]
    pub weights: BTreeMap<String, f64>,
    #[serde(rename = "puntos_adicionales", default)]
    pub bonus_points: BTreeMap<String, f64>,
    #[serde(rename = "parametros_proceso", default)]
    pub process: ProcessParameters,
    #[serde(rename = "rutas_archivos")]
    pub routes: FileRoutes,
    #[serde(rename = "mapeo_columnas")]
    pub columns: ColumnMapping,
    #[serde(
        rename = "condiciones_vulnerabilidad",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub extra_vulnerability_flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessParameters {
    #[serde(rename = "max_postulaciones_permitidas", default = "default_max_choices")]
    pub max_choices: usize,
    #[serde(flatten)]
    pub output: OutputMetadata,
}

impl Default for ProcessParameters {
    fn default() -> Self {
        Self {
            max_choices: DEFAULT_MAX_CHOICES,
            output: OutputMetadata::default(),
        }
    }
}

/// Constant columns stamped onto every output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMetadata {
    #[serde(rename = "periodo", default = "default_period")]
    pub period: String,
    #[serde(rename = "ies_id", default = "default_institution")]
    pub institution_id: String,
    #[serde(rename = "fecha_postulacion", default = "default_postulation_date")]
    pub postulation_date: NaiveDate,
    #[serde(rename = "instancia_postulacion", default = "default_instance")]
    pub postulation_instance: u32,
    #[serde(rename = "cus_id", default = "default_submission_id")]
    pub submission_id: String,
}

impl Default for OutputMetadata {
    fn default() -> Self {
        Self {
            period: default_period(),
            institution_id: default_institution(),
            postulation_date: default_postulation_date(),
            postulation_instance: default_instance(),
            submission_id: default_submission_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRoutes {
    #[serde(rename = "oferta_academica")]
    pub offer: PathBuf,
    #[serde(rename = "matriz_postulaciones")]
    pub applications: PathBuf,
    #[serde(rename = "resultados_asignacion")]
    pub results: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(rename = "oferta")]
    pub offer: OfferColumns,
    /// Logical key to CSV column. Keys other than the five core fields are condition flags.
    #[serde(rename = "postulaciones")]
    pub applications: BTreeMap<String, String>,
    /// Quota columns of the offer file. Does not define segment precedence.
    #[serde(rename = "segmentos_cupos")]
    pub segment_pools: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferColumns {
    #[serde(rename = "id_carrera")]
    pub program_id: String,
    #[serde(rename = "nombre_carrera")]
    pub program_name: String,
}

impl PolicyDocument {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AllocationError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| AllocationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AllocationError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn scoring_policy(&self) -> ScoringPolicy {
        ScoringPolicy::new(self.weights.clone(), self.bonus_points.clone())
            .with_extra_vulnerability_flags(self.extra_vulnerability_flags.iter().cloned())
    }

    /// Engine wired with this document's scoring and limits and the standard segment order.
    pub fn engine(&self) -> AllocationEngine {
        AllocationEngine::new(
            self.scoring_policy(),
            self.process.max_choices,
            SegmentRuleSet::standard(),
        )
    }
}

fn default_max_choices() -> usize {
    DEFAULT_MAX_CHOICES
}

fn default_period() -> String {
    "PERIODO_EJEMPLO_2025".to_string()
}

fn default_institution() -> String {
    "IES_EJEMPLO".to_string()
}

fn default_postulation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 27).unwrap_or_default()
}

fn default_instance() -> u32 {
    1
}

fn default_submission_id() -> String {
    "CUS_ID_SIMULADO".to_string()
}
