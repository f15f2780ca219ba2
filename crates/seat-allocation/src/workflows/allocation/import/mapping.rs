use std::collections::BTreeMap;

use super::super::policy::ColumnMapping;
use super::super::AllocationError;

pub(crate) const APPLICANT_ID_KEY: &str = "id_aspirante";
pub(crate) const PROGRAM_ID_KEY: &str = "id_carrera";
pub(crate) const PRIORITY_KEY: &str = "prioridad";
pub(crate) const ACADEMIC_SCORE_KEY: &str = "antecedentes";
pub(crate) const EVALUATION_SCORE_KEY: &str = "evaluacion";

const CORE_KEYS: [&str; 5] = [
    APPLICANT_ID_KEY,
    PROGRAM_ID_KEY,
    PRIORITY_KEY,
    ACADEMIC_SCORE_KEY,
    EVALUATION_SCORE_KEY,
];

/// Column names of the academic offer file.
#[derive(Debug, Clone)]
pub(crate) struct OfferLayout {
    pub(crate) program_id: String,
    pub(crate) program_name: String,
    pub(crate) segment_pools: Vec<String>,
}

impl OfferLayout {
    pub(crate) fn from_mapping(mapping: &ColumnMapping) -> Self {
        Self {
            program_id: mapping.offer.program_id.clone(),
            program_name: mapping.offer.program_name.clone(),
            segment_pools: mapping.segment_pools.clone(),
        }
    }

    pub(crate) fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.program_id.as_str(), self.program_name.as_str()];
        columns.extend(self.segment_pools.iter().map(String::as_str));
        columns
    }
}

/// Column names of the applications matrix. Condition columns double as flag names.
#[derive(Debug, Clone)]
pub(crate) struct ApplicationLayout {
    pub(crate) applicant_id: String,
    pub(crate) program_id: String,
    pub(crate) priority: String,
    pub(crate) academic_score: String,
    pub(crate) evaluation_score: String,
    pub(crate) conditions: Vec<String>,
}

impl ApplicationLayout {
    pub(crate) fn from_mapping(mapping: &ColumnMapping) -> Result<Self, AllocationError> {
        let columns = &mapping.applications;
        let column = |key: &str| -> Result<String, AllocationError> {
            columns
                .get(key)
                .cloned()
                .ok_or_else(|| AllocationError::MissingMapping {
                    key: key.to_string(),
                })
        };

        Ok(Self {
            applicant_id: column(APPLICANT_ID_KEY)?,
            program_id: column(PROGRAM_ID_KEY)?,
            priority: column(PRIORITY_KEY)?,
            academic_score: column(ACADEMIC_SCORE_KEY)?,
            evaluation_score: column(EVALUATION_SCORE_KEY)?,
            conditions: condition_columns(columns),
        })
    }

    pub(crate) fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![
            self.applicant_id.as_str(),
            self.program_id.as_str(),
            self.priority.as_str(),
            self.academic_score.as_str(),
            self.evaluation_score.as_str(),
        ];
        columns.extend(self.conditions.iter().map(String::as_str));
        columns
    }
}

fn condition_columns(columns: &BTreeMap<String, String>) -> Vec<String> {
    columns
        .iter()
        .filter(|(key, _)| !CORE_KEYS.contains(&key.as_str()))
        .map(|(_, column)| column.clone())
        .collect()
}

/// Flag cells accept `SI`, `1` or `TRUE` in any case; anything else is false.
pub(crate) fn parse_flag(raw: &str) -> bool {
    let value = raw.trim();
    value.eq_ignore_ascii_case("si") || value == "1" || value.eq_ignore_ascii_case("true")
}
