use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const ACADEMIC_WEIGHT_KEY: &str = "ANTECEDENTE_ACADEMICO";
pub const EVALUATION_WEIGHT_KEY: &str = "EVALUACION_CAPACIDAD";
pub const VULNERABILITY_BASE_KEY: &str = "VULNERABILIDAD_BASE";
pub const VULNERABILITY_MAX_KEY: &str = "VULNERABILIDAD_MAX";

const DEFAULT_WEIGHT: f64 = 0.5;
const DEFAULT_VULNERABILITY_BASE: f64 = 5.0;
const DEFAULT_VULNERABILITY_MAX: f64 = 35.0;

/// Flags that earn their own entry from the bonus table.
pub const AFFIRMATIVE_ACTION_FLAGS: [&str; 4] = [
    "CONDICION_SOCIOECONOMICA_POBREZA",
    "RURALIDAD",
    "TERRITORIALIDAD",
    "PUEBLO_NACIONALIDAD",
];

/// Flags that each add the vulnerability base amount, capped as a group.
pub const DEFAULT_VULNERABILITY_FLAGS: [&str; 7] = [
    "PERSONA_CON_DISCAPACIDAD",
    "BENEFICIARIO_BONO_JOAQUIN",
    "VICTIMA_VIOLENCIA_GENERO",
    "MIGRANTE_RETORNADO",
    "HIJO_VICTIMA_FEMICIDIO",
    "ENFERMEDAD_CATASTROFICA",
    "ACOGIMIENTO_INSTITUCIONAL",
];

/// Weights and bonus table applied to every applicant in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub weights: BTreeMap<String, f64>,
    pub bonus_points: BTreeMap<String, f64>,
    pub vulnerability_flags: Vec<String>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            weights: BTreeMap::new(),
            bonus_points: BTreeMap::new(),
            vulnerability_flags: DEFAULT_VULNERABILITY_FLAGS
                .iter()
                .map(|flag| flag.to_string())
                .collect(),
        }
    }
}

impl ScoringPolicy {
    pub fn new(weights: BTreeMap<String, f64>, bonus_points: BTreeMap<String, f64>) -> Self {
        Self {
            weights,
            bonus_points,
            ..Self::default()
        }
    }

    /// Extra vulnerability flags are appended after the defaults; duplicates are ignored.
    pub fn with_extra_vulnerability_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for flag in flags {
            let flag = flag.into();
            if !self.vulnerability_flags.contains(&flag) {
                self.vulnerability_flags.push(flag);
            }
        }
        self
    }

    pub fn academic_weight(&self) -> f64 {
        self.weights
            .get(ACADEMIC_WEIGHT_KEY)
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }

    pub fn evaluation_weight(&self) -> f64 {
        self.weights
            .get(EVALUATION_WEIGHT_KEY)
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }

    pub fn bonus_for(&self, flag: &str) -> f64 {
        self.bonus_points.get(flag).copied().unwrap_or(0.0)
    }

    pub fn vulnerability_base(&self) -> f64 {
        self.bonus_points
            .get(VULNERABILITY_BASE_KEY)
            .copied()
            .unwrap_or(DEFAULT_VULNERABILITY_BASE)
    }

    pub fn vulnerability_cap(&self) -> f64 {
        self.bonus_points
            .get(VULNERABILITY_MAX_KEY)
            .copied()
            .unwrap_or(DEFAULT_VULNERABILITY_MAX)
    }
}
