use serde::Serialize;

use super::domain::Applicant;

pub const QUOTA_POLICY_POOL: &str = "OFERTA_POLITICA_CUOTAS";
pub const SOCIOECONOMIC_POOL: &str = "OFERTA_VULNERABILIDAD_SOCIOECONOMICA";
pub const ACADEMIC_MERIT_POOL: &str = "OFERTA_MERITO_ACADEMICO";
pub const OTHER_RECOGNITIONS_POOL: &str = "OFERTA_OTROS_RECONOCIMIENTOS";
pub const GRADUATING_QUOTA_POOL: &str = "OFERTA_BACHILLER_P_N";
pub const GRADUATING_COHORT_POOL: &str = "OFERTA_BACHILLER_CURSO";
pub const GENERAL_POOL: &str = "OFERTA_GENERAL";

pub const PEOPLES_AND_NATIONALITIES_FLAG: &str = "PUEBLO_NACIONALIDAD";
pub const POVERTY_FLAG: &str = "CONDICION_SOCIOECONOMICA_POBREZA";
pub const ACADEMIC_MERIT_FLAG: &str = "MERITO_ACADEMICO";
pub const OTHER_RECOGNITIONS_FLAG: &str = "OTROS_RECONOCIMIENTOS";
pub const CURRENT_GRADUATE_FLAG: &str = "BACHILLER_CURSO_ACTUAL";

/// Closed set of eligibility rules evaluated over applicant flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "flags", rename_all = "snake_case")]
pub enum Eligibility {
    Always,
    AllFlags(Vec<String>),
}

impl Eligibility {
    pub fn flag(flag: &str) -> Self {
        Self::AllFlags(vec![flag.to_string()])
    }

    pub fn all_of(flags: &[&str]) -> Self {
        Self::AllFlags(flags.iter().map(|flag| flag.to_string()).collect())
    }

    pub fn matches(&self, applicant: &Applicant) -> bool {
        match self {
            Eligibility::Always => true,
            Eligibility::AllFlags(flags) => flags.iter().all(|flag| applicant.has_condition(flag)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentDefinition {
    pub pool_key: String,
    pub label: &'static str,
    pub eligibility: Eligibility,
}

impl SegmentDefinition {
    pub fn new(pool_key: impl Into<String>, label: &'static str, eligibility: Eligibility) -> Self {
        Self {
            pool_key: pool_key.into(),
            label,
            eligibility,
        }
    }

    pub fn is_eligible(&self, applicant: &Applicant) -> bool {
        self.eligibility.matches(applicant)
    }
}

/// Ordered segment definitions. Position encodes strict precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRuleSet {
    segments: Vec<SegmentDefinition>,
}

impl Default for SegmentRuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl SegmentRuleSet {
    pub fn new(segments: Vec<SegmentDefinition>) -> Self {
        Self { segments }
    }

    pub fn standard() -> Self {
        Self {
            segments: standard_segments(),
        }
    }

    pub fn segments(&self) -> &[SegmentDefinition] {
        &self.segments
    }

    pub fn pool_keys(&self) -> Vec<&str> {
        self.segments
            .iter()
            .map(|segment| segment.pool_key.as_str())
            .collect()
    }

    /// Segments the applicant qualifies for, in precedence order.
    pub fn eligible_segments<'a>(&'a self, applicant: &Applicant) -> Vec<&'a SegmentDefinition> {
        self.segments
            .iter()
            .filter(|segment| segment.is_eligible(applicant))
            .collect()
    }
}

fn standard_segments() -> Vec<SegmentDefinition> {
    vec![
        SegmentDefinition::new(
            QUOTA_POLICY_POOL,
            "Quota policy group",
            Eligibility::flag(PEOPLES_AND_NATIONALITIES_FLAG),
        ),
        SegmentDefinition::new(
            SOCIOECONOMIC_POOL,
            "Socioeconomic vulnerability group",
            Eligibility::flag(POVERTY_FLAG),
        ),
        SegmentDefinition::new(
            ACADEMIC_MERIT_POOL,
            "Academic merit group",
            Eligibility::flag(ACADEMIC_MERIT_FLAG),
        ),
        SegmentDefinition::new(
            OTHER_RECOGNITIONS_POOL,
            "Other merit recognitions group",
            Eligibility::flag(OTHER_RECOGNITIONS_FLAG),
        ),
        SegmentDefinition::new(
            GRADUATING_QUOTA_POOL,
            "Current graduates from peoples and nationalities",
            Eligibility::all_of(&[CURRENT_GRADUATE_FLAG, PEOPLES_AND_NATIONALITIES_FLAG]),
        ),
        SegmentDefinition::new(
            GRADUATING_COHORT_POOL,
            "Current graduates",
            Eligibility::flag(CURRENT_GRADUATE_FLAG),
        ),
        SegmentDefinition::new(GENERAL_POOL, "General population", Eligibility::Always),
    ]
}
