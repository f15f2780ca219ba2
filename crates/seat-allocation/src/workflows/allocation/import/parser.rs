use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;

use csv::StringRecord;

use super::super::domain::{Applicant, Application, Program, ProgramId};
use super::super::AllocationError;
use super::mapping::{parse_flag, ApplicationLayout, OfferLayout};
use super::{APPLICATIONS_FILE, OFFER_FILE};

pub(crate) const UNKNOWN_PROGRAM_NAME: &str = "UNKNOWN_PROGRAM";

pub(crate) fn parse_programs<R: Read>(
    reader: R,
    layout: &OfferLayout,
) -> Result<Vec<Program>, AllocationError> {
    let mut csv_reader = csv_reader(reader);
    let columns = ColumnIndex::new(
        OFFER_FILE,
        csv_reader.headers()?,
        &layout.required_columns(),
    )?;
    let mut programs = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = index + 2;

        let mut seats = BTreeMap::new();
        for pool in &layout.segment_pools {
            let raw = columns.value(&record, pool);
            seats.insert(pool.clone(), parse_count(OFFER_FILE, row, pool, raw)?);
        }

        programs.push(Program::new(
            columns.value(&record, &layout.program_id),
            columns.value(&record, &layout.program_name),
            seats,
        ));
    }

    Ok(programs)
}

/// Group matrix rows by applicant, keeping applicants in first-appearance order.
pub(crate) fn parse_applicants<R: Read>(
    reader: R,
    layout: &ApplicationLayout,
    program_names: &HashMap<ProgramId, String>,
) -> Result<Vec<Applicant>, AllocationError> {
    let mut csv_reader = csv_reader(reader);
    let columns = ColumnIndex::new(
        APPLICATIONS_FILE,
        csv_reader.headers()?,
        &layout.required_columns(),
    )?;

    let mut groups: Vec<Vec<ApplicationRow>> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let parsed = ApplicationRow::parse(&record, &columns, layout, index + 2)?;

        match positions.get(&parsed.applicant_id) {
            Some(&position) => groups[position].push(parsed),
            None => {
                positions.insert(parsed.applicant_id.clone(), groups.len());
                groups.push(vec![parsed]);
            }
        }
    }

    Ok(groups
        .into_iter()
        .filter_map(|rows| build_applicant(rows, program_names))
        .collect())
}

struct ApplicationRow {
    applicant_id: String,
    program_id: String,
    priority: u32,
    academic_score: f64,
    evaluation_score: f64,
    conditions: BTreeMap<String, bool>,
}

impl ApplicationRow {
    fn parse(
        record: &StringRecord,
        columns: &ColumnIndex,
        layout: &ApplicationLayout,
        row: usize,
    ) -> Result<Self, AllocationError> {
        let priority = parse_priority(
            row,
            &layout.priority,
            columns.value(record, &layout.priority),
        )?;
        let academic_score = parse_score(
            row,
            &layout.academic_score,
            columns.value(record, &layout.academic_score),
        )?;
        let evaluation_score = parse_score(
            row,
            &layout.evaluation_score,
            columns.value(record, &layout.evaluation_score),
        )?;

        let conditions = layout
            .conditions
            .iter()
            .map(|column| (column.clone(), parse_flag(columns.value(record, column))))
            .collect();

        Ok(Self {
            applicant_id: columns.value(record, &layout.applicant_id).to_string(),
            program_id: columns.value(record, &layout.program_id).to_string(),
            priority,
            academic_score,
            evaluation_score,
            conditions,
        })
    }
}

/// Scores and flags come from the applicant's most preferred row.
fn build_applicant(
    rows: Vec<ApplicationRow>,
    program_names: &HashMap<ProgramId, String>,
) -> Option<Applicant> {
    let base = rows.iter().min_by_key(|row| row.priority)?;

    let mut applicant = Applicant::new(
        base.applicant_id.clone(),
        base.academic_score,
        base.evaluation_score,
    );
    applicant.conditions = base.conditions.clone();

    for row in &rows {
        let program_id = ProgramId(row.program_id.clone());
        let program_name = program_names
            .get(&program_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_PROGRAM_NAME.to_string());
        applicant.applications.push(Application {
            program_id,
            priority: row.priority,
            program_name,
        });
    }

    Some(applicant)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Header positions for the required columns of one file.
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn new(
        file: &'static str,
        headers: &StringRecord,
        required: &[&str],
    ) -> Result<Self, AllocationError> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(position, name)| (name.trim_start_matches('\u{feff}').to_string(), position))
            .collect();

        let missing: Vec<String> = required
            .iter()
            .filter(|column| !positions.contains_key(**column))
            .map(|column| column.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if !missing.is_empty() {
            return Err(AllocationError::MissingColumns {
                file,
                columns: missing,
            });
        }

        Ok(Self { positions })
    }

    fn value<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.positions
            .get(column)
            .and_then(|position| record.get(*position))
            .unwrap_or("")
    }
}

fn parse_count(
    file: &'static str,
    row: usize,
    column: &str,
    raw: &str,
) -> Result<u32, AllocationError> {
    if let Ok(value) = raw.parse::<u32>() {
        return Ok(value);
    }

    // Spreadsheet exports sometimes write integers as "10.0".
    match raw.parse::<f64>() {
        Ok(value)
            if value.is_finite()
                && value >= 0.0
                && value.fract() == 0.0
                && value <= u32::MAX as f64 =>
        {
            Ok(value as u32)
        }
        _ => Err(invalid_value(file, row, column, raw)),
    }
}

/// Choice ranks start at 1.
fn parse_priority(row: usize, column: &str, raw: &str) -> Result<u32, AllocationError> {
    match parse_count(APPLICATIONS_FILE, row, column, raw)? {
        0 => Err(invalid_value(APPLICATIONS_FILE, row, column, raw)),
        priority => Ok(priority),
    }
}

fn parse_score(row: usize, column: &str, raw: &str) -> Result<f64, AllocationError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid_value(APPLICATIONS_FILE, row, column, raw)),
    }
}

fn invalid_value(file: &'static str, row: usize, column: &str, raw: &str) -> AllocationError {
    AllocationError::InvalidValue {
        file,
        row,
        column: column.to_string(),
        value: raw.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn parse_count_for_tests(raw: &str) -> Result<u32, AllocationError> {
    parse_count(OFFER_FILE, 2, "OFERTA_GENERAL", raw)
}
