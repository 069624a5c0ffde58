//! CSV import and export of observations
//!
//! The column layout is fixed:
//! `Date,Time,User,State,Glucose (mg/dL),Ketones (mmol/L),Ratio,Weight (lbs),Body Fat %,Blood Pressure`
//!
//! Empty cells are null. Rows shorter than the header are padded with
//! empty cells. Dates are carried through untouched.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{MetabolicState, Observation};

/// Column headers, in file order
pub const HEADER: [&str; 10] = [
    "Date",
    "Time",
    "User",
    "State",
    "Glucose (mg/dL)",
    "Ketones (mmol/L)",
    "Ratio",
    "Weight (lbs)",
    "Body Fat %",
    "Blood Pressure",
];

/// Default download name for an export
pub const EXPORT_FILE_NAME: &str = "data.csv";

/// MIME type of an export
pub const EXPORT_MIME: &str = "text/csv";

/// Historical sample every session starts from.
///
/// The "Week 45 Monday" row was recorded with a missing cell; it is stored
/// as Weight 205 and Body Fat 15.2% with no Glucose, Ketones or Ratio.
const SEED_CSV: &str = include_str!("../../data/seed.csv");

/// Decode the embedded seed dataset
pub fn seed_observations() -> Result<Vec<Observation>> {
    read_observations(SEED_CSV.as_bytes())
}

/// Decode observations from CSV with a header row
pub fn read_observations<R: Read>(reader: R) -> Result<Vec<Observation>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    check_header(reader.headers()?)?;

    let mut observations = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        observations.push(decode_record(index as u64 + 1, &record)?);
    }

    debug!(rows = observations.len(), "Decoded observations");
    Ok(observations)
}

/// Load observations from a CSV file
pub fn load_file(path: &Path) -> Result<Vec<Observation>> {
    let file = File::open(path).map_err(|e| Error::IoRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_observations(file)
}

/// Encode observations as CSV, header row first
pub fn write_observations<'a, W, I>(writer: W, observations: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Observation>,
{
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(HEADER)?;

    for obs in observations {
        let state = obs.state.to_string();
        let glucose = format_number(obs.glucose);
        let ketones = format_number(obs.ketones);
        let ratio = format_number(obs.ratio);
        let weight = format_number(obs.weight);

        writer.write_record([
            obs.date.as_str(),
            obs.time.as_str(),
            obs.user.as_str(),
            state.as_str(),
            glucose.as_str(),
            ketones.as_str(),
            ratio.as_str(),
            weight.as_str(),
            obs.body_fat_pct.as_deref().unwrap_or(""),
            obs.blood_pressure.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write observations to a CSV file, replacing it if present
pub fn export_file<'a, I>(path: &Path, observations: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let file = File::create(path).map_err(|e| Error::IoWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_observations(file, observations)
}

fn check_header(header: &StringRecord) -> Result<()> {
    for (i, expected) in HEADER.iter().enumerate() {
        let found = header.get(i).map(str::trim).unwrap_or("");
        if found != *expected {
            return Err(Error::csv_parse(
                0,
                *expected,
                format!("expected header '{}' in column {}, found '{}'", expected, i + 1, found),
            ));
        }
    }
    Ok(())
}

fn decode_record(record_no: u64, record: &StringRecord) -> Result<Observation> {
    let cell = |i: usize| record.get(i).map(str::trim).unwrap_or("");

    let number = |i: usize| -> Result<Option<f64>> {
        let raw = cell(i);
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<f64>()
            .map(Some)
            .map_err(|_| Error::csv_parse(record_no, HEADER[i], format!("not a number: '{}'", raw)))
    };

    let text = |i: usize| -> Option<String> {
        let raw = cell(i);
        (!raw.is_empty()).then(|| raw.to_string())
    };

    let state = cell(3)
        .parse::<MetabolicState>()
        .map_err(|message| Error::csv_parse(record_no, HEADER[3], message))?;

    Ok(Observation {
        date: cell(0).to_string(),
        time: cell(1).to_string(),
        user: cell(2).to_string(),
        state,
        glucose: number(4)?,
        ketones: number(5)?,
        ratio: number(6)?,
        weight: number(7)?,
        body_fat_pct: text(8),
        blood_pressure: text(9),
    })
}

/// Float form with at least one decimal (`545.0`, `0.2`); null becomes an empty cell
fn format_number(value: Option<f64>) -> String {
    value.map(|v| format!("{:?}", v)).unwrap_or_default()
}
