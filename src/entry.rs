//! Entry form handling
//!
//! The form enforces the input constraints (non-empty user, real calendar
//! date and time of day, non-negative measurements) and formats the date
//! and time the way the log stores them. Once a form validates, the
//! append itself cannot fail.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::cli::EntryArgs;
use crate::error::{Error, Result};
use crate::types::{MetabolicState, NewObservation};

/// Glucose pre-filled on a fresh form
pub const DEFAULT_GLUCOSE: u32 = 90;

/// Stored date format (`12/09/25`)
pub const DATE_FORMAT: &str = "%m/%d/%y";

/// Stored time format (`4:40 PM`)
pub const TIME_FORMAT: &str = "%-I:%M %p";

const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];
const TIME_INPUT_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"];

/// A filled-in entry form
#[derive(Debug, Clone, PartialEq)]
pub struct EntryForm {
    pub user: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub state: MetabolicState,
    pub glucose: u32,
    pub ketones: f64,
    pub weight: f64,
    pub body_fat_pct: String,
    pub blood_pressure: String,
}

impl EntryForm {
    /// A blank form: user, today, now, 90 mg/dL glucose, nothing else
    pub fn new(default_user: &str, now: NaiveDateTime, state: MetabolicState) -> Self {
        Self {
            user: default_user.to_string(),
            date: now.date(),
            time: now.time(),
            state,
            glucose: DEFAULT_GLUCOSE,
            ketones: 0.0,
            weight: 0.0,
            body_fat_pct: String::new(),
            blood_pressure: String::new(),
        }
    }

    /// Fill a form from command-line arguments, defaulting what was left out
    pub fn from_args(args: &EntryArgs, default_user: &str, now: NaiveDateTime) -> Result<Self> {
        let mut form = Self::new(default_user, now, args.state);

        if let Some(ref user) = args.user {
            form.user = user.clone();
        }
        if let Some(ref date) = args.date {
            form.date = parse_date(date)?;
        }
        if let Some(ref time) = args.time {
            form.time = parse_time(time)?;
        }
        form.glucose = args.glucose;
        form.ketones = args.ketones;
        form.weight = args.weight;
        form.body_fat_pct = args.body_fat.clone();
        form.blood_pressure = args.blood_pressure.clone();

        Ok(form)
    }

    /// Check every field against its input constraint
    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            return Err(Error::invalid_entry("user", "must not be empty"));
        }
        check_measurement("ketones", self.ketones)?;
        check_measurement("weight", self.weight)?;
        Ok(())
    }

    /// Validate and turn the form into raw append values
    pub fn submit(self) -> Result<NewObservation> {
        self.validate()?;

        Ok(NewObservation {
            user: self.user.trim().to_string(),
            date: self.date.format(DATE_FORMAT).to_string(),
            time: self.time.format(TIME_FORMAT).to_string(),
            state: self.state,
            glucose: f64::from(self.glucose),
            ketones: self.ketones,
            weight: self.weight,
            body_fat_pct: self.body_fat_pct,
            blood_pressure: self.blood_pressure,
        })
    }
}

fn check_measurement(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::invalid_entry(field, "must be a number"));
    }
    if value < 0.0 {
        return Err(Error::invalid_entry(field, format!("must be >= 0, got {}", value)));
    }
    Ok(())
}

/// Parse a calendar date as `YYYY-MM-DD`, `MM/DD/YY` or `MM/DD/YYYY`
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .ok_or_else(|| Error::invalid_entry("date", format!("'{}' is not a calendar date", input)))
}

/// Parse a time of day as `HH:MM` (24h) or `h:mm AM/PM`
pub fn parse_time(input: &str) -> Result<NaiveTime> {
    let input = input.trim();
    TIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| Error::invalid_entry("time", format!("'{}' is not a time of day", input)))
}
