//! Observation record definitions
//!
//! One `Observation` is one row of the health log. Measurements are
//! explicit `Option`s: zero or negative form input means "not entered"
//! and is normalized to `None` on the way in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─────────────────────────────────────────────────────────────────
// Metabolic State
// ─────────────────────────────────────────────────────────────────

/// Metabolic context a measurement was taken in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetabolicState {
    Fasted,
    Fed,
}

impl MetabolicState {
    /// All states, in form order
    pub fn all() -> &'static [MetabolicState] {
        &[MetabolicState::Fasted, MetabolicState::Fed]
    }
}

impl fmt::Display for MetabolicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetabolicState::Fasted => write!(f, "Fasted"),
            MetabolicState::Fed => write!(f, "Fed"),
        }
    }
}

impl FromStr for MetabolicState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fasted" => Ok(MetabolicState::Fasted),
            "fed" => Ok(MetabolicState::Fed),
            other => Err(format!("expected Fasted or Fed, got '{}'", other)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Metric
// ─────────────────────────────────────────────────────────────────

/// Numeric columns that can be queried by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Weight,
    Glucose,
    Ketones,
    Ratio,
}

impl Metric {
    /// Headline order: Weight, Glucose, Ketones, Ratio
    pub fn all() -> &'static [Metric] {
        &[Metric::Weight, Metric::Glucose, Metric::Ketones, Metric::Ratio]
    }

    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Weight => "Weight",
            Metric::Glucose => "Glucose",
            Metric::Ketones => "Ketones",
            Metric::Ratio => "Ratio",
        }
    }

    /// Decimal places used when displaying a value of this metric
    pub fn precision(&self) -> usize {
        match self {
            Metric::Glucose => 0,
            Metric::Weight | Metric::Ketones | Metric::Ratio => 1,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Weight => write!(f, "weight"),
            Metric::Glucose => write!(f, "glucose"),
            Metric::Ketones => write!(f, "ketones"),
            Metric::Ratio => write!(f, "ratio"),
        }
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weight" => Ok(Metric::Weight),
            "glucose" => Ok(Metric::Glucose),
            "ketones" => Ok(Metric::Ketones),
            "ratio" => Ok(Metric::Ratio),
            _ => Err(Error::UnknownMetric { name: s.to_string() }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Observation
// ─────────────────────────────────────────────────────────────────

/// One recorded health data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// `MM/DD/YY` or a free-form label such as "Week 45 Monday"; opaque
    pub date: String,
    /// `h:mm AM/PM`
    pub time: String,
    pub user: String,
    pub state: MetabolicState,
    /// mg/dL
    pub glucose: Option<f64>,
    /// mmol/L
    pub ketones: Option<f64>,
    /// Glucose / ketones, derived on append
    pub ratio: Option<f64>,
    /// lbs
    pub weight: Option<f64>,
    pub body_fat_pct: Option<String>,
    pub blood_pressure: Option<String>,
}

impl Observation {
    /// Build an observation from raw form values.
    ///
    /// Measurements `<= 0` are normalized to `None`, free text that is
    /// blank becomes `None`, and the ratio is always derived here; it is
    /// never taken from the caller.
    pub fn from_entry(entry: NewObservation) -> Self {
        let glucose = normalize_measurement(entry.glucose);
        let ketones = normalize_measurement(entry.ketones);

        Self {
            date: entry.date,
            time: entry.time,
            user: entry.user,
            state: entry.state,
            glucose,
            ketones,
            ratio: glucose_ketone_ratio(glucose, ketones),
            weight: normalize_measurement(entry.weight),
            body_fat_pct: normalize_text(entry.body_fat_pct),
            blood_pressure: normalize_text(entry.blood_pressure),
        }
    }

    /// Typed access to a numeric column by name
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Weight => self.weight,
            Metric::Glucose => self.glucose,
            Metric::Ketones => self.ketones,
            Metric::Ratio => self.ratio,
        }
    }
}

/// Raw values for one append, as they come off the entry form.
///
/// Numeric fields use `0` for "not provided".
#[derive(Debug, Clone, PartialEq)]
pub struct NewObservation {
    pub user: String,
    pub date: String,
    pub time: String,
    pub state: MetabolicState,
    pub glucose: f64,
    pub ketones: f64,
    pub weight: f64,
    pub body_fat_pct: String,
    pub blood_pressure: String,
}

/// Zero-as-absent rule: anything not strictly positive (or not finite) is `None`
pub fn normalize_measurement(value: f64) -> Option<f64> {
    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// `round(glucose / ketones, 1)` when ketones are present, `None` otherwise.
///
/// Missing glucose yields a zero ratio, which is itself normalized to `None`.
pub fn glucose_ketone_ratio(glucose: Option<f64>, ketones: Option<f64>) -> Option<f64> {
    let ketones = ketones.filter(|k| *k > 0.0)?;
    let glucose = glucose.unwrap_or(0.0);
    normalize_measurement(round_to_tenth(glucose / ketones))
}

/// Round to one decimal place, half to even on the exact binary value.
///
/// Scaling by ten first would round 85 / 0.8 (106.249...) up to 106.3.
pub fn round_to_tenth(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

fn normalize_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
