//! Read-side queries over a filtered sequence of observations
//!
//! All queries are null-safe: a missing value is reported as
//! [`LastValue::Missing`] or simply left out of a series.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::types::{MetabolicState, Metric, Observation};

/// Placeholder shown when a metric has no recorded value
pub const MISSING_SENTINEL: &str = "-";

// ─────────────────────────────────────────────────────────────────
// Last non-null
// ─────────────────────────────────────────────────────────────────

/// Most recent value of a metric, or the "-" sentinel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LastValue {
    Value(f64),
    Missing,
}

impl LastValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            LastValue::Value(v) => Some(*v),
            LastValue::Missing => None,
        }
    }

    /// Render with a fixed number of decimals, or the sentinel
    pub fn format(&self, precision: usize) -> String {
        self.value()
            .map(|v| format!("{:.*}", precision, v))
            .unwrap_or_else(|| MISSING_SENTINEL.to_string())
    }
}

impl fmt::Display for LastValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastValue::Value(v) => write!(f, "{}", v),
            LastValue::Missing => f.write_str(MISSING_SENTINEL),
        }
    }
}

impl Serialize for LastValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LastValue::Value(v) => serializer.serialize_f64(*v),
            LastValue::Missing => serializer.serialize_str(MISSING_SENTINEL),
        }
    }
}

/// Value of `metric` from the last observation where it is present
pub fn last_non_null<'a, I>(observations: I, metric: Metric) -> LastValue
where
    I: IntoIterator<Item = &'a Observation>,
{
    observations
        .into_iter()
        .filter_map(|o| o.metric(metric))
        .last()
        .map(LastValue::Value)
        .unwrap_or(LastValue::Missing)
}

/// The four headline numbers, each resolved independently
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    pub weight: LastValue,
    pub glucose: LastValue,
    pub ketones: LastValue,
    pub ratio: LastValue,
}

impl HeadlineMetrics {
    pub fn compute(observations: &[&Observation]) -> Self {
        let last = |metric| last_non_null(observations.iter().copied(), metric);
        Self {
            weight: last(Metric::Weight),
            glucose: last(Metric::Glucose),
            ketones: last(Metric::Ketones),
            ratio: last(Metric::Ratio),
        }
    }

    pub fn get(&self, metric: Metric) -> LastValue {
        match metric {
            Metric::Weight => self.weight,
            Metric::Glucose => self.glucose,
            Metric::Ketones => self.ketones,
            Metric::Ratio => self.ratio,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Trend series
// ─────────────────────────────────────────────────────────────────

/// One charted point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub value: f64,
    pub state: MetabolicState,
}

/// Points of one metric over date, rows without the metric left out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub metric: Metric,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest value in the series
    pub fn max_value(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::max)
    }

    /// Points split by metabolic state, each group in original order.
    /// States without points are omitted.
    pub fn by_state(&self) -> Vec<(MetabolicState, Vec<&TrendPoint>)> {
        MetabolicState::all()
            .iter()
            .map(|state| {
                let points: Vec<&TrendPoint> =
                    self.points.iter().filter(|p| p.state == *state).collect();
                (*state, points)
            })
            .filter(|(_, points)| !points.is_empty())
            .collect()
    }
}

/// Non-null points of `metric`, in insertion order; no interpolation
pub fn trend_series<'a, I>(observations: I, metric: Metric) -> TrendSeries
where
    I: IntoIterator<Item = &'a Observation>,
{
    let points = observations
        .into_iter()
        .filter_map(|o| {
            o.metric(metric).map(|value| TrendPoint {
                date: o.date.clone(),
                value,
                state: o.state,
            })
        })
        .collect();

    TrendSeries { metric, points }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, state: MetabolicState, weight: Option<f64>, ratio: Option<f64>) -> Observation {
        Observation {
            date: date.to_string(),
            time: "6:30 AM".to_string(),
            user: "TC".to_string(),
            state,
            glucose: None,
            ketones: None,
            ratio,
            weight,
            body_fat_pct: None,
            blood_pressure: None,
        }
    }

    #[test]
    fn test_last_non_null_skips_missing() {
        let rows = vec![
            row("a", MetabolicState::Fasted, Some(197.0), Some(77.5)),
            row("b", MetabolicState::Fasted, Some(196.5), None),
            row("c", MetabolicState::Fed, None, None),
        ];
        assert_eq!(last_non_null(&rows, Metric::Weight), LastValue::Value(196.5));
        assert_eq!(last_non_null(&rows, Metric::Ratio), LastValue::Value(77.5));
        assert_eq!(last_non_null(&rows, Metric::Glucose), LastValue::Missing);
    }

    #[test]
    fn test_last_non_null_empty() {
        let rows: Vec<&Observation> = Vec::new();
        let headline = HeadlineMetrics::compute(&rows);
        for metric in Metric::all() {
            assert_eq!(headline.get(*metric), LastValue::Missing);
            assert_eq!(headline.get(*metric).to_string(), "-");
        }
    }

    #[test]
    fn test_headline_values_from_different_rows() {
        let mut first = row("a", MetabolicState::Fasted, Some(200.6), None);
        first.glucose = Some(92.0);
        let mut second = row("b", MetabolicState::Fed, None, Some(80.9));
        second.ketones = Some(1.1);
        let rows = vec![&first, &second];

        let headline = HeadlineMetrics::compute(&rows);
        assert_eq!(headline.weight, LastValue::Value(200.6));
        assert_eq!(headline.glucose, LastValue::Value(92.0));
        assert_eq!(headline.ketones, LastValue::Value(1.1));
        assert_eq!(headline.ratio, LastValue::Value(80.9));
    }

    #[test]
    fn test_last_value_format() {
        assert_eq!(LastValue::Value(197.0).format(1), "197.0");
        assert_eq!(LastValue::Value(93.0).format(0), "93");
        assert_eq!(LastValue::Missing.format(1), "-");
    }

    #[test]
    fn test_last_value_json() {
        let json = serde_json::to_string(&vec![LastValue::Value(1.5), LastValue::Missing]).unwrap();
        assert_eq!(json, r#"[1.5,"-"]"#);
    }

    #[test]
    fn test_trend_series_excludes_nulls() {
        let rows = vec![
            row("12/10/25", MetabolicState::Fasted, Some(197.0), None),
            row("Week 45 Monday", MetabolicState::Fasted, None, None),
            row("Week 45 Tuesday", MetabolicState::Fasted, Some(196.5), None),
        ];
        let series = trend_series(&rows, Metric::Weight);
        let dates: Vec<&str> = series.points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["12/10/25", "Week 45 Tuesday"]);
        assert_eq!(series.points[1].value, 196.5);
        assert_eq!(series.max_value(), Some(197.0));
    }

    #[test]
    fn test_trend_series_all_null_is_empty() {
        let rows = vec![row("a", MetabolicState::Fed, None, None)];
        let series = trend_series(&rows, Metric::Ratio);
        assert!(series.is_empty());
        assert_eq!(series.max_value(), None);
        assert!(series.by_state().is_empty());
    }

    #[test]
    fn test_ratio_series_grouped_by_state() {
        let rows = vec![
            row("1", MetabolicState::Fed, None, Some(545.0)),
            row("2", MetabolicState::Fasted, None, Some(77.5)),
            row("3", MetabolicState::Fed, None, Some(125.0)),
        ];
        let series = trend_series(&rows, Metric::Ratio);
        let groups = series.by_state();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, MetabolicState::Fasted);
        assert_eq!(groups[0].1.len(), 1);
        assert_eq!(groups[1].0, MetabolicState::Fed);
        let fed: Vec<f64> = groups[1].1.iter().map(|p| p.value).collect();
        assert_eq!(fed, vec![545.0, 125.0]);
    }
}
