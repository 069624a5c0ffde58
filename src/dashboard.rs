//! Dashboard rendering
//!
//! Builds the per-user view (headline metrics, two trend series, raw rows)
//! and writes it as plain text or JSON. Charts become text series: one
//! line per point with a bar scaled to the series maximum.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::healthlog::codec::HEADER;
use crate::healthlog::{trend_series, HeadlineMetrics, HealthLog, TrendPoint, TrendSeries};
use crate::types::{Metric, Observation};

/// Title printed above every text dashboard
pub const TITLE: &str = "Metabolic Health Tracker";

/// Printed instead of a report when there is nothing to show
pub const EMPTY_MESSAGE: &str = "No data to display.";

const BAR_WIDTH: usize = 30;

/// Everything shown for one selected user
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView<'a> {
    pub user: Option<String>,
    pub users: Vec<&'a str>,
    pub headline: HeadlineMetrics,
    pub weight_trend: TrendSeries,
    pub ratio_trend: TrendSeries,
    pub observations: Vec<&'a Observation>,
}

impl<'a> DashboardView<'a> {
    /// Build the view for `user` (already resolved by the caller)
    pub fn build(log: &'a HealthLog, user: Option<&str>) -> Self {
        let observations = user.map(|u| log.filter_by_user(u)).unwrap_or_default();

        Self {
            user: user.map(str::to_string),
            users: log.users(),
            headline: HeadlineMetrics::compute(&observations),
            weight_trend: trend_series(observations.iter().copied(), Metric::Weight),
            ratio_trend: trend_series(observations.iter().copied(), Metric::Ratio),
            observations,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Write the full dashboard
pub fn write_dashboard<W: Write>(out: &mut W, view: &DashboardView<'_>, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, view);
    }

    writeln!(out, "{}", TITLE)?;
    if view.is_empty() {
        writeln!(out, "{}", EMPTY_MESSAGE)?;
        return Ok(());
    }

    if let Some(ref user) = view.user {
        writeln!(out, "User: {}", user)?;
    }
    writeln!(out)?;
    write_headline(out, &view.headline)?;

    writeln!(out)?;
    writeln!(out, "== Trends ==")?;
    write_trend_text(out, &view.weight_trend)?;
    write_trend_text(out, &view.ratio_trend)?;

    writeln!(out)?;
    writeln!(out, "== Data ==")?;
    write_table(out, &view.observations)?;
    Ok(())
}

/// Write the four headline metrics
pub fn write_summary<W: Write>(out: &mut W, view: &DashboardView<'_>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, &view.headline),
        OutputFormat::Text if view.is_empty() => {
            writeln!(out, "{}", EMPTY_MESSAGE)?;
            Ok(())
        }
        OutputFormat::Text => write_headline(out, &view.headline),
    }
}

/// Write one trend series
pub fn write_trend<W: Write>(out: &mut W, series: &TrendSeries, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, series),
        OutputFormat::Text if series.is_empty() => {
            writeln!(out, "{}", EMPTY_MESSAGE)?;
            Ok(())
        }
        OutputFormat::Text => write_trend_text(out, series),
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn write_headline<W: Write>(out: &mut W, headline: &HeadlineMetrics) -> Result<()> {
    let cells: Vec<String> = Metric::all()
        .iter()
        .map(|m| format!("{}: {}", m.label(), headline.get(*m).format(m.precision())))
        .collect();
    writeln!(out, "{}", cells.join("   "))?;
    Ok(())
}

/// Chart title, as shown above each series
pub fn trend_title(metric: Metric) -> &'static str {
    match metric {
        Metric::Weight => "Weight Trend",
        Metric::Glucose => "Glucose Trend",
        Metric::Ketones => "Ketone Trend",
        Metric::Ratio => "G/K Ratio",
    }
}

fn write_trend_text<W: Write>(out: &mut W, series: &TrendSeries) -> Result<()> {
    // An all-null series has no chart at all.
    if series.is_empty() {
        return Ok(());
    }

    let max = series.max_value().unwrap_or(0.0);
    let date_width = series.points.iter().map(|p| p.date.len()).max().unwrap_or(0);
    let precision = series.metric.precision();

    writeln!(out)?;
    writeln!(out, "{}", trend_title(series.metric))?;

    if series.metric == Metric::Ratio {
        for (state, points) in series.by_state() {
            writeln!(out, "  [{}]", state)?;
            for point in points {
                write_point(out, point, date_width, precision, max, "    ")?;
            }
        }
    } else {
        for point in &series.points {
            write_point(out, point, date_width, precision, max, "  ")?;
        }
    }
    Ok(())
}

fn write_point<W: Write>(
    out: &mut W,
    point: &TrendPoint,
    date_width: usize,
    precision: usize,
    max: f64,
    indent: &str,
) -> Result<()> {
    writeln!(
        out,
        "{}{:<dw$}  {:>8.*}  {}",
        indent,
        point.date,
        precision,
        point.value,
        bar(point.value, max),
        dw = date_width,
    )?;
    Ok(())
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.clamp(1, BAR_WIDTH))
}

/// Write observations as an aligned table; null cells are blank
pub fn write_table<W: Write>(out: &mut W, observations: &[&Observation]) -> Result<()> {
    let rows: Vec<[String; 10]> = observations.iter().map(|o| table_row(o)).collect();

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
    write_row(out, &header, &widths)?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, cells: &[String], widths: &[usize; 10]) -> Result<()> {
    let line: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    writeln!(out, "{}", line.join("  ").trim_end())?;
    Ok(())
}

fn table_row(obs: &Observation) -> [String; 10] {
    let num = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    [
        obs.date.clone(),
        obs.time.clone(),
        obs.user.clone(),
        obs.state.to_string(),
        num(obs.glucose),
        num(obs.ketones),
        num(obs.ratio),
        num(obs.weight),
        obs.body_fat_pct.clone().unwrap_or_default(),
        obs.blood_pressure.clone().unwrap_or_default(),
    ]
}
