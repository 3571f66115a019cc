use std::fmt;

use itertools::{Itertools, MinMaxResult};
use ndarray::Array1;

use crate::correlation::Correlation;
use crate::dataset::ReferenceData;
use crate::deviation::{compute_deviations, DeviationRecord};
use crate::{Error, Result};

/// Aggregate deviation of one correlation over one isotherm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    /// Mean of the absolute relative deviations, in percent
    pub mean_abs_deviation_pct: f64,
    /// Largest absolute relative deviation, in percent
    pub max_abs_deviation_pct: f64,
    /// Lowest pressure covered, in MPa
    pub min_pressure: f64,
    /// Highest pressure covered, in MPa
    pub max_pressure: f64,
    pub count: usize,
}

/// Summarise a set of deviation records
///
/// # Errors
/// Returns [`Error::EmptyResultSet`] when `records` is empty, as no statistic is defined.
pub fn summarize(records: &[DeviationRecord]) -> Result<Summary> {
    let (min_pressure, max_pressure) = match records.iter().map(|r| r.pressure).minmax() {
        MinMaxResult::NoElements => return Err(Error::EmptyResultSet),
        MinMaxResult::OneElement(p) => (p, p),
        MinMaxResult::MinMax(low, high) => (low, high),
    };

    let abs_deviations: Array1<f64> = records
        .iter()
        .map(|r| r.relative_deviation_pct.abs())
        .collect();
    let mean_abs_deviation_pct = abs_deviations.mean().unwrap_or(f64::NAN);
    // NaN propagates, so the max is NaN whenever the mean is
    let max_abs_deviation_pct =
        abs_deviations.fold(0f64, |max, &dev| if dev.is_nan() || dev > max { dev } else { max });

    Ok(Summary {
        mean_abs_deviation_pct,
        max_abs_deviation_pct,
        min_pressure,
        max_pressure,
        count: records.len(),
    })
}

/// Performance of one correlation on one isotherm, printable as a console report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelReport {
    pub correlation: Correlation,
    pub temperature: f64,
    pub summary: Summary,
}

impl fmt::Display for ModelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {}", self.correlation)?;
        writeln!(
            f,
            "Temperature: {:.2}K || Pressure range: {:.2}MPa - {:.2}MPa",
            self.temperature, self.summary.min_pressure, self.summary.max_pressure
        )?;
        writeln!(f, "Average ARD: {:.2}%", self.summary.mean_abs_deviation_pct)?;
        write!(f, "Max ARD: {:.2}%", self.summary.max_abs_deviation_pct)
    }
}

/// Summarise each of `correlations` on the isotherm at `temperature`
///
/// A correlation without data at `temperature` is logged and left out, the others are still
/// reported.
///
/// # Errors
/// Propagates [`Error::DegenerateMeasurement`] from the deviation step.
pub fn model_performance(
    data: &impl ReferenceData,
    temperature: f64,
    correlations: &[Correlation],
) -> Result<Vec<ModelReport>> {
    let mut reports = Vec::with_capacity(correlations.len());
    for &correlation in correlations {
        let records = compute_deviations(data, temperature, correlation)?;
        if records.is_empty() {
            log::warn!("No data found at {temperature}K, skipping {correlation}");
            continue;
        }
        reports.push(ModelReport {
            correlation,
            temperature,
            summary: summarize(&records)?,
        });
    }
    Ok(reports)
}
