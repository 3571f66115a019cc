use crate::correlation::Correlation;
use crate::dataset::{MarkerSymbol, Measurement, ReferenceData};
use crate::{Error, Result};

/// Half-width of the temperature window, in K, a measurement must fall in to count towards an
/// isotherm.
pub const TEMPERATURE_TOLERANCE: f64 = 0.5;

/// A reference measurement compared against a correlation.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviationRecord {
    /// Recorded temperature of the measurement in K, not the isotherm it was selected for
    pub temperature: f64,
    /// Pressure in MPa
    pub pressure: f64,
    /// Measured viscosity in µPa·s
    pub measured_viscosity: f64,
    pub source_label: String,
    pub correlation: Correlation,
    /// Correlation viscosity in µPa·s at the measurement's temperature and pressure
    pub model_viscosity: f64,
    /// $100 (\eta_{model} - \eta_{measured}) / \eta_{measured}$
    pub relative_deviation_pct: f64,
    pub marker_symbol: MarkerSymbol,
}

impl DeviationRecord {
    fn compare(measurement: &Measurement<'_>, correlation: Correlation) -> Result<Self> {
        if measurement.viscosity == 0. {
            return Err(Error::DegenerateMeasurement {
                source_label: measurement.source_label.to_owned(),
                temperature: measurement.temperature,
                pressure: measurement.pressure,
            });
        }

        let model_viscosity = correlation.viscosity(measurement.temperature, measurement.pressure);
        let relative_deviation_pct =
            100. * (model_viscosity - measurement.viscosity) / measurement.viscosity;

        Ok(Self {
            temperature: measurement.temperature,
            pressure: measurement.pressure,
            measured_viscosity: measurement.viscosity,
            source_label: measurement.source_label.to_owned(),
            correlation,
            model_viscosity,
            relative_deviation_pct,
            marker_symbol: measurement.marker_symbol,
        })
    }
}

/// Whether a measurement at `temperature` belongs to the isotherm at `target_temperature`
#[must_use]
pub fn within_tolerance(temperature: f64, target_temperature: f64) -> bool {
    (temperature - target_temperature).abs() <= TEMPERATURE_TOLERANCE
}

/// Compare `correlation` against every reference measurement on the isotherm at
/// `target_temperature`
///
/// Records come out grouped by source in provider order, then in tabulation order. An isotherm
/// with no data yields an empty `Vec`.
///
/// # Errors
/// Returns [`Error::DegenerateMeasurement`] if a selected measurement has zero viscosity.
pub fn compute_deviations(
    data: &impl ReferenceData,
    target_temperature: f64,
    correlation: Correlation,
) -> Result<Vec<DeviationRecord>> {
    let records = data
        .measurements()
        .filter(|measurement| within_tolerance(measurement.temperature, target_temperature))
        .map(|measurement| DeviationRecord::compare(&measurement, correlation))
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "{} measurements within {TEMPERATURE_TOLERANCE}K of {target_temperature}K for {correlation}",
        records.len()
    );
    Ok(records)
}

/// [`compute_deviations`] for a correlation given by name
///
/// # Errors
/// Returns [`Error::InvalidModel`] for an unknown name, otherwise as [`compute_deviations`].
pub fn compute_deviations_by_name(
    data: &impl ReferenceData,
    target_temperature: f64,
    model: &str,
) -> Result<Vec<DeviationRecord>> {
    compute_deviations(data, target_temperature, model.parse()?)
}
