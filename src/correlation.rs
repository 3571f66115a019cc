//! Empirical viscosity correlations for helium.
//!
//! Each correlation is a published closed-form fit. The functions in this module return the
//! dynamic viscosity in Pa·s, exactly as the literature states them. [`Correlation::viscosity`]
//! and [`evaluate`] convert to µPa·s, the unit the reference measurements are tabulated in.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Critical pressure of helium in MPa (NIST).
pub const CRITICAL_PRESSURE: f64 = 0.22832;

/// Pa·s to µPa·s
const MICRO: f64 = 1e6;

/// The Kernforschungsanlage (KTA) power-law fit
///
/// $$
///     \eta = 3.674 \times 10^{-7} \, T^{0.7}
/// $$
#[must_use]
pub fn kta(temperature: f64) -> f64 {
    3.674 * 1e-7 * temperature.powf(0.7)
}

/// The refitted KTA power law
///
/// $$
///     \eta = 3.817 \times 10^{-7} \, T^{0.6938}
/// $$
#[must_use]
pub fn kta_mod(temperature: f64) -> f64 {
    3.817 * 1e-7 * temperature.powf(0.6938)
}

/// Pressure corrected form of [`kta_mod`]
///
/// $$
///     \eta = 10^{-7} \left[ 3.817 \, T^{0.6938} + \frac{P^{A}}{T P_c}
///         + e^{-(T - 325)^2 / 1000} \left( \left(\frac{P}{25}\right)^{2.7} - T^{B} \right) \right]
/// $$
///
/// with $A = (2 - T/300)^{5.05}$ and $B = (2 - 300/T)^2 - 1$. Temperature is in K and pressure in
/// MPa. Above 600K the base of $A$ turns negative and the result is `NaN`.
#[must_use]
pub fn kta_tweak(temperature: f64, pressure: f64) -> f64 {
    let a = (2. - temperature / 300.).powf(5.05);
    let b = (2. - 300. / temperature).powi(2) - 1.;
    let gaussian = (-(temperature - 325.).powi(2) / 1000.).exp();

    1e-7 * (3.817 * temperature.powf(0.6938)
        + pressure.powf(a) / (temperature * CRITICAL_PRESSURE)
        + gaussian * ((pressure / 25.).powf(2.7) - temperature.powf(b)))
}

/// The closed set of correlations the analysis can compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Correlation {
    Kta,
    KtaMod,
    KtaTweak,
}

impl Correlation {
    pub const ALL: [Self; 3] = [Self::Kta, Self::KtaMod, Self::KtaTweak];

    /// The key the correlation is known by in configuration files and reports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Kta => "KTA",
            Self::KtaMod => "KTA_mod",
            Self::KtaTweak => "KTA_tweak",
        }
    }

    /// Viscosity in µPa·s at `temperature` (K) and `pressure` (MPa)
    ///
    /// The pure power laws ignore `pressure`.
    #[must_use]
    pub fn viscosity(self, temperature: f64, pressure: f64) -> f64 {
        let eta = match self {
            Self::Kta => kta(temperature),
            Self::KtaMod => kta_mod(temperature),
            Self::KtaTweak => kta_tweak(temperature, pressure),
        };
        eta * MICRO
    }
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Correlation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|correlation| correlation.name() == s)
            .ok_or_else(|| Error::InvalidModel(s.to_owned()))
    }
}

impl TryFrom<String> for Correlation {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Correlation> for String {
    fn from(value: Correlation) -> Self {
        value.name().to_owned()
    }
}

/// Evaluate the correlation called `model` at `temperature` (K) and `pressure` (MPa), in µPa·s
///
/// # Errors
/// Returns [`Error::InvalidModel`] if `model` is not one of `KTA`, `KTA_mod` or `KTA_tweak`.
pub fn evaluate(temperature: f64, pressure: f64, model: &str) -> Result<f64> {
    let correlation: Correlation = model.parse()?;
    Ok(correlation.viscosity(temperature, pressure))
}
