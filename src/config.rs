use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::correlation::Correlation;
use crate::{Error, Result};

/// Settings for a comparison run, read from TOML
///
/// Every field has a default, so an empty file reproduces the standard helium comparison: the
/// four isotherms from 273.15K to 373.15K, all three correlations, and a report at 293.15K.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Isotherms to plot, in K
    pub temperatures: Vec<f64>,
    pub models: Vec<Correlation>,
    /// Isotherms to print a performance report for, in K
    pub report_temperatures: Vec<f64>,
    /// Dataset directory, the embedded dataset is used when unset
    pub dataset: Option<PathBuf>,
    /// Image path, `.svg` selects vector output
    pub output: PathBuf,
    pub plot: PlotOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            temperatures: vec![273.15, 293.15, 323.15, 373.15],
            models: Correlation::ALL.to_vec(),
            report_temperatures: vec![293.15],
            dataset: None,
            output: PathBuf::from("helium_grouped_plot.png"),
            plot: PlotOptions::default(),
        }
    }
}

impl AnalysisConfig {
    /// Read a config file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid TOML, or names an unknown model.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = toml::from_str(&contents)?;
        log::info!("read analysis config from {}", path.display());
        Ok(config)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotOptions {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Fixed vertical range of every panel, in percent
    pub deviation_range: (f64, f64),
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 800,
            deviation_range: (-1.5, 1.5),
        }
    }
}
