//! Reference viscosity measurements, grouped by the source they were published in.
//!
//! On disk a dataset is a directory holding a `dataset.toml` manifest and one CSV file per
//! source:
//!
//! ```toml
//! version = 1
//! name = "helium-reference-sample"
//!
//! [[sources]]
//! label = "isotherm-survey"
//! marker = "o"
//! file = "isotherm_survey.csv"
//! ```
//!
//! Each CSV has a header row and the columns `temperature` (K), `pressure` (MPa) and `viscosity`
//! (µPa·s).
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The manifest version this crate reads and writes
pub const DATASET_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "dataset.toml";

const EMBEDDED_MANIFEST: &str = include_str!("../data/reference/dataset.toml");
const EMBEDDED_TABLES: [(&str, &str); 3] = [
    (
        "isotherm_survey.csv",
        include_str!("../data/reference/isotherm_survey.csv"),
    ),
    (
        "capillary_dilute.csv",
        include_str!("../data/reference/capillary_dilute.csv"),
    ),
    (
        "oscillating_disk.csv",
        include_str!("../data/reference/oscillating_disk.csv"),
    ),
];

/// Plot marker a source is drawn with, spelled the way the dataset manifest spells it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MarkerSymbol {
    Circle,
    Square,
    TriangleUp,
    TriangleDown,
    Diamond,
    ThinDiamond,
    Star,
    Pentagon,
    Cross,
    Plus,
    TriUp,
    Hexagon,
}

impl MarkerSymbol {
    pub(crate) const CODES: [(Self, &'static str); 12] = [
        (Self::Circle, "o"),
        (Self::Square, "s"),
        (Self::TriangleUp, "^"),
        (Self::TriangleDown, "v"),
        (Self::Diamond, "D"),
        (Self::ThinDiamond, "d"),
        (Self::Star, "*"),
        (Self::Pentagon, "p"),
        (Self::Cross, "x"),
        (Self::Plus, "+"),
        (Self::TriUp, "2"),
        (Self::Hexagon, "h"),
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        Self::CODES
            .iter()
            .find_map(|(marker, code)| (*marker == self).then_some(*code))
            .unwrap_or("o")
    }

    /// Line-like markers have no interior, so they are drawn in the series colour
    #[must_use]
    pub const fn is_filled(self) -> bool {
        matches!(self, Self::Pentagon | Self::Cross | Self::TriUp | Self::Plus)
    }
}

impl fmt::Display for MarkerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MarkerSymbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::CODES
            .iter()
            .find_map(|(marker, code)| (*code == s).then_some(*marker))
            .ok_or_else(|| Error::InvalidMarker(s.to_owned()))
    }
}

impl TryFrom<String> for MarkerSymbol {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MarkerSymbol> for String {
    fn from(value: MarkerSymbol) -> Self {
        value.code().to_owned()
    }
}

/// A single tabulated measurement, borrowed from the series it belongs to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement<'a> {
    /// Temperature in K
    pub temperature: f64,
    /// Pressure in MPa
    pub pressure: f64,
    /// Measured dynamic viscosity in µPa·s
    pub viscosity: f64,
    pub source_label: &'a str,
    pub marker_symbol: MarkerSymbol,
}

/// The measurements of one source, as index-aligned columns in tabulation order.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceSeries {
    label: String,
    marker: MarkerSymbol,
    temperatures: Vec<f64>,
    pressures: Vec<f64>,
    viscosities: Vec<f64>,
}

impl SourceSeries {
    /// Build a series from its columns
    ///
    /// # Errors
    /// Returns [`Error::MisalignedSeries`] if the three columns differ in length.
    pub fn new(
        label: impl Into<String>,
        marker: MarkerSymbol,
        temperatures: Vec<f64>,
        pressures: Vec<f64>,
        viscosities: Vec<f64>,
    ) -> Result<Self> {
        let label = label.into();
        if temperatures.len() != pressures.len() || pressures.len() != viscosities.len() {
            return Err(Error::MisalignedSeries {
                source_label: label,
                temperatures: temperatures.len(),
                pressures: pressures.len(),
                viscosities: viscosities.len(),
            });
        }
        Ok(Self {
            label,
            marker,
            temperatures,
            pressures,
            viscosities,
        })
    }

    /// Parse a series from CSV with a `temperature,pressure,viscosity` header
    fn from_csv(label: String, marker: MarkerSymbol, csv: &[u8]) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(csv);

        let mut temperatures = vec![];
        let mut pressures = vec![];
        let mut viscosities = vec![];
        for result in rdr.deserialize() {
            let record: Row = result?;
            temperatures.push(record.0);
            pressures.push(record.1);
            viscosities.push(record.2);
        }

        Self::new(label, marker, temperatures, pressures, viscosities)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn marker(&self) -> MarkerSymbol {
        self.marker
    }

    #[must_use]
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    #[must_use]
    pub fn pressures(&self) -> &[f64] {
        &self.pressures
    }

    #[must_use]
    pub fn viscosities(&self) -> &[f64] {
        &self.viscosities
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    pub fn measurements(&self) -> impl Iterator<Item = Measurement<'_>> + '_ {
        self.temperatures
            .iter()
            .zip(&self.pressures)
            .zip(&self.viscosities)
            .map(|((&temperature, &pressure), &viscosity)| Measurement {
                temperature,
                pressure,
                viscosity,
                source_label: &self.label,
                marker_symbol: self.marker,
            })
    }
}

#[derive(Deserialize)]
struct Row(f64, f64, f64);

/// Source of reference measurements for the deviation analysis
pub trait ReferenceData {
    /// Sources in the order they should be reported and plotted
    fn sources(&self) -> &[SourceSeries];

    /// Every measurement of every source, source by source in tabulation order
    fn measurements(&self) -> impl Iterator<Item = Measurement<'_>> + '_ {
        self.sources().iter().flat_map(|series| series.measurements())
    }

    /// The lowest and highest tabulated temperature, if there is any data at all
    fn temperature_range(&self) -> Option<(f64, f64)> {
        match self.measurements().map(|m| m.temperature).minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(t) => Some((t, t)),
            MinMaxResult::MinMax(low, high) => Some((low, high)),
        }
    }
}

/// On-disk description of a dataset
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Manifest {
    pub version: u32,
    pub name: String,
    pub sources: Vec<SourceEntry>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SourceEntry {
    pub label: String,
    pub marker: MarkerSymbol,
    /// CSV file, relative to the manifest
    pub file: PathBuf,
}

/// A named, versioned collection of reference sources.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    name: String,
    sources: Vec<SourceSeries>,
}

impl Dataset {
    /// Assemble a dataset from in-memory series
    ///
    /// # Errors
    /// Returns [`Error::DuplicateSource`] if two series share a label.
    pub fn new(name: impl Into<String>, sources: Vec<SourceSeries>) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = sources.iter().find(|series| !seen.insert(series.label())) {
            return Err(Error::DuplicateSource(duplicate.label().to_owned()));
        }
        Ok(Self {
            name: name.into(),
            sources,
        })
    }

    /// Load a dataset directory
    ///
    /// # Errors
    /// Returns an error if the manifest or a source file cannot be read or parsed, if the
    /// manifest version is not [`DATASET_VERSION`], or if a source is malformed.
    pub fn load(directory: &Path) -> Result<Self> {
        let manifest_path = directory.join(MANIFEST_FILE);
        log::info!("loading reference dataset from {}", manifest_path.display());
        let manifest = fs::read_to_string(&manifest_path)
            .map_err(|e| Error::io(&manifest_path, e))?;

        Self::assemble(&manifest, |file| {
            let path = directory.join(file);
            fs::read(&path).map_err(|e| Error::io(path, e))
        })
    }

    /// The sample dataset compiled into the crate
    ///
    /// # Errors
    /// Only fails if the embedded tables are malformed.
    pub fn embedded() -> Result<Self> {
        Self::assemble(EMBEDDED_MANIFEST, |file| {
            EMBEDDED_TABLES
                .iter()
                .find(|(name, _)| Path::new(name) == file)
                .map(|(_, table)| table.as_bytes().to_vec())
                .ok_or_else(|| {
                    Error::io(
                        file,
                        std::io::Error::from(std::io::ErrorKind::NotFound),
                    )
                })
        })
    }

    fn assemble(manifest: &str, mut read: impl FnMut(&Path) -> Result<Vec<u8>>) -> Result<Self> {
        let manifest: Manifest = toml::from_str(manifest)?;
        if manifest.version != DATASET_VERSION {
            return Err(Error::UnsupportedDatasetVersion(manifest.version));
        }

        let sources = manifest
            .sources
            .into_iter()
            .map(|entry| {
                let table = read(entry.file.as_path())?;
                let series = SourceSeries::from_csv(entry.label, entry.marker, &table)?;
                log::debug!("read {} measurements for `{}`", series.len(), series.label());
                Ok(series)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(manifest.name, sources)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ReferenceData for Dataset {
    fn sources(&self) -> &[SourceSeries] {
        &self.sources
    }
}
