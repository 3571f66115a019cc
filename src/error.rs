use std::path::PathBuf;

/// Everything that can go wrong between loading reference data and writing the comparison plot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested correlation name is not one of the known keys.
    #[error("invalid viscosity model `{0}`, expected one of KTA, KTA_mod, KTA_tweak")]
    InvalidModel(String),
    /// No reference measurement lies within tolerance of the requested temperature.
    #[error("no reference measurements to summarise")]
    EmptyResultSet,
    /// A reference measurement with zero viscosity has no defined relative deviation.
    #[error("measured viscosity is zero for `{source_label}` at {temperature}K, {pressure}MPa")]
    DegenerateMeasurement {
        source_label: String,
        temperature: f64,
        pressure: f64,
    },
    #[error(
        "columns of `{source_label}` are not aligned: {temperatures} temperatures, \
         {pressures} pressures, {viscosities} viscosities"
    )]
    MisalignedSeries {
        source_label: String,
        temperatures: usize,
        pressures: usize,
        viscosities: usize,
    },
    #[error("unsupported dataset version {0}")]
    UnsupportedDatasetVersion(u32),
    #[error("source `{0}` appears more than once in the dataset")]
    DuplicateSource(String),
    #[error("unknown marker symbol `{0}`")]
    InvalidMarker(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("failed to render comparison plot: {0}")]
    Render(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
