#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// #![warn(clippy::cargo)]

pub mod config;
pub mod correlation;
pub mod dataset;
pub mod deviation;
mod error;
pub mod render;
pub mod summary;

pub use correlation::{evaluate, Correlation};
pub use dataset::{Dataset, MarkerSymbol, Measurement, ReferenceData, SourceSeries};
pub use deviation::{compute_deviations, compute_deviations_by_name, DeviationRecord};
pub use error::Error;
pub use summary::{model_performance, summarize, ModelReport, Summary};

pub type Result<T> = ::std::result::Result<T, Error>;
