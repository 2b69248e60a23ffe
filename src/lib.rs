//! Preprocessing and evaluation helpers for UAV intrusion-detection experiments.
//!
//! - [`dataset::UavDataset`] turns a CSV file into scaled `f32` features and encoded labels.
//! - [`loader::build_loaders`] builds train/test batch loaders that share fitted state.
//! - [`metrics::compute_metrics`] scores predictions with accuracy, precision, recall and F1.

pub mod common_types;
pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod preprocessing;
pub mod schema;

#[cfg(feature = "python")]
mod python;

pub use common_types::{Batch, DataPoint, Sample};
pub use config::{FitPolicy, LoaderConfig};
pub use dataset::UavDataset;
pub use error::{PrepError, Result};
pub use loader::{Batches, DataLoader, Loaders, build_loaders};
pub use metrics::{Average, ClassificationMetrics, ConfusionMatrix, compute_metrics};
pub use preprocessing::{FittedPreprocessor, LabelEncoder, MinMaxScaler};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// A Python module implemented in Rust. The name of this function must match
/// the `lib.name` in `Cargo.toml`.
#[cfg(feature = "python")]
#[pymodule]
fn uav_ids_prep(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    python::register(m)
}
