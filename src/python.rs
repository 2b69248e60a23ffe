//! Python bindings, built with the `python` cargo feature.

use pyo3::exceptions::{PyIndexError, PyOSError, PyValueError};
use pyo3::prelude::*;

use crate::common_types::Batch;
use crate::config::LoaderConfig;
use crate::dataset::UavDataset;
use crate::error::PrepError;
use crate::loader::{Batches, Loaders, build_loaders};
use crate::metrics::compute_metrics_str;

impl From<PrepError> for PyErr {
    fn from(err: PrepError) -> PyErr {
        match err {
            PrepError::Io { .. } => PyOSError::new_err(err.to_string()),
            PrepError::Index { .. } => PyIndexError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

type PyBatch = (Vec<Vec<f32>>, Vec<i64>);

fn batch_to_py(batch: Batch) -> PyBatch {
    let features = batch.features.outer_iter().map(|row| row.to_vec()).collect();
    (features, batch.labels.to_vec())
}

fn collect_pass(batches: Batches<'_>) -> Vec<PyBatch> {
    batches.map(batch_to_py).collect()
}

fn samples_to_py(dataset: &UavDataset) -> Vec<(Vec<f32>, i64)> {
    dataset.to_data_points().into_iter().map(|p| (p.features, p.label)).collect()
}

/// Label sequences accepted by `compute_metrics`: encoded codes or raw label text.
#[derive(FromPyObject)]
enum PyLabels {
    Codes(Vec<i64>),
    Text(Vec<String>),
}

/// Train/test loader pair as seen from Python.
#[pyclass(name = "UavDataLoaders")]
struct PyUavDataLoaders {
    loaders: Loaders,
}

#[pymethods]
impl PyUavDataLoaders {
    #[getter]
    fn input_dim(&self) -> usize {
        self.loaders.input_dim
    }

    #[getter]
    fn num_classes(&self) -> usize {
        self.loaders.num_classes
    }

    #[getter]
    fn classes(&self) -> Vec<String> {
        self.loaders.label_encoder.classes().to_vec()
    }

    /// One pass over the training data as a list of `(features, labels)` pairs.
    fn train_batches(&mut self) -> Vec<PyBatch> {
        collect_pass(self.loaders.train.iter())
    }

    fn test_batches(&mut self) -> Vec<PyBatch> {
        collect_pass(self.loaders.test.iter())
    }

    /// Every training sample in file order as `(features, label)`.
    fn train_samples(&self) -> Vec<(Vec<f32>, i64)> {
        samples_to_py(self.loaders.train.dataset())
    }

    fn test_samples(&self) -> Vec<(Vec<f32>, i64)> {
        samples_to_py(self.loaders.test.dataset())
    }

    /// Maps predicted class codes back to label text.
    fn decode(&self, codes: Vec<i64>) -> PyResult<Vec<String>> {
        Ok(self.loaders.label_encoder.inverse_transform(&codes)?)
    }
}

#[pyfunction]
#[pyo3(signature = (train_file, test_file, batch_size = 32, seed = None))]
fn get_uav_ids_dataloaders(
    train_file: &str,
    test_file: &str,
    batch_size: usize,
    seed: Option<u64>,
) -> PyResult<PyUavDataLoaders> {
    let mut config = LoaderConfig::new(batch_size);
    config.seed = seed;
    let loaders = build_loaders(train_file, test_file, &config)?;
    Ok(PyUavDataLoaders { loaders })
}

/// Returns `(accuracy, precision, recall, f1)`.
///
/// Both sequences must be integer codes or both label strings.
#[pyfunction]
#[pyo3(name = "compute_metrics", signature = (y_true, y_pred, average = "macro"))]
fn compute_metrics_py(y_true: PyLabels, y_pred: PyLabels, average: &str) -> PyResult<(f64, f64, f64, f64)> {
    let m = match (y_true, y_pred) {
        (PyLabels::Codes(t), PyLabels::Codes(p)) => compute_metrics_str(&t, &p, average)?,
        (PyLabels::Text(t), PyLabels::Text(p)) => compute_metrics_str(&t, &p, average)?,
        _ => return Err(PyValueError::new_err("y_true and y_pred must both be integers or both be strings")),
    };
    Ok((m.accuracy, m.precision, m.recall, m.f1))
}

pub(crate) fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(get_uav_ids_dataloaders, m)?)?;
    m.add_function(wrap_pyfunction!(compute_metrics_py, m)?)?;
    m.add_class::<PyUavDataLoaders>()?;
    Ok(())
}
