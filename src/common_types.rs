//! This module contains the sample and batch types handed out by the dataset and loaders.

use ndarray::{Array1, Array2, ArrayView1};

/// Represents a single owned data point, with features and a label.
///
/// - `F`: The type of the features (e.g., `f32`, `f64`).
/// - `L`: The type of the label (e.g., `i64`, `String`).
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint<F, L> {
    pub features: Vec<F>,
    pub label: L,
}

impl<F, L> DataPoint<F, L> {
    pub fn new(features: Vec<F>, label: L) -> Self {
        DataPoint { features, label }
    }
}

/// A read-only view of one row of a dataset: scaled features plus encoded label.
#[derive(Debug, Clone, Copy)]
pub struct Sample<'a> {
    pub features: ArrayView1<'a, f32>,
    pub label: i64,
}

impl Sample<'_> {
    /// Copies the view out into an owned `DataPoint`.
    pub fn to_data_point(&self) -> DataPoint<f32, i64> {
        DataPoint::new(self.features.to_vec(), self.label)
    }
}

/// A group of samples stacked into tensors.
///
/// `features` has shape `[rows, feature_dim]`, `labels` has shape `[rows]`,
/// and `indices[i]` is the dataset position row `i` was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub features: Array2<f32>,
    pub labels: Array1<i64>,
    pub indices: Vec<usize>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
