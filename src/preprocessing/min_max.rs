//! Per-column min-max scaling.

use std::fmt::Debug;

use ndarray::{Array2, ArrayView2, Axis};
use num_traits::Float;

use crate::error::{PrepError, Result};

/// Rescales each column linearly so the fitted minimum lands on `feature_range.0`
/// and the fitted maximum on `feature_range.1`.
///
/// A constant column (`max == min`) uses a range of one, so its fitted values all
/// map to the lower bound instead of dividing by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler<F> {
    data_min: Vec<F>,
    data_max: Vec<F>,
    feature_range: (F, F),
}

impl<F> MinMaxScaler<F>
where
    F: Float + Debug + 'static,
{
    /// Records per-column extrema of `data` (rows x columns).
    pub fn fit(data: ArrayView2<'_, F>, feature_range: (F, F)) -> Result<Self> {
        if !(feature_range.0 < feature_range.1) {
            return Err(PrepError::Config(format!(
                "feature range {:?} must have min < max",
                feature_range
            )));
        }
        if data.nrows() == 0 {
            return Err(PrepError::Config("cannot fit a scaler on zero rows".to_string()));
        }

        let mut data_min = Vec::with_capacity(data.ncols());
        let mut data_max = Vec::with_capacity(data.ncols());
        for column in data.axis_iter(Axis(1)) {
            let (lo, hi) = column
                .iter()
                .fold((F::infinity(), F::neg_infinity()), |(lo, hi), &x| (lo.min(x), hi.max(x)));
            data_min.push(lo);
            data_max.push(hi);
        }
        Ok(MinMaxScaler { data_min, data_max, feature_range })
    }

    pub fn n_features(&self) -> usize {
        self.data_min.len()
    }

    pub fn data_min(&self) -> &[F] {
        &self.data_min
    }

    pub fn data_max(&self) -> &[F] {
        &self.data_max
    }

    pub fn feature_range(&self) -> (F, F) {
        self.feature_range
    }

    fn data_range(&self, column: usize) -> F {
        let range = self.data_max[column] - self.data_min[column];
        if range == F::zero() { F::one() } else { range }
    }

    fn check_width(&self, data: &ArrayView2<'_, F>) -> Result<()> {
        if data.ncols() != self.n_features() {
            return Err(PrepError::Schema(format!(
                "scaler was fitted on {} columns, got {}",
                self.n_features(),
                data.ncols()
            )));
        }
        Ok(())
    }

    /// Applies the fitted scaling. Values outside the fitted extrema map outside the range.
    pub fn transform(&self, data: ArrayView2<'_, F>) -> Result<Array2<F>> {
        self.check_width(&data)?;
        let (lo, hi) = self.feature_range;
        let mut out = data.to_owned();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let min = self.data_min[j];
            let range = self.data_range(j);
            column.mapv_inplace(|x| (x - min) / range * (hi - lo) + lo);
        }
        Ok(out)
    }

    pub fn inverse_transform(&self, data: ArrayView2<'_, F>) -> Result<Array2<F>> {
        self.check_width(&data)?;
        let (lo, hi) = self.feature_range;
        let mut out = data.to_owned();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let min = self.data_min[j];
            let range = self.data_range(j);
            column.mapv_inplace(|x| (x - lo) / (hi - lo) * range + min);
        }
        Ok(out)
    }
}
