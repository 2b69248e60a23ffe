//! The UAV intrusion-detection dataset: a cleaned, scaled and label-encoded CSV file.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::common_types::{Batch, DataPoint, Sample};
use crate::error::{PrepError, Result};
use crate::preprocessing::{FittedPreprocessor, LabelEncoder, MinMaxScaler};
use crate::schema::{RawTable, Schema, parse_numeric};

/// In-memory dataset of scaled `f32` features and `i64` label codes.
///
/// Loading runs a fixed pipeline:
/// 1. rows holding a missing or infinite value in any column are dropped,
/// 2. the last column is the label, the rest are features,
/// 3. non-numeric feature columns are dropped (and reported through `log::warn!`),
/// 4. labels are encoded with a [`LabelEncoder`],
/// 5. features are rescaled with a [`MinMaxScaler`].
///
/// Steps 4 and 5 either fit fresh state ([`UavDataset::from_csv`]) or reuse the
/// state of another dataset ([`UavDataset::from_csv_fitted`]).
#[derive(Debug, Clone)]
pub struct UavDataset {
    path: PathBuf,
    features: Array2<f32>,
    labels: Array1<i64>,
    dropped_columns: Vec<String>,
    preprocessor: FittedPreprocessor,
}

/// Reads the table, types its columns and removes incomplete rows.
fn load_clean(path: &Path) -> Result<(RawTable, Schema)> {
    let mut table = RawTable::from_csv(path)?;
    let schema = Schema::infer(&table);
    let dropped = table.drop_missing();
    if dropped > 0 {
        debug!("dropped {} rows with missing or infinite values from {}", dropped, path.display());
    }
    if table.rows.is_empty() {
        return Err(PrepError::EmptyDataset(path.to_path_buf()));
    }
    Ok((table, schema))
}

/// Collects the given columns of `table` into a rows x columns matrix.
fn numeric_matrix(table: &RawTable, columns: &[usize]) -> Result<Array2<f64>> {
    let mut values = Vec::with_capacity(table.rows.len() * columns.len());
    for (row_idx, row) in table.rows.iter().enumerate() {
        for &col in columns {
            let value = parse_numeric(&row[col]).ok_or_else(|| {
                PrepError::Format(format!(
                    "row {}: column {:?} holds non-numeric value {:?}",
                    row_idx + 1,
                    table.headers[col],
                    row[col]
                ))
            })?;
            values.push(value);
        }
    }
    Array2::from_shape_vec((table.rows.len(), columns.len()), values).map_err(|e| PrepError::Format(e.to_string()))
}

/// Scales and narrows the feature matrix to `f32`.
fn to_feature_tensor(scaler: &MinMaxScaler<f64>, matrix: ArrayView2<'_, f64>) -> Result<Array2<f32>> {
    let scaled = scaler.transform(matrix)?.mapv(|x| x as f32);
    if scaled.iter().any(|v| !v.is_finite()) {
        return Err(PrepError::Format("scaled feature value does not fit in f32".to_string()));
    }
    Ok(scaled)
}

impl UavDataset {
    /// Loads `path` and fits a fresh vocabulary and scaler onto `[0, 1]`.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        Self::fit_csv(path, (0.0, 1.0))
    }

    /// Loads `path` and fits a fresh vocabulary and scaler onto `feature_range`.
    pub fn fit_csv(path: impl AsRef<Path>, feature_range: (f64, f64)) -> Result<Self> {
        let path = path.as_ref();
        let (table, schema) = load_clean(path)?;

        let dropped_columns = schema.non_numeric_names();
        if !dropped_columns.is_empty() {
            warn!("Non-numeric columns in UAV_IDS features: {:?}", dropped_columns);
        }

        let (feature_names, columns): (Vec<String>, Vec<usize>) =
            schema.numeric_features().map(|c| (c.name.clone(), c.index)).unzip();
        if columns.is_empty() {
            return Err(PrepError::NoFeatures(path.to_path_buf()));
        }

        let label_encoder = LabelEncoder::fit(table.labels());
        let labels = label_encoder.transform(table.labels())?;

        let matrix = numeric_matrix(&table, &columns)?;
        let scaler = MinMaxScaler::fit(matrix.view(), feature_range)?;
        let features = to_feature_tensor(&scaler, matrix.view())?;

        let dataset = UavDataset {
            path: path.to_path_buf(),
            features,
            labels,
            dropped_columns,
            preprocessor: FittedPreprocessor { feature_names, label_encoder, scaler },
        };
        dataset.log_summary();
        Ok(dataset)
    }

    /// Loads `path` using state fitted on another fold.
    ///
    /// The fitted feature columns are looked up by name and must be numeric here;
    /// any other feature column is dropped. Labels outside the fitted vocabulary fail.
    pub fn from_csv_fitted(path: impl AsRef<Path>, preprocessor: &FittedPreprocessor) -> Result<Self> {
        let path = path.as_ref();
        let (table, schema) = load_clean(path)?;

        let non_numeric = schema.non_numeric_names();
        if !non_numeric.is_empty() {
            warn!("Non-numeric columns in UAV_IDS features: {:?}", non_numeric);
        }
        let columns = schema.require_numeric(&preprocessor.feature_names)?;
        let dropped_columns: Vec<String> = schema
            .features
            .iter()
            .filter(|c| !columns.contains(&c.index))
            .map(|c| c.name.clone())
            .collect();

        let labels = preprocessor.label_encoder.transform(table.labels())?;
        let matrix = numeric_matrix(&table, &columns)?;
        let features = to_feature_tensor(&preprocessor.scaler, matrix.view())?;

        let dataset = UavDataset {
            path: path.to_path_buf(),
            features,
            labels,
            dropped_columns,
            preprocessor: preprocessor.clone(),
        };
        dataset.log_summary();
        Ok(dataset)
    }

    fn log_summary(&self) {
        info!(
            "loaded {} samples with {} features and {} classes from {}",
            self.len(),
            self.feature_dim(),
            self.num_classes(),
            self.path.display()
        );
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the sample at `index`.
    pub fn get(&self, index: usize) -> Result<Sample<'_>> {
        if index >= self.len() {
            return Err(PrepError::Index { index, len: self.len() });
        }
        Ok(Sample { features: self.features.row(index), label: self.labels[index] })
    }

    /// Iterates over all samples in file order.
    pub fn iter(&self) -> impl Iterator<Item = Sample<'_>> + '_ {
        self.features
            .axis_iter(Axis(0))
            .zip(self.labels.iter())
            .map(|(features, &label)| Sample { features, label })
    }

    /// Copies every sample out as an owned `DataPoint`, in file order.
    pub fn to_data_points(&self) -> Vec<DataPoint<f32, i64>> {
        self.iter().map(|sample| sample.to_data_point()).collect()
    }

    /// Stacks the samples at `indices` into a batch. Indices must be in range.
    pub(crate) fn gather(&self, indices: &[usize]) -> Batch {
        Batch {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
            indices: indices.to_vec(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of feature columns after cleaning.
    pub fn feature_dim(&self) -> usize {
        self.features.ncols()
    }

    pub fn num_classes(&self) -> usize {
        self.preprocessor.num_classes()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.preprocessor.feature_names
    }

    /// Feature columns present in the file but not used.
    pub fn dropped_columns(&self) -> &[String] {
        &self.dropped_columns
    }

    pub fn label_encoder(&self) -> &LabelEncoder {
        &self.preprocessor.label_encoder
    }

    pub fn scaler(&self) -> &MinMaxScaler<f64> {
        &self.preprocessor.scaler
    }

    pub fn preprocessor(&self) -> &FittedPreprocessor {
        &self.preprocessor
    }

    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    pub fn labels(&self) -> ArrayView1<'_, i64> {
        self.labels.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    const TRAIN: &str = "\
timestamp,speed,mode,altitude,armed,class
t0,0,auto,100,true,benign
t1,5,manual,,false,benign
t2,10,auto,300,true,spoofing
t3,inf,auto,200,true,jamming
t4,20,manual,200,false,jamming
t5,15,auto,500,true,benign
";

    #[test]
    fn test_cleaning_drops_rows_and_columns() {
        let file = write_csv(TRAIN);
        let dataset = UavDataset::from_csv(file.path()).unwrap();

        // rows t1 (missing altitude) and t3 (infinite speed) are gone
        assert_eq!(dataset.len(), 4);
        assert!(!dataset.is_empty());
        assert_eq!(dataset.feature_dim(), 2);
        assert_eq!(dataset.feature_names(), &["speed", "altitude"]);
        assert_eq!(dataset.dropped_columns(), &["timestamp", "mode", "armed"]);
        assert!(dataset.features().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_scaled_extrema_and_labels() {
        let file = write_csv(TRAIN);
        let dataset = UavDataset::from_csv(file.path()).unwrap();

        let speed = dataset.features().column(0).to_vec();
        assert_eq!(speed, vec![0.0, 0.5, 1.0, 0.75]);
        let altitude = dataset.features().column(1).to_vec();
        assert_eq!(altitude, vec![0.0, 0.5, 0.25, 1.0]);

        assert_eq!(dataset.num_classes(), 3);
        assert_eq!(dataset.label_encoder().classes(), &["benign", "jamming", "spoofing"]);
        assert_eq!(dataset.labels().to_vec(), vec![0, 2, 1, 0]);
    }

    #[test]
    fn test_get_and_iter() {
        let file = write_csv(TRAIN);
        let dataset = UavDataset::from_csv(file.path()).unwrap();

        let sample = dataset.get(2).unwrap();
        assert_eq!(sample.label, 1);
        assert_eq!(sample.features.to_vec(), vec![1.0, 0.25]);
        assert_eq!(sample.to_data_point().features, vec![1.0, 0.25]);

        assert!(matches!(dataset.get(4), Err(PrepError::Index { index: 4, len: 4 })));
        assert_eq!(dataset.iter().count(), dataset.len());
        let labels: Vec<i64> = dataset.iter().map(|s| s.label).collect();
        assert_eq!(labels, dataset.labels().to_vec());
    }

    #[test]
    fn test_owned_export_matches_views() {
        let file = write_csv(TRAIN);
        let dataset = UavDataset::from_csv(file.path()).unwrap();
        let points = dataset.to_data_points();
        assert_eq!(points.len(), dataset.len());
        assert_eq!(points[3], DataPoint::new(vec![0.75, 1.0], 0));
        for (point, sample) in points.iter().zip(dataset.iter()) {
            assert_eq!(point.features, sample.features.to_vec());
            assert_eq!(point.label, sample.label);
        }
    }

    #[test]
    fn test_fitted_state_is_reused() {
        let train_file = write_csv(TRAIN);
        let train = UavDataset::from_csv(train_file.path()).unwrap();

        // columns in a different order, an extra column, values outside the train range
        let test_file = write_csv("altitude,speed,extra,class\n100,40,1,spoofing\n500,0,2,benign\n");
        let test = UavDataset::from_csv_fitted(test_file.path(), train.preprocessor()).unwrap();

        assert_eq!(test.feature_names(), train.feature_names());
        assert_eq!(test.dropped_columns(), &["extra"]);
        assert_eq!(test.label_encoder(), train.label_encoder());
        assert_eq!(test.labels().to_vec(), vec![2, 0]);
        assert_eq!(test.get(0).unwrap().features.to_vec(), vec![2.0, 0.0]);
        assert_eq!(test.get(1).unwrap().features.to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_fitted_state_rejects_unknown_label() {
        let train_file = write_csv(TRAIN);
        let train = UavDataset::from_csv(train_file.path()).unwrap();
        let test_file = write_csv("speed,altitude,class\n1,100,hijack\n");
        let err = UavDataset::from_csv_fitted(test_file.path(), train.preprocessor()).unwrap_err();
        assert!(matches!(err, PrepError::UnknownLabel(ref l) if l == "hijack"));
    }

    #[test]
    fn test_fitted_state_rejects_missing_column() {
        let train_file = write_csv(TRAIN);
        let train = UavDataset::from_csv(train_file.path()).unwrap();
        let test_file = write_csv("speed,class\n1,benign\n");
        let err = UavDataset::from_csv_fitted(test_file.path(), train.preprocessor()).unwrap_err();
        assert!(matches!(err, PrepError::Schema(_)));
    }

    #[test]
    fn test_empty_after_cleaning() {
        let file = write_csv("a,b,class\n1,,x\nnan,2,y\n");
        assert!(matches!(UavDataset::from_csv(file.path()), Err(PrepError::EmptyDataset(_))));
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let file = write_csv("speed,altitude,class\n");
        assert!(matches!(UavDataset::from_csv(file.path()), Err(PrepError::EmptyDataset(_))));
    }

    #[test]
    fn test_fitted_value_beyond_f32_range() {
        let train_file = write_csv("a,class\n0,x\n1,y\n");
        let train = UavDataset::from_csv(train_file.path()).unwrap();
        let test_file = write_csv("a,class\n1e300,x\n");
        let err = UavDataset::from_csv_fitted(test_file.path(), train.preprocessor()).unwrap_err();
        assert!(matches!(err, PrepError::Format(_)));
    }

    #[test]
    fn test_no_numeric_features() {
        let file = write_csv("mode,armed,class\nauto,true,x\nmanual,false,y\n");
        assert!(matches!(UavDataset::from_csv(file.path()), Err(PrepError::NoFeatures(_))));
    }

    #[test]
    fn test_custom_feature_range() {
        let file = write_csv("a,class\n0,x\n10,y\n");
        let dataset = UavDataset::fit_csv(file.path(), (-1.0, 1.0)).unwrap();
        assert_eq!(dataset.features().column(0).to_vec(), vec![-1.0, 1.0]);
    }

    #[test]
    fn test_gather_stacks_rows() {
        let file = write_csv(TRAIN);
        let dataset = UavDataset::from_csv(file.path()).unwrap();
        let batch = dataset.gather(&[3, 0]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.features.shape(), &[2, 2]);
        assert_eq!(batch.labels.to_vec(), vec![0, 0]);
        assert_eq!(batch.features.row(0).to_vec(), vec![0.75, 1.0]);
        assert_eq!(batch.indices, vec![3, 0]);
    }
}
