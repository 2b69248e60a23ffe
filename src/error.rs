//! Error taxonomy shared by the dataset, loader and metrics modules.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PrepError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table: {0}")]
    Format(String),

    #[error("index {index} out of range for dataset of length {len}")]
    Index { index: usize, len: usize },

    #[error("label sequences differ in length: {y_true} true vs {y_pred} predicted")]
    LengthMismatch { y_true: usize, y_pred: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("schema mismatch: {0}")]
    Schema(String),

    #[error("label {0:?} is not in the fitted vocabulary")]
    UnknownLabel(String),

    #[error("no rows left after dropping missing values in {0}")]
    EmptyDataset(PathBuf),

    #[error("no numeric feature columns in {0}")]
    NoFeatures(PathBuf),
}

pub type Result<T> = std::result::Result<T, PrepError>;

impl PrepError {
    /// Maps a csv reader error onto the taxonomy. I/O failures stay `Io`,
    /// everything else (ragged rows, bad UTF-8) is a format problem.
    pub(crate) fn from_csv(path: &std::path::Path, err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(source) => PrepError::Io { path: path.to_path_buf(), source },
                other => PrepError::Format(format!("{:?}", other)),
            }
        } else {
            PrepError::Format(err.to_string())
        }
    }
}
