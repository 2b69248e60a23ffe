pub mod label_encoder;
pub mod min_max;

pub use label_encoder::LabelEncoder;
pub use min_max::MinMaxScaler;

/// Everything fitted on a training fold that another fold must reuse:
/// the numeric feature columns (by name, in order), the label vocabulary and the scaler.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedPreprocessor {
    pub feature_names: Vec<String>,
    pub label_encoder: LabelEncoder,
    pub scaler: MinMaxScaler<f64>,
}

impl FittedPreprocessor {
    pub fn feature_dim(&self) -> usize {
        self.feature_names.len()
    }

    pub fn num_classes(&self) -> usize {
        self.label_encoder.num_classes()
    }
}
