//! Label vocabulary: maps label text to integer codes `0..K-1`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use ndarray::Array1;
use ordered_float::OrderedFloat;

use crate::error::{PrepError, Result};
use crate::schema::parse_numeric;

/// Encodes categorical labels as integers in sorted order of the label value.
///
/// When every label parses as a real number the vocabulary is keyed by value:
/// it sorts numerically (so `"2" < "10"`) and spellings of the same number
/// (`"1"`, `"1.0"`) share one class, named by the lexicographically first spelling.
/// Otherwise classes are the distinct label texts in lexicographic order. The
/// vocabulary is fixed once fitted; encoding an unseen label is an error.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, usize>,
    value_codes: Option<HashMap<OrderedFloat<f64>, usize>>,
}

impl LabelEncoder {
    /// Builds the vocabulary from the unique values in `labels`.
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let unique: BTreeSet<&str> = labels.into_iter().collect();
        let numeric: Option<Vec<f64>> = unique.iter().map(|c| parse_numeric(c)).collect();

        let (classes, value_codes): (Vec<String>, _) = match numeric {
            Some(values) => {
                let mut by_value: BTreeMap<OrderedFloat<f64>, &str> = BTreeMap::new();
                for (value, text) in values.into_iter().zip(unique.iter().copied()) {
                    by_value.entry(OrderedFloat(value)).or_insert(text);
                }
                let value_codes: HashMap<OrderedFloat<f64>, usize> =
                    by_value.keys().enumerate().map(|(i, &v)| (v, i)).collect();
                (by_value.into_values().map(str::to_string).collect(), Some(value_codes))
            }
            None => (unique.into_iter().map(str::to_string).collect(), None),
        };

        let codes = classes.iter().enumerate().map(|(i, c)| (c.clone(), i)).collect();
        LabelEncoder { classes, codes, value_codes }
    }

    /// The vocabulary, indexed by code.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn transform_one(&self, label: &str) -> Result<i64> {
        let by_value = || {
            let values = self.value_codes.as_ref()?;
            values.get(&OrderedFloat(parse_numeric(label)?))
        };
        self.codes
            .get(label)
            .or_else(by_value)
            .map(|&code| code as i64)
            .ok_or_else(|| PrepError::UnknownLabel(label.to_string()))
    }

    pub fn transform<'a>(&self, labels: impl IntoIterator<Item = &'a str>) -> Result<Array1<i64>> {
        let codes = labels.into_iter().map(|l| self.transform_one(l)).collect::<Result<Vec<_>>>()?;
        Ok(Array1::from(codes))
    }

    pub fn inverse_transform_one(&self, code: i64) -> Result<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(String::as_str)
            .ok_or_else(|| PrepError::UnknownLabel(code.to_string()))
    }

    /// Decodes predicted codes back to the original label text.
    pub fn inverse_transform(&self, codes: &[i64]) -> Result<Vec<String>> {
        codes.iter().map(|&c| self.inverse_transform_one(c).map(str::to_string)).collect()
    }
}
