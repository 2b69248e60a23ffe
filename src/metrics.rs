//! Classification metrics: accuracy, precision, recall and F1.
//!
//! Per-class scores come from a [`ConfusionMatrix`] over the sorted union of labels
//! seen in either sequence. Any score whose denominator is zero is 0.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::{PrepError, Result};

/// How per-class precision, recall and F1 are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Average {
    /// Unweighted mean over classes.
    #[default]
    Macro,
    /// Scores from counts pooled over all classes.
    Micro,
    /// Mean weighted by each class's true support.
    Weighted,
}

impl FromStr for Average {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "macro" => Ok(Average::Macro),
            "micro" => Ok(Average::Micro),
            "weighted" => Ok(Average::Weighted),
            other => Err(PrepError::Config(format!(
                "unknown averaging mode {:?}, expected one of macro, micro, weighted",
                other
            ))),
        }
    }
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Average::Macro => "macro",
            Average::Micro => "micro",
            Average::Weighted => "weighted",
        };
        f.write_str(name)
    }
}

/// The four summary scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Counts of true (rows) against predicted (columns) labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix<L> {
    classes: Vec<L>,
    counts: Vec<Vec<usize>>,
}

impl<L> ConfusionMatrix<L>
where
    L: Clone + Ord + Hash,
{
    /// Builds the matrix. Fails if the sequences differ in length.
    pub fn new(y_true: &[L], y_pred: &[L]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(PrepError::LengthMismatch { y_true: y_true.len(), y_pred: y_pred.len() });
        }
        let classes: Vec<L> = y_true.iter().chain(y_pred).cloned().collect::<BTreeSet<_>>().into_iter().collect();
        let position: HashMap<&L, usize> = classes.iter().enumerate().map(|(i, c)| (c, i)).collect();

        let mut counts = vec![vec![0usize; classes.len()]; classes.len()];
        for (t, p) in y_true.iter().zip(y_pred) {
            counts[position[t]][position[p]] += 1;
        }
        Ok(ConfusionMatrix { classes, counts })
    }

    /// Class labels in sorted order; row/column `i` refers to `classes()[i]`.
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.counts[class][class]
    }

    /// Samples predicted as `class`.
    pub fn predicted(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }

    /// Samples whose true label is `class`.
    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    pub fn false_positives(&self, class: usize) -> usize {
        self.predicted(class) - self.true_positives(class)
    }

    pub fn false_negatives(&self, class: usize) -> usize {
        self.support(class) - self.true_positives(class)
    }

    pub fn accuracy(&self) -> f64 {
        let correct = (0..self.classes.len()).map(|c| self.true_positives(c)).sum();
        ratio(correct, self.total())
    }

    pub fn precision(&self, class: usize) -> f64 {
        ratio(self.true_positives(class), self.predicted(class))
    }

    pub fn recall(&self, class: usize) -> f64 {
        ratio(self.true_positives(class), self.support(class))
    }

    /// `2tp / (2tp + fp + fn)`, the harmonic mean of precision and recall.
    pub fn f1(&self, class: usize) -> f64 {
        let tp = self.true_positives(class);
        ratio(2 * tp, 2 * tp + self.false_positives(class) + self.false_negatives(class))
    }

    /// Aggregates the per-class scores.
    pub fn summarize(&self, average: Average) -> ClassificationMetrics {
        let n = self.classes.len();
        let accuracy = self.accuracy();
        let (precision, recall, f1) = match average {
            Average::Micro => {
                let tp: usize = (0..n).map(|c| self.true_positives(c)).sum();
                let fp: usize = (0..n).map(|c| self.false_positives(c)).sum();
                let fn_: usize = (0..n).map(|c| self.false_negatives(c)).sum();
                (ratio(tp, tp + fp), ratio(tp, tp + fn_), ratio(2 * tp, 2 * tp + fp + fn_))
            }
            Average::Macro => {
                if n == 0 {
                    (0.0, 0.0, 0.0)
                } else {
                    let mean = |score: &dyn Fn(usize) -> f64| (0..n).map(score).sum::<f64>() / n as f64;
                    (mean(&|c| self.precision(c)), mean(&|c| self.recall(c)), mean(&|c| self.f1(c)))
                }
            }
            Average::Weighted => {
                let total = self.total();
                if total == 0 {
                    (0.0, 0.0, 0.0)
                } else {
                    let weighted = |score: &dyn Fn(usize) -> f64| {
                        (0..n).map(|c| score(c) * self.support(c) as f64).sum::<f64>() / total as f64
                    };
                    (
                        weighted(&|c| self.precision(c)),
                        weighted(&|c| self.recall(c)),
                        weighted(&|c| self.f1(c)),
                    )
                }
            }
        };
        ClassificationMetrics { accuracy, precision, recall, f1 }
    }
}

/// Computes accuracy, precision, recall and F1 of `y_pred` against `y_true`.
///
/// Empty inputs score 0 everywhere.
pub fn compute_metrics<L>(y_true: &[L], y_pred: &[L], average: Average) -> Result<ClassificationMetrics>
where
    L: Clone + Ord + Hash,
{
    Ok(ConfusionMatrix::new(y_true, y_pred)?.summarize(average))
}

/// Like [`compute_metrics`] with the averaging mode given by name
/// (`"macro"`, `"micro"` or `"weighted"`).
pub fn compute_metrics_str<L>(y_true: &[L], y_pred: &[L], average: &str) -> Result<ClassificationMetrics>
where
    L: Clone + Ord + Hash,
{
    let average = average.parse::<Average>()?;
    compute_metrics(y_true, y_pred, average)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64, what: &str) {
        assert!((actual - expected).abs() < EPSILON, "{}: expected {}, got {}", what, expected, actual);
    }

    fn assert_in_unit_range(m: &ClassificationMetrics) {
        for v in [m.accuracy, m.precision, m.recall, m.f1] {
            assert!((0.0..=1.0).contains(&v), "metric {} outside [0, 1]", v);
        }
    }

    #[test]
    fn test_binary_macro() {
        let m = compute_metrics(&[1, 0, 1, 1], &[1, 0, 0, 1], Average::Macro).unwrap();
        assert_close(m.accuracy, 0.75, "accuracy");
        // class 0: p = 1/2, r = 1, f1 = 2/3; class 1: p = 1, r = 2/3, f1 = 4/5
        assert_close(m.precision, 0.75, "precision");
        assert_close(m.recall, (1.0 + 2.0 / 3.0) / 2.0, "recall");
        assert_close(m.f1, (2.0 / 3.0 + 0.8) / 2.0, "f1");
        assert_in_unit_range(&m);
    }

    #[test]
    fn test_micro_equals_accuracy_for_single_label() {
        let y_true = ["dos", "benign", "spoof", "benign", "dos"];
        let y_pred = ["dos", "dos", "spoof", "benign", "benign"];
        let m = compute_metrics(&y_true, &y_pred, Average::Micro).unwrap();
        assert_close(m.accuracy, 0.6, "accuracy");
        assert_close(m.precision, 0.6, "precision");
        assert_close(m.recall, 0.6, "recall");
        assert_close(m.f1, 0.6, "f1");
    }

    #[test]
    fn test_weighted() {
        // supports: 0 -> 1, 1 -> 3
        let m = compute_metrics(&[1, 0, 1, 1], &[1, 0, 0, 1], Average::Weighted).unwrap();
        assert_close(m.precision, (0.5 * 1.0 + 1.0 * 3.0) / 4.0, "precision");
        assert_close(m.recall, (1.0 * 1.0 + (2.0 / 3.0) * 3.0) / 4.0, "recall");
        assert_close(m.f1, ((2.0 / 3.0) * 1.0 + 0.8 * 3.0) / 4.0, "f1");
    }

    #[test]
    fn test_zero_division_scores_zero() {
        // class 2 is predicted but never true, class 0 is true but never predicted
        let m = compute_metrics(&[0, 1], &[2, 1], Average::Macro).unwrap();
        let cm = ConfusionMatrix::new(&[0, 1], &[2, 1]).unwrap();
        assert_eq!(cm.classes(), &[0, 1, 2]);
        assert_close(cm.precision(0), 0.0, "precision of never-predicted class");
        assert_close(cm.recall(2), 0.0, "recall of absent class");
        assert_close(m.precision, 1.0 / 3.0, "precision");
        assert_close(m.recall, 1.0 / 3.0, "recall");
        assert_in_unit_range(&m);
    }

    #[test]
    fn test_perfect_and_empty() {
        let perfect = compute_metrics(&["a", "b"], &["a", "b"], Average::Macro).unwrap();
        assert_eq!(perfect, ClassificationMetrics { accuracy: 1.0, precision: 1.0, recall: 1.0, f1: 1.0 });

        let empty: [i64; 0] = [];
        for average in [Average::Macro, Average::Micro, Average::Weighted] {
            assert_eq!(compute_metrics(&empty, &empty, average).unwrap(), ClassificationMetrics::default());
        }
    }

    #[test]
    fn test_owned_string_labels() {
        let y_true: Vec<String> = ["benign", "dos", "dos"].iter().map(|s| s.to_string()).collect();
        let y_pred: Vec<String> = ["benign", "dos", "benign"].iter().map(|s| s.to_string()).collect();
        let m = compute_metrics_str(&y_true, &y_pred, "macro").unwrap();
        assert_close(m.accuracy, 2.0 / 3.0, "accuracy");
        // benign: p = 1/2, r = 1; dos: p = 1, r = 1/2
        assert_close(m.precision, 0.75, "precision");
        assert_close(m.recall, 0.75, "recall");
    }

    #[test]
    fn test_length_mismatch() {
        let err = compute_metrics(&[1, 0], &[1, 0, 1], Average::Macro).unwrap_err();
        assert!(matches!(err, PrepError::LengthMismatch { y_true: 2, y_pred: 3 }));
    }

    #[test]
    fn test_averaging_mode_parsing() {
        assert_eq!("macro".parse::<Average>().unwrap(), Average::Macro);
        assert_eq!(" Weighted ".parse::<Average>().unwrap(), Average::Weighted);
        assert_eq!(Average::Micro.to_string(), "micro");
        let err = compute_metrics_str(&[1, 0], &[1, 0], "bogus-mode").unwrap_err();
        assert!(matches!(err, PrepError::Config(_)));
    }

    #[test]
    fn test_confusion_counts() {
        let cm = ConfusionMatrix::new(&[0, 0, 1, 2, 2, 2], &[0, 1, 1, 2, 0, 2]).unwrap();
        assert_eq!(cm.counts(), &[vec![1usize, 1, 0], vec![0, 1, 0], vec![1, 0, 2]]);
        assert_eq!(cm.total(), 6);
        assert_eq!(cm.support(2), 3);
        assert_eq!(cm.predicted(0), 2);
        assert_eq!(cm.false_positives(1), 1);
        assert_eq!(cm.false_negatives(2), 1);
    }
}
