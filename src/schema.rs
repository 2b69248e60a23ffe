//! Raw CSV loading and the explicit column-typing pass.
//!
//! The table is read once into memory as text. [`Schema::infer`] then classifies
//! every feature column up front, so later stages work against a typed column
//! list instead of inspecting values on the fly.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{PrepError, Result};

/// Cell contents treated as a missing value (after trimming).
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A", "#NA",
];

/// Returns true when a cell is a missing-value marker.
/// Infinite values count as missing, so they are dropped together with NA cells.
pub fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    if NA_TOKENS.contains(&cell) {
        return true;
    }
    match cell.parse::<f64>() {
        Ok(v) => !v.is_finite(),
        Err(_) => false,
    }
}

/// Parses a cell as a finite real number.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_boolean(cell: &str) -> bool {
    let cell = cell.trim();
    cell.eq_ignore_ascii_case("true") || cell.eq_ignore_ascii_case("false")
}

/// A CSV file held as text: header plus rows of equal width.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Reads a comma-separated file with a header row.
    ///
    /// Fails with `Io` if the file cannot be opened and `Format` when the header is
    /// missing, has fewer than two columns, repeats a name, or rows are ragged.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PrepError::Io { path: path.to_path_buf(), source })?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| PrepError::from_csv(path, e))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.len() < 2 {
            return Err(PrepError::Format(format!(
                "{} needs at least one feature column and a label column, found {} column(s)",
                path.display(),
                headers.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = headers.iter().find(|h| !seen.insert(h.as_str())) {
            return Err(PrepError::Format(format!("duplicate column name {:?} in {}", dup, path.display())));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| PrepError::from_csv(path, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!("read {} rows x {} columns from {}", rows.len(), headers.len(), path.display());
        Ok(RawTable { path: path.to_path_buf(), headers, rows })
    }

    /// Drops every row holding a missing-value marker in any column.
    /// Returns how many rows were removed.
    pub fn drop_missing(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().any(|cell| is_missing(cell)));
        before - self.rows.len()
    }

    pub fn label_index(&self) -> usize {
        self.headers.len() - 1
    }

    /// Iterates over the label column.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        let idx = self.label_index();
        self.rows.iter().map(move |row| row[idx].as_str())
    }
}

/// The inferred storage type of a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Text,
}

impl ColumnKind {
    /// Classifies a column from its non-missing cells.
    /// A column with no usable cells is numeric (it holds only missing values).
    pub fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut all_numeric = true;
        let mut all_boolean = true;
        let mut any = false;
        for cell in cells.filter(|c| !is_missing(c)) {
            any = true;
            all_numeric &= parse_numeric(cell).is_some();
            all_boolean &= is_boolean(cell);
            if !all_numeric && !all_boolean {
                return ColumnKind::Text;
            }
        }
        if !any || all_numeric {
            ColumnKind::Numeric
        } else if all_boolean {
            ColumnKind::Boolean
        } else {
            ColumnKind::Text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub index: usize,
    pub kind: ColumnKind,
}

/// Typed column list of a table: feature columns in file order plus the label column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub features: Vec<ColumnSpec>,
    pub label: String,
}

impl Schema {
    /// Classifies every feature column of `table`. The last column is the label.
    pub fn infer(table: &RawTable) -> Self {
        let label_idx = table.label_index();
        let features = table.headers[..label_idx]
            .iter()
            .enumerate()
            .map(|(index, name)| ColumnSpec {
                name: name.clone(),
                index,
                kind: ColumnKind::infer(table.rows.iter().map(|row| row[index].as_str())),
            })
            .collect();
        Schema { features, label: table.headers[label_idx].clone() }
    }

    pub fn numeric_features(&self) -> impl Iterator<Item = &ColumnSpec> + '_ {
        self.features.iter().filter(|c| c.kind == ColumnKind::Numeric)
    }

    /// Names of feature columns that are not numeric and get dropped.
    pub fn non_numeric_names(&self) -> Vec<String> {
        self.features
            .iter()
            .filter(|c| c.kind != ColumnKind::Numeric)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Resolves `names` to column positions, requiring each to exist as a numeric feature.
    pub fn require_numeric(&self, names: &[String]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| match self.features.iter().find(|c| &c.name == name) {
                Some(col) if col.kind == ColumnKind::Numeric => Ok(col.index),
                Some(col) => Err(PrepError::Schema(format!(
                    "column {:?} was numeric at fit time but is {:?} here",
                    name, col.kind
                ))),
                None => Err(PrepError::Schema(format!("fitted feature column {:?} is missing", name))),
            })
            .collect()
    }
}
