//! Frequency tables over discrete columns

use super::column;
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Int64Array, RecordBatch};
use arrow::compute;
use arrow::datatypes::{DataType, Int64Type};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A distinct value of a discrete column
///
/// Ordering is by value; `false` sorts before `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum FrequencyKey {
    /// Boolean column value
    Bool(bool),
    /// Integer column value (widened to `i64`)
    Int(i64),
}

impl fmt::Display for FrequencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
        }
    }
}

/// Occurrence count of each distinct value in one column
///
/// Nulls are not counted. Keys iterate in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    column: String,
    counts: BTreeMap<FrequencyKey, u64>,
}

impl FrequencyTable {
    /// Create an empty table for `column`
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            counts: BTreeMap::new(),
        }
    }

    /// Count the distinct values of a boolean or integer column
    ///
    /// A zero-row batch yields an empty table.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the column is missing or not discrete
    pub fn from_column(batch: &RecordBatch, name: &str) -> Result<Self> {
        let array = column(batch, name)?;
        let mut table = Self::new(name);
        match array.data_type() {
            DataType::Boolean => table.count_booleans(array.as_boolean()),
            _ => table.count_integers(&integer_values(array, name)?),
        }
        Ok(table)
    }

    fn count_booleans(&mut self, array: &BooleanArray) {
        for value in array.iter().flatten() {
            *self.counts.entry(FrequencyKey::Bool(value)).or_insert(0) += 1;
        }
    }

    fn count_integers(&mut self, array: &Int64Array) {
        for value in array.iter().flatten() {
            *self.counts.entry(FrequencyKey::Int(value)).or_insert(0) += 1;
        }
    }

    /// Name of the counted column
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Count for one value (zero if never observed)
    #[must_use]
    pub fn get(&self, key: FrequencyKey) -> u64 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Number of distinct values
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when no value was counted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// `(value, count)` pairs in ascending value order
    pub fn iter(&self) -> impl Iterator<Item = (FrequencyKey, u64)> + '_ {
        self.counts.iter().map(|(key, count)| (*key, *count))
    }

    /// `(value, log10(count))` pairs in ascending value order
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn log10_counts(&self) -> Vec<(FrequencyKey, f64)> {
        self.iter()
            .map(|(key, count)| (key, (count as f64).log10()))
            .collect()
    }
}

fn integer_values(array: &ArrayRef, name: &str) -> Result<Int64Array> {
    match array.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let widened = compute::cast(array, &DataType::Int64)?;
            Ok(widened.as_primitive::<Int64Type>().clone())
        }
        other => Err(Error::Config(format!(
            "Frequency table needs a boolean or integer column; {name} is {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int32Array};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn single(name: &str, array: ArrayRef) -> RecordBatch {
        let schema = Schema::new(vec![Field::new(name, array.data_type().clone(), true)]);
        RecordBatch::try_new(Arc::new(schema), vec![array]).unwrap()
    }

    #[test]
    fn test_counts_integers_in_key_order() {
        let batch = single("NumSteps", Arc::new(Int32Array::from(vec![7, 3, 7, 12, 3, 7])));
        let table = FrequencyTable::from_column(&batch, "NumSteps").unwrap();

        let pairs: Vec<_> = table.iter().collect();
        assert_eq!(
            pairs,
            vec![
                (FrequencyKey::Int(3), 2),
                (FrequencyKey::Int(7), 3),
                (FrequencyKey::Int(12), 1),
            ]
        );
        assert_eq!(table.total(), 6);
        assert_eq!(table.get(FrequencyKey::Int(99)), 0);
    }

    #[test]
    fn test_counts_booleans() {
        let batch = single(
            "Stable",
            Arc::new(BooleanArray::from(vec![true, false, true, true])),
        );
        let table = FrequencyTable::from_column(&batch, "Stable").unwrap();
        assert_eq!(table.get(FrequencyKey::Bool(true)), 3);
        assert_eq!(table.get(FrequencyKey::Bool(false)), 1);
    }

    #[test]
    fn test_empty_input_gives_empty_table() {
        let batch = single("NumSteps", Arc::new(Int32Array::from(Vec::<i32>::new())));
        let table = FrequencyTable::from_column(&batch, "NumSteps").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
    }

    #[test]
    fn test_nulls_are_skipped() {
        let batch = single("NumSteps", Arc::new(Int32Array::from(vec![Some(1), None, Some(1)])));
        let table = FrequencyTable::from_column(&batch, "NumSteps").unwrap();
        assert_eq!(table.total(), 2);
    }

    #[test]
    fn test_float_column_rejected() {
        let batch = single("StabilityRatio", Arc::new(Float64Array::from(vec![0.5])));
        let err = FrequencyTable::from_column(&batch, "StabilityRatio").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_log10_counts() {
        let values: Vec<i32> = std::iter::repeat(1).take(100).chain([2]).collect();
        let batch = single("NumSteps", Arc::new(Int32Array::from(values)));
        let table = FrequencyTable::from_column(&batch, "NumSteps").unwrap();

        let logs = table.log10_counts();
        assert!((logs[0].1 - 2.0).abs() < 1e-12);
        assert!(logs[1].1.abs() < 1e-12);
    }
}
