//! Stability filter and minimum distance to learned attractors

use super::{column, integer_column};
use crate::schema::{DISTANCES_TO_LEARNED, MINIMUM_DISTANCE_TO_LEARNED, STABLE};
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Int64Array, RecordBatch};
use arrow::compute;
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Restriction on `MinimumDistanceToLearned` applied before grouping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceFilter {
    /// Keep every stable state
    #[default]
    All,
    /// Keep states that did not land on a learned attractor
    NonZero,
    /// Keep states that landed exactly on a learned attractor
    Zero,
}

impl std::str::FromStr for DistanceFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "non-zero" => Ok(Self::NonZero),
            "zero" => Ok(Self::Zero),
            other => Err(Error::Config(format!(
                "Unknown distance filter: {other} (expected all, non-zero or zero)"
            ))),
        }
    }
}

/// Select stable rows and attach `MinimumDistanceToLearned`
///
/// A null `Stable` counts as not stable. Distances may be stored as floats or
/// integers; the minimum is truncated towards zero.
///
/// # Errors
/// - [`Error::EmptySequence`] if a stable row's distance list is null, empty,
///   all-null, or has no finite minimum
/// - [`Error::Config`] if `Stable` is not boolean or `DistancesToLearned` is
///   not a list of numbers
pub fn stability_filter(batch: &RecordBatch) -> Result<RecordBatch> {
    let stable = column(batch, STABLE)?;
    let stable = stable.as_boolean_opt().ok_or_else(|| {
        Error::Config(format!(
            "Column {STABLE} must be boolean, found {:?}",
            stable.data_type()
        ))
    })?;
    let distances = column(batch, DISTANCES_TO_LEARNED)?;

    let mut minimums = Vec::with_capacity(stable.true_count());
    for row in 0..batch.num_rows() {
        if stable.is_valid(row) && stable.value(row) {
            minimums.push(minimum_distance(distances, row)?);
        }
    }

    // Null predicate slots are dropped by the filter kernel
    let filtered = compute::filter_record_batch(batch, stable)?;

    let schema = filtered.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    fields.push(Field::new(MINIMUM_DISTANCE_TO_LEARNED, DataType::Int64, false));
    let mut columns = filtered.columns().to_vec();
    columns.push(Arc::new(Int64Array::from(minimums)));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

#[allow(clippy::cast_possible_truncation)]
fn minimum_distance(distances: &ArrayRef, row: usize) -> Result<i64> {
    if distances.is_null(row) {
        return Err(Error::EmptySequence { row });
    }
    let values = match distances.data_type() {
        DataType::List(_) => distances.as_list::<i32>().value(row),
        DataType::LargeList(_) => distances.as_list::<i64>().value(row),
        DataType::FixedSizeList(_, _) => distances.as_fixed_size_list().value(row),
        other => {
            return Err(Error::Config(format!(
                "Column {DISTANCES_TO_LEARNED} must be a list, found {other:?}"
            )))
        }
    };
    if !values.data_type().is_numeric() {
        return Err(Error::Config(format!(
            "Column {DISTANCES_TO_LEARNED} must hold numbers, found {:?}",
            values.data_type()
        )));
    }
    let values = compute::cast(&values, &DataType::Float64)?;
    match compute::min(values.as_primitive::<Float64Type>()) {
        Some(min) if min.is_finite() => Ok(min.trunc() as i64),
        _ => Err(Error::EmptySequence { row }),
    }
}

/// Keep rows whose `MinimumDistanceToLearned` passes `filter`
///
/// # Errors
/// Returns [`Error::Config`] if the batch has not been through
/// [`stability_filter`]
pub fn filter_by_distance(batch: &RecordBatch, filter: DistanceFilter) -> Result<RecordBatch> {
    let distances = integer_column(batch, MINIMUM_DISTANCE_TO_LEARNED)?;
    let keep: fn(i64) -> bool = match filter {
        DistanceFilter::All => return Ok(batch.clone()),
        DistanceFilter::NonZero => |d| d > 0,
        DistanceFilter::Zero => |d| d == 0,
    };
    let mask: BooleanArray = distances.iter().map(|d| Some(d.is_some_and(keep))).collect();
    Ok(compute::filter_record_batch(batch, &mask)?)
}
