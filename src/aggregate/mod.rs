//! Aggregation over joined relaxation results
//!
//! Four pure operations, each taking a table and returning a derived one:
//!
//! - [`stability_filter`]: stable rows with their minimum distance to a
//!   learned attractor
//! - [`FrequencyTable::from_column`]: counts of each distinct value
//! - [`derive_stability_ratio`]: per-trial fraction of stable states
//! - [`grouped_statistics`]: mean, std, count and 95% CI half-width per group
//!
//! Column lookups and type checks fail with [`Error::Config`]: a bad column
//! request is a configuration mistake, not a data problem.

pub mod frequency;
pub mod grouped;
pub mod ratio;
pub mod stability;

pub use frequency::{FrequencyKey, FrequencyTable};
pub use grouped::{grouped_statistics, GroupedStatistic, Z_95};
pub use ratio::{derive_stability_ratio, DEFAULT_TRIAL_SIZE};
pub use stability::{filter_by_distance, stability_filter, DistanceFilter};

use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, RecordBatch};
use arrow::compute;
use arrow::datatypes::{DataType, Float64Type, Int64Type};

/// Look up a column by name
pub(crate) fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| Error::Config(format!("Column not found: {name}")))
}

fn is_discrete(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Read a boolean or integer column widened to `Int64`
pub(crate) fn integer_column(batch: &RecordBatch, name: &str) -> Result<Int64Array> {
    let array = column(batch, name)?;
    if !is_discrete(array.data_type()) {
        return Err(Error::Config(format!(
            "Column {name} must be boolean or integer, found {:?}",
            array.data_type()
        )));
    }
    let widened = compute::cast(array, &DataType::Int64)?;
    Ok(widened.as_primitive::<Int64Type>().clone())
}

/// Read a numeric column widened to `Float64`
pub(crate) fn float_column(batch: &RecordBatch, name: &str) -> Result<Float64Array> {
    let array = column(batch, name)?;
    let numeric = (is_discrete(array.data_type()) && *array.data_type() != DataType::Boolean)
        || matches!(
            array.data_type(),
            DataType::Float16 | DataType::Float32 | DataType::Float64
        );
    if !numeric {
        return Err(Error::Config(format!(
            "Column {name} must be numeric, found {:?}",
            array.data_type()
        )));
    }
    let widened = compute::cast(array, &DataType::Float64)?;
    Ok(widened.as_primitive::<Float64Type>().clone())
}
