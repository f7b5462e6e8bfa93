//! Per-trial stability ratio

use super::float_column;
use crate::schema::{NUMBER_STABLE_STATES, STABILITY_RATIO};
use crate::{Error, Result};
use arrow::array::RecordBatch;
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use std::sync::Arc;

/// States sampled per trial by the simulation
pub const DEFAULT_TRIAL_SIZE: i64 = 1000;

/// Append `StabilityRatio = NumberStableStates / trial_size` to a trial table
///
/// # Errors
/// Returns [`Error::Config`] if `trial_size <= 0` or `NumberStableStates` is
/// missing or not numeric
#[allow(clippy::cast_precision_loss)]
pub fn derive_stability_ratio(trials: &RecordBatch, trial_size: i64) -> Result<RecordBatch> {
    if trial_size <= 0 {
        return Err(Error::Config(format!(
            "Trial size must be positive, got {trial_size}"
        )));
    }
    let divisor = trial_size as f64;
    let stable = float_column(trials, NUMBER_STABLE_STATES)?;
    let ratio = stable.unary::<_, Float64Type>(|count| count / divisor);

    let schema = trials.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    fields.push(Field::new(STABILITY_RATIO, DataType::Float64, true));
    let mut columns = trials.columns().to_vec();
    columns.push(Arc::new(ratio));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
