//! Many-to-one left join of state rows onto trial rows
//!
//! Every state row is kept and widened with the fields of the single trial
//! row sharing its key. Trial rows without states are dropped.

use crate::aggregate::integer_column;
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, RecordBatch, UInt32Array};
use arrow::compute;
use arrow::datatypes::{Field, Schema};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

/// Attach trial fields to each state row via `key`
///
/// The output holds the state columns in their original order followed by
/// every trial column except the key.
///
/// # Errors
/// Returns [`Error::Join`] if:
/// - `key` is missing from either side
/// - two trial rows share a key
/// - a state row's key is null or matches no trial row
/// - a non-key trial column name collides with a state column
pub fn left_join_on(states: &RecordBatch, trials: &RecordBatch, key: &str) -> Result<RecordBatch> {
    let state_keys = join_keys(states, key, "state")?;
    let trial_keys = join_keys(trials, key, "trial")?;

    let mut index: FxHashMap<i64, u32> = FxHashMap::default();
    index.reserve(trial_keys.len());
    for row in 0..trial_keys.len() {
        if trial_keys.is_null(row) {
            continue;
        }
        let value = trial_keys.value(row);
        let position = u32::try_from(row)
            .map_err(|_| Error::Join(format!("Trial table too large to index ({row} rows)")))?;
        if index.insert(value, position).is_some() {
            return Err(Error::Join(format!(
                "Ambiguous join: {key} = {value} appears in more than one trial row"
            )));
        }
    }

    let mut take_indices = Vec::with_capacity(state_keys.len());
    for row in 0..state_keys.len() {
        if state_keys.is_null(row) {
            return Err(Error::Join(format!("State row {row} has a null {key}")));
        }
        let value = state_keys.value(row);
        let position = index.get(&value).ok_or_else(|| {
            Error::Join(format!(
                "Unresolved join: state row {row} references {key} = {value} with no trial row"
            ))
        })?;
        take_indices.push(*position);
    }
    let take_indices = UInt32Array::from(take_indices);

    let state_schema = states.schema();
    let trial_schema = trials.schema();
    let mut fields: Vec<Field> = state_schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns: Vec<ArrayRef> = states.columns().to_vec();

    for (field, column) in trial_schema.fields().iter().zip(trials.columns()) {
        if field.name() == key {
            continue;
        }
        if state_schema.index_of(field.name()).is_ok() {
            return Err(Error::Join(format!(
                "Column {} exists in both state and trial tables",
                field.name()
            )));
        }
        columns.push(compute::take(column.as_ref(), &take_indices, None)?);
        fields.push(field.as_ref().clone());
    }

    let joined = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    debug!(
        rows = joined.num_rows(),
        trials = trials.num_rows(),
        matched_trials = index.len(),
        "joined states onto trials"
    );
    Ok(joined)
}

fn join_keys(batch: &RecordBatch, key: &str, side: &str) -> Result<arrow::array::Int64Array> {
    if batch.schema().index_of(key).is_err() {
        return Err(Error::Join(format!("Join key {key} missing from {side} table")));
    }
    integer_column(batch, key).map_err(|e| match e {
        Error::Config(message) => Error::Join(format!("{side} table: {message}")),
        other => other,
    })
}
