//! Grouped mean, standard deviation and 95% confidence intervals
//!
//! Standard deviation uses the unbiased (N-1) estimator. A singleton group
//! reports `std = 0` and `half_width = 0`, so no NaN reaches presentation.

use super::{float_column, integer_column};
use crate::Result;
use arrow::array::RecordBatch;
use serde::Serialize;
use std::collections::BTreeMap;

/// z-score of a two-sided 95% normal confidence interval
pub const Z_95: f64 = 1.96;

/// Summary of one group's values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupedStatistic {
    /// Group key
    pub key: i64,
    /// Sample mean
    pub mean: f64,
    /// Sample standard deviation (N-1)
    pub std: f64,
    /// Number of values in the group
    pub count: u64,
    /// `1.96 * std / sqrt(count)`
    pub half_width: f64,
}

/// Welford running mean/variance
#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Accumulator {
    #[allow(clippy::cast_precision_loss)]
    fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self, key: i64) -> GroupedStatistic {
        let std = if self.count > 1 {
            (self.m2 / (self.count - 1) as f64).sqrt()
        } else {
            0.0
        };
        GroupedStatistic {
            key,
            mean: self.mean,
            std,
            count: self.count,
            half_width: Z_95 * std / (self.count as f64).sqrt(),
        }
    }
}

/// Partition rows by `group_by` and summarise `value` within each group
///
/// Rows with a null key or value are skipped. Output is ordered by ascending
/// group key; an empty batch yields no groups.
///
/// # Errors
/// Returns [`crate::Error::Config`] if `group_by` is missing or not
/// boolean/integer, or `value` is missing or not numeric
pub fn grouped_statistics(
    batch: &RecordBatch,
    group_by: &str,
    value: &str,
) -> Result<Vec<GroupedStatistic>> {
    let keys = integer_column(batch, group_by)?;
    let values = float_column(batch, value)?;

    let mut groups: BTreeMap<i64, Accumulator> = BTreeMap::new();
    for (key, value) in keys.iter().zip(values.iter()) {
        if let (Some(key), Some(value)) = (key, value) {
            groups.entry(key).or_default().push(value);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, acc)| acc.finish(key))
        .collect())
}
