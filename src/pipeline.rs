//! Report pipeline: load → join → filter → aggregate
//!
//! Single-threaded and synchronous. Every stage is a pure function of the
//! input snapshots, so two runs over the same files produce identical tables.

use crate::aggregate::{
    derive_stability_ratio, filter_by_distance, grouped_statistics, stability_filter,
    FrequencyTable, GroupedStatistic,
};
use crate::config::{ReportConfig, ValueColumn};
use crate::join::left_join_on;
use crate::schema::{MINIMUM_DISTANCE_TO_LEARNED, NUM_STEPS, STABLE, STATE_COLUMNS, TRIAL_INDEX};
use crate::storage::StorageEngine;
use crate::Result;
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use tracing::{debug, info, info_span};

/// Dataset label of the trial table
pub const TRIALS: &str = "trials";
/// Dataset label of the state table
pub const STATES: &str = "states";

/// Every table one report run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTables {
    /// `Stable` counts over all states
    pub stable_counts: FrequencyTable,
    /// `MinimumDistanceToLearned` counts over stable states
    pub minimum_distance_counts: FrequencyTable,
    /// `NumSteps` counts over stable states
    pub num_steps_counts: FrequencyTable,
    /// Configured value summarised per configured group, ascending by key
    pub grouped: Vec<GroupedStatistic>,
}

/// Loaded and joined inputs, before aggregation
#[derive(Debug, Clone)]
pub struct PreparedTables {
    /// Projected trial table
    pub trials: RecordBatch,
    /// Projected state table
    pub states: RecordBatch,
    /// States widened with trial fields
    pub joined: RecordBatch,
}

/// Runs one configured report
#[derive(Debug, Clone)]
pub struct ReportPipeline {
    config: ReportConfig,
}

impl ReportPipeline {
    /// Create a pipeline for `config`
    #[must_use]
    pub const fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// The pipeline's configuration
    #[must_use]
    pub const fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Load both datasets with only the needed columns and join them
    ///
    /// # Errors
    /// Returns [`crate::Error::Config`] for an invalid config,
    /// [`crate::Error::Load`] for unreadable input, [`crate::Error::Join`]
    /// for key problems
    pub fn prepare(&self) -> Result<PreparedTables> {
        self.config.validate()?;

        let trials = {
            let _span = info_span!("load", dataset = TRIALS).entered();
            StorageEngine::load_parquet_columns(
                &self.config.trial_path,
                TRIALS,
                &self.config.trial_columns(),
            )?
            .to_batch()?
        };
        let states = {
            let _span = info_span!("load", dataset = STATES).entered();
            StorageEngine::load_parquet_columns(&self.config.state_path, STATES, &STATE_COLUMNS)?
                .to_batch()?
        };
        info!(
            trials = trials.num_rows(),
            states = states.num_rows(),
            "loaded inputs"
        );

        let joined = {
            let _span = info_span!("join", key = TRIAL_INDEX).entered();
            left_join_on(&states, &trials, TRIAL_INDEX)?
        };

        Ok(PreparedTables {
            trials,
            states,
            joined,
        })
    }

    /// Aggregate already prepared tables
    ///
    /// # Errors
    /// Returns [`crate::Error::EmptySequence`] for a stable state without
    /// distances, [`crate::Error::Config`] for bad column requests
    pub fn aggregate(&self, prepared: &PreparedTables) -> Result<ReportTables> {
        let _span = info_span!(
            "aggregate",
            group_by = self.config.group_by.column(),
            value = self.config.value_column.column()
        )
        .entered();

        let stable = stability_filter(&prepared.joined)?;
        debug!(stable = stable.num_rows(), "selected stable states");

        let stable_counts = FrequencyTable::from_column(&prepared.states, STABLE)?;
        let minimum_distance_counts =
            FrequencyTable::from_column(&stable, MINIMUM_DISTANCE_TO_LEARNED)?;
        let num_steps_counts = FrequencyTable::from_column(&stable, NUM_STEPS)?;

        let group_by = self.config.group_by.column();
        let grouped = match self.config.value_column {
            ValueColumn::StabilityRatio => {
                let ratios = derive_stability_ratio(&prepared.trials, self.config.trial_size)?;
                grouped_statistics(&ratios, group_by, ValueColumn::StabilityRatio.column())?
            }
            value => {
                let selected = filter_by_distance(&stable, self.config.distance_filter)?;
                debug!(
                    rows = selected.num_rows(),
                    filter = ?self.config.distance_filter,
                    "applied distance filter"
                );
                grouped_statistics(&selected, group_by, value.column())?
            }
        };
        info!(groups = grouped.len(), "computed grouped statistics");

        Ok(ReportTables {
            stable_counts,
            minimum_distance_counts,
            num_steps_counts,
            grouped,
        })
    }

    /// Load, join and aggregate
    ///
    /// # Errors
    /// Any error of [`Self::prepare`] or [`Self::aggregate`]; the run
    /// aborts on the first one
    pub fn run(&self) -> Result<ReportTables> {
        let prepared = self.prepare()?;
        self.aggregate(&prepared)
    }
}
