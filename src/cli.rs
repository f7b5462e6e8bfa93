//! Command-line interface argument parsing.

use clap::{Parser, ValueEnum};
use relaxation_report::aggregate::DistanceFilter;
use relaxation_report::config::{GroupBy, Preset, ReportConfig, ValueColumn};
use std::path::PathBuf;
use tracing::Level;

/// Summarise attractor-network relaxation results
///
/// Loads trial and state Parquet files, joins states to trials and prints
/// chart-ready tables. Each --value runs the report once.
///
/// Examples:
///   relaxation-report --preset num-target-states --data-dir data
///   relaxation-report --config report.toml --format text
///   relaxation-report --preset units-updated --value NumSteps --value StabilityRatio
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML report configuration
    #[arg(short, long, value_name = "FILE", conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in report: num-target-states, units-updated, units-updated-large
    #[arg(short, long, value_name = "NAME")]
    pub preset: Option<Preset>,

    /// Directory holding the preset's data files
    #[arg(long, default_value = "data", env = "RELAXATION_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Trial summary Parquet file (overrides config)
    #[arg(long, value_name = "FILE")]
    pub trials: Option<PathBuf>,

    /// Per-state Parquet file (overrides config)
    #[arg(long, value_name = "FILE")]
    pub states: Option<PathBuf>,

    /// Grouping column: NumTargetStates or UnitsUpdated
    #[arg(long, value_name = "COLUMN")]
    pub group_by: Option<GroupBy>,

    /// Value column: StabilityRatio, MinimumDistanceToLearned or NumSteps
    #[arg(long = "value", value_name = "COLUMN")]
    pub values: Vec<ValueColumn>,

    /// Every value column
    #[arg(long, conflicts_with = "values")]
    pub all_values: bool,

    /// States sampled per trial
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub trial_size: Option<i64>,

    /// Show stable/unstable counts on a log10 scale
    #[arg(long)]
    pub log_scale: bool,

    /// Minimum-distance restriction before grouping: all, non-zero, zero
    #[arg(long, value_name = "FILTER")]
    pub distance_filter: Option<DistanceFilter>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty JSON chart descriptions
    Json,
    /// Plain-text tables
    Text,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log level from flags.
    pub const fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    /// Apply command-line overrides on top of a base config.
    pub fn merge_into(&self, mut config: ReportConfig) -> ReportConfig {
        if let Some(path) = &self.trials {
            config.trial_path.clone_from(path);
        }
        if let Some(path) = &self.states {
            config.state_path.clone_from(path);
        }
        if let Some(group_by) = self.group_by {
            config.group_by = group_by;
        }
        if let Some(size) = self.trial_size {
            config.trial_size = size;
        }
        if self.log_scale {
            config.log_scale = true;
        }
        if let Some(filter) = self.distance_filter {
            config.distance_filter = filter;
        }
        config
    }

    /// Value columns to report, or `None` to keep the config's own.
    pub fn value_columns(&self) -> Option<Vec<ValueColumn>> {
        if self.all_values {
            Some(ValueColumn::ALL.to_vec())
        } else if self.values.is_empty() {
            None
        } else {
            Some(self.values.clone())
        }
    }
}
