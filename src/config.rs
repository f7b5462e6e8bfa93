//! Report configuration
//!
//! One [`ReportConfig`] describes one report: which files to read, which
//! trial attribute to group by, which value to summarise. Configs load from
//! TOML or come from the presets matching the three standard analyses.
//!
//! ```toml
//! trial_path = "data/trialData.pq"
//! state_path = "data/stateData.pq"
//! trial_size = 1000
//! group_by = "NumTargetStates"
//! value_column = "StabilityRatio"
//! log_scale = false
//! distance_filter = "all"
//! ```

use crate::aggregate::{DistanceFilter, DEFAULT_TRIAL_SIZE};
use crate::schema;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Trial attribute used as the grouping key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    /// Number of target states the network was trained on
    NumTargetStates,
    /// Units updated per network step
    UnitsUpdated,
}

impl GroupBy {
    /// Column name in the trial table
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::NumTargetStates => schema::NUM_TARGET_STATES,
            Self::UnitsUpdated => schema::UNITS_UPDATED,
        }
    }

    /// Axis label for presentation
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NumTargetStates => "Number of Target States",
            Self::UnitsUpdated => "Number of Units Updated (Per Network Step)",
        }
    }

    /// Short form used in chart titles
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::NumTargetStates => "Number of Target States",
            Self::UnitsUpdated => "Number of Units Updated",
        }
    }
}

/// Numeric column summarised per group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueColumn {
    /// Fraction of a trial's states that relaxed to a stable state
    StabilityRatio,
    /// Distance from a stable state to its nearest learned attractor
    MinimumDistanceToLearned,
    /// Steps taken to relax
    NumSteps,
}

impl ValueColumn {
    /// Column name in the derived table
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::StabilityRatio => schema::STABILITY_RATIO,
            Self::MinimumDistanceToLearned => schema::MINIMUM_DISTANCE_TO_LEARNED,
            Self::NumSteps => schema::NUM_STEPS,
        }
    }

    /// Axis label for presentation
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::StabilityRatio => "Stability Ratio",
            Self::MinimumDistanceToLearned => "Mean Minimum Distance to Nearest Learned Attractor",
            Self::NumSteps => "Mean Number of Steps Taken to Relax State",
        }
    }

    /// Every value column, in report order
    pub const ALL: [Self; 3] = [
        Self::StabilityRatio,
        Self::MinimumDistanceToLearned,
        Self::NumSteps,
    ];
}

macro_rules! column_enum_parse {
    ($ty:ty, $what:literal, [$($variant:ident),+]) => {
        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                $(
                    if s.eq_ignore_ascii_case(Self::$variant.column()) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(Error::Config(format!(concat!("Unknown ", $what, " column: {}"), s)))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.column())
            }
        }
    };
}

column_enum_parse!(GroupBy, "grouping", [NumTargetStates, UnitsUpdated]);
column_enum_parse!(
    ValueColumn,
    "value",
    [StabilityRatio, MinimumDistanceToLearned, NumSteps]
);

/// Explicit configuration of one report run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Trial summary Parquet file
    pub trial_path: PathBuf,

    /// Per-state Parquet file
    pub state_path: PathBuf,

    /// States sampled per trial; divisor of the stability ratio
    #[serde(default = "default_trial_size")]
    pub trial_size: i64,

    /// Grouping key for grouped statistics
    pub group_by: GroupBy,

    /// Value summarised per group
    pub value_column: ValueColumn,

    /// Present counts on a log10 scale
    #[serde(default)]
    pub log_scale: bool,

    /// Restriction on minimum distance before grouping
    #[serde(default)]
    pub distance_filter: DistanceFilter,
}

const fn default_trial_size() -> i64 {
    DEFAULT_TRIAL_SIZE
}

/// The three standard analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Grouped by number of target states
    NumTargetStates,
    /// Grouped by units updated per step
    UnitsUpdated,
    /// Units updated on the large dataset, log-scaled counts
    UnitsUpdatedLarge,
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "num-target-states" => Ok(Self::NumTargetStates),
            "units-updated" => Ok(Self::UnitsUpdated),
            "units-updated-large" => Ok(Self::UnitsUpdatedLarge),
            other => Err(Error::Config(format!("Unknown preset: {other}"))),
        }
    }
}

impl ReportConfig {
    /// Build a config for a preset with its data files under `data_dir`
    #[must_use]
    pub fn preset(preset: Preset, data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        let (trials, states, group_by, value_column, log_scale) = match preset {
            Preset::NumTargetStates => (
                "trialData.pq",
                "stateData.pq",
                GroupBy::NumTargetStates,
                ValueColumn::StabilityRatio,
                false,
            ),
            Preset::UnitsUpdated => (
                "trialData.pq",
                "stateData.pq",
                GroupBy::UnitsUpdated,
                ValueColumn::StabilityRatio,
                false,
            ),
            // The large trial table carries no NumberStableStates
            Preset::UnitsUpdatedLarge => (
                "trialDataLarge.pq",
                "stateDataLarge.pq",
                GroupBy::UnitsUpdated,
                ValueColumn::NumSteps,
                true,
            ),
        };
        Self {
            trial_path: dir.join(trials),
            state_path: dir.join(states),
            trial_size: DEFAULT_TRIAL_SIZE,
            group_by,
            value_column,
            log_scale,
            distance_filter: DistanceFilter::All,
        }
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// Returns [`Error::Config`] on malformed TOML, unknown keys or
    /// column names, or an invalid trial size
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::Config(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize back to TOML
    ///
    /// # Errors
    /// Returns [`Error::Config`] if serialization fails
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(format!("Cannot serialize config: {e}")))
    }

    /// Same report with another value column
    #[must_use]
    pub fn with_value_column(&self, value_column: ValueColumn) -> Self {
        Self {
            value_column,
            ..self.clone()
        }
    }

    /// Check values the type system cannot
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `trial_size <= 0`
    pub fn validate(&self) -> Result<()> {
        if self.trial_size <= 0 {
            return Err(Error::Config(format!(
                "trial_size must be positive, got {}",
                self.trial_size
            )));
        }
        Ok(())
    }

    /// Trial columns this report needs
    #[must_use]
    pub fn trial_columns(&self) -> Vec<&'static str> {
        let mut columns = vec![schema::TRIAL_INDEX, self.group_by.column()];
        if self.value_column == ValueColumn::StabilityRatio {
            columns.push(schema::NUMBER_STABLE_STATES);
        }
        columns
    }
}
