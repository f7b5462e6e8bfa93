//! Column names of the simulation output datasets
//!
//! Names match the Parquet field names written by the simulation's data
//! collector, so they are `PascalCase` rather than Rust style.

/// Unique trial key; foreign key on state rows
pub const TRIAL_INDEX: &str = "TrialIndex";
/// Number of target states the network was trained on
pub const NUM_TARGET_STATES: &str = "NumTargetStates";
/// Units updated per network step
pub const UNITS_UPDATED: &str = "UnitsUpdated";
/// States (out of the trial size) that relaxed to a stable state
pub const NUMBER_STABLE_STATES: &str = "NumberStableStates";

/// State key, unique within a trial
pub const STATE_INDEX: &str = "StateIndex";
/// Whether relaxation terminated in an attractor
pub const STABLE: &str = "Stable";
/// Steps taken to relax
pub const NUM_STEPS: &str = "NumSteps";
/// One distance per learned attractor
pub const DISTANCES_TO_LEARNED: &str = "DistancesToLearned";

/// Derived: `min(DistancesToLearned)` for stable states
pub const MINIMUM_DISTANCE_TO_LEARNED: &str = "MinimumDistanceToLearned";
/// Derived: `NumberStableStates / trial_size`
pub const STABILITY_RATIO: &str = "StabilityRatio";

/// State columns every report reads
pub const STATE_COLUMNS: [&str; 5] = [
    TRIAL_INDEX,
    STATE_INDEX,
    STABLE,
    NUM_STEPS,
    DISTANCES_TO_LEARNED,
];
