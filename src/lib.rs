//! # relaxation-report: summaries of attractor-network relaxation runs
//!
//! Loads the trial and state tables a network simulation writes as Parquet,
//! joins states to their trials, and reduces them to the tables behind the
//! standard charts: stable/unstable counts, distributions of minimum
//! distance to a learned attractor and of relaxation steps, and grouped
//! means with 95% confidence intervals.
//!
//! ## Pipeline
//!
//! - **Load**: [`storage::StorageEngine`] reads only the requested columns
//! - **Join**: [`join::left_join_on`] widens each state with its trial's fields
//! - **Aggregate**: [`aggregate`] filters stable states, counts values,
//!   derives stability ratios and computes grouped statistics
//! - **Present**: [`report::charts`] labels and orders the results
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use relaxation_report::config::{Preset, ReportConfig};
//! use relaxation_report::pipeline::ReportPipeline;
//!
//! let config = ReportConfig::preset(Preset::NumTargetStates, "data");
//! let tables = ReportPipeline::new(config).run()?;
//!
//! for stat in &tables.grouped {
//!     println!("{}: {:.3} ± {:.3}", stat.key, stat.mean, stat.half_width);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod config;
pub mod error;
pub mod join;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod storage;

pub use error::{Error, Result};
