//! Chart-ready tables for the presentation layer
//!
//! Rendering belongs to whatever charting tool consumes these values. This
//! module only fixes titles, axis labels, bar order and the log scale of
//! the stable/unstable counts.

use crate::aggregate::{FrequencyKey, FrequencyTable, GroupedStatistic};
use crate::config::ReportConfig;
use crate::pipeline::ReportTables;
use crate::schema::STABLE;
use serde::Serialize;
use std::fmt::{self, Write as _};

/// One bar of a bar chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    /// Category label
    pub label: String,
    /// Bar height (count, or log10 count)
    pub value: f64,
}

/// One point of an error-bar chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorBarPoint {
    /// Group key
    pub x: i64,
    /// Group mean
    pub y: f64,
    /// 95% confidence half-width
    pub err: f64,
    /// Sample count behind the point
    pub count: u64,
}

/// A chart description
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    /// Category → count
    Bar {
        /// Chart title
        title: String,
        /// Category axis label
        x_label: String,
        /// Value axis label
        y_label: String,
        /// Bars in presentation order
        bars: Vec<Bar>,
    },
    /// Group key → mean ± half-width
    ErrorBar {
        /// Chart title
        title: String,
        /// Group axis label
        x_label: String,
        /// Mean axis label
        y_label: String,
        /// Points ascending by group key
        points: Vec<ErrorBarPoint>,
    },
}

impl Chart {
    /// Chart title
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Bar { title, .. } | Self::ErrorBar { title, .. } => title,
        }
    }
}

fn stable_chart(counts: &FrequencyTable, log_scale: bool) -> Chart {
    let (prefix, y_label) = if log_scale {
        ("Log Count", "Log Counts")
    } else {
        ("Count", "Counts")
    };
    let heights: Vec<(FrequencyKey, f64)> = if log_scale {
        counts.log10_counts()
    } else {
        counts.iter().map(|(key, count)| (key, count_height(count))).collect()
    };
    // Stable first, as states are reported; absent keys have no bar
    let bars = [(true, "Stable"), (false, "Unstable")]
        .into_iter()
        .filter_map(|(key, label)| {
            heights
                .iter()
                .find(|(k, _)| *k == FrequencyKey::Bool(key))
                .map(|(_, value)| Bar {
                    label: label.to_string(),
                    value: *value,
                })
        })
        .collect();
    Chart::Bar {
        title: format!("{prefix} of Stable and Unstable States"),
        x_label: STABLE.to_string(),
        y_label: y_label.to_string(),
        bars,
    }
}

#[allow(clippy::cast_precision_loss)]
fn count_height(count: u64) -> f64 {
    count as f64
}

fn distribution_chart(title: &str, counts: &FrequencyTable) -> Chart {
    Chart::Bar {
        title: title.to_string(),
        x_label: counts.column().to_string(),
        y_label: "Counts".to_string(),
        bars: counts
            .iter()
            .map(|(key, count)| Bar {
                label: key.to_string(),
                value: count_height(count),
            })
            .collect(),
    }
}

fn grouped_chart(config: &ReportConfig, stats: &[GroupedStatistic]) -> Chart {
    Chart::ErrorBar {
        title: format!(
            "{}\nby {}",
            config.value_column.label(),
            config.group_by.title()
        ),
        x_label: config.group_by.label().to_string(),
        y_label: config.value_column.label().to_string(),
        points: stats
            .iter()
            .map(|s| ErrorBarPoint {
                x: s.key,
                y: s.mean,
                err: s.half_width,
                count: s.count,
            })
            .collect(),
    }
}

/// Charts for one report, in presentation order
#[must_use]
pub fn charts(config: &ReportConfig, tables: &ReportTables) -> Vec<Chart> {
    vec![
        stable_chart(&tables.stable_counts, config.log_scale),
        distribution_chart(
            "Distribution of Minimum Distance to Nearest Learned State\nAll Trials",
            &tables.minimum_distance_counts,
        ),
        distribution_chart(
            "Distribution of Number of Steps to Relax\nAll Trials",
            &tables.num_steps_counts,
        ),
        grouped_chart(config, &tables.grouped),
    ]
}

/// Plain-text rendering of a chart's data
impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        match self {
            Self::Bar {
                title,
                x_label,
                y_label,
                bars,
            } => {
                writeln!(out, "== {}", title.replace('\n', " | "))?;
                writeln!(out, "{x_label:>28}  {y_label:>14}")?;
                for bar in bars {
                    writeln!(out, "{:>28}  {:>14.4}", bar.label, bar.value)?;
                }
            }
            Self::ErrorBar {
                title,
                x_label,
                y_label,
                points,
            } => {
                writeln!(out, "== {}", title.replace('\n', " | "))?;
                writeln!(out, "{x_label} vs {y_label}")?;
                writeln!(out, "{:>10}  {:>14}  {:>14}  {:>8}", "key", "mean", "±95%", "n")?;
                for p in points {
                    writeln!(out, "{:>10}  {:>14.6}  {:>14.6}  {:>8}", p.x, p.y, p.err, p.count)?;
                }
            }
        }
        f.write_str(&out)
    }
}
