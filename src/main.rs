//! relaxation-report - batch summaries of relaxation results
//!
//! Exit codes:
//!   0 - All requested reports produced
//!   1 - Any error (config, load, join, aggregation)

mod cli;

use anyhow::{bail, Context, Result};
use cli::{Args, OutputFormat};
use relaxation_report::config::ReportConfig;
use relaxation_report::pipeline::ReportPipeline;
use relaxation_report::report::{charts, Chart};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse_args();
    init_logging(&args);

    info!("relaxation-report v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(&args) {
        error!("Report failed: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout carries the report.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn base_config(args: &Args) -> Result<ReportConfig> {
    if let Some(path) = &args.config {
        return ReportConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    match args.preset {
        Some(preset) => Ok(ReportConfig::preset(preset, &args.data_dir)),
        None => bail!("Either --config or --preset is required"),
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.merge_into(base_config(args)?);
    config.validate().context("Invalid configuration")?;

    let value_columns = args
        .value_columns()
        .unwrap_or_else(|| vec![config.value_column]);

    let mut all_charts: Vec<Chart> = Vec::new();
    for value in value_columns {
        let config = config.with_value_column(value);
        info!(
            trials = %config.trial_path.display(),
            states = %config.state_path.display(),
            group_by = %config.group_by,
            value = %config.value_column,
            "running report"
        );
        let tables = ReportPipeline::new(config.clone())
            .run()
            .with_context(|| format!("Report for {value} failed"))?;

        let mut report = charts(&config, &tables);
        // Count charts do not depend on the value column; emit them once
        if !all_charts.is_empty() {
            report.retain(|chart| matches!(chart, Chart::ErrorBar { .. }));
        }
        all_charts.extend(report);
    }

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&all_charts)
                .context("Failed to serialize charts")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            for chart in &all_charts {
                println!("{chart}");
            }
        }
    }
    Ok(())
}
